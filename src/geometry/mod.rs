pub mod hit_testing;
pub mod position;

pub use hit_testing::{calculate_bounds, distance_to_line_segment, node_contains, normalized_rect};
pub use position::{Viewport, position_by_scale, relative_position, stage_position};
