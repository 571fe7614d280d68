use egui::{Pos2, Rect, Vec2};

use crate::scene::{Node, NodeKind};

/// Extra tolerance around strokes so thin outlines stay clickable
pub const STROKE_BASE_PADDING: f32 = 2.0;

/// Calculate distance from a point to a line segment
pub fn distance_to_line_segment(point: Pos2, line_start: Pos2, line_end: Pos2) -> f32 {
    let line_vec = line_end - line_start;
    let point_vec = point - line_start;

    let line_len = line_vec.length();
    if line_len == 0.0 {
        return point_vec.length();
    }

    let t = ((point_vec.x * line_vec.x + point_vec.y * line_vec.y) / line_len).clamp(0.0, line_len);
    let projection = line_start + (line_vec * t / line_len);
    (point - projection).length()
}

/// Calculate the bounding box for a set of points
pub fn calculate_bounds(points: &[Pos2], padding: f32) -> Rect {
    if points.is_empty() {
        return Rect::NOTHING;
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for point in points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    Rect::from_min_max(
        Pos2::new(min_x - padding, min_y - padding),
        Pos2::new(max_x + padding, max_y + padding),
    )
}

/// Rect spanned by `origin` and `origin + size`, whatever the sign of `size`
pub fn normalized_rect(origin: Pos2, size: Vec2) -> Rect {
    Rect::from_two_pos(origin, origin + size)
}

/// Tests whether `point`, expressed in the node's parent space, hits the node.
///
/// Containers never report a hit of their own; callers walk their children.
pub fn node_contains(node: &Node, point: Pos2) -> bool {
    let half_hit = node.config.hit_stroke_width.unwrap_or(node.config.stroke_width) / 2.0
        + STROKE_BASE_PADDING;
    let local = point - node.position.to_vec2();

    match &node.kind {
        NodeKind::Stage | NodeKind::Layer | NodeKind::Group => false,
        NodeKind::Rect { size } | NodeKind::Text { size, .. } => {
            normalized_rect(Pos2::ZERO, *size)
                .expand(half_hit)
                .contains(local)
        }
        NodeKind::Circle { radius } => local.to_vec2().length() <= radius + half_hit,
        NodeKind::Ellipse { radius, rotation } => {
            if radius.x <= 0.0 || radius.y <= 0.0 {
                return local.to_vec2().length() <= half_hit;
            }
            // Rotate the point back into the ellipse's axis-aligned frame.
            let (sin, cos) = (-rotation.to_radians()).sin_cos();
            let x = local.x * cos - local.y * sin;
            let y = local.x * sin + local.y * cos;
            let rx = radius.x + half_hit;
            let ry = radius.y + half_hit;
            (x * x) / (rx * rx) + (y * y) / (ry * ry) <= 1.0
        }
        NodeKind::Line { points, .. } => match points.as_slice() {
            [] => false,
            [single] => local.distance(*single) <= half_hit,
            _ => points
                .windows(2)
                .any(|w| distance_to_line_segment(local, w[0], w[1]) <= half_hit),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::NodeConfig;

    #[test]
    fn test_distance_to_segment() {
        let d = distance_to_line_segment(Pos2::new(5.0, 5.0), Pos2::ZERO, Pos2::new(10.0, 0.0));
        assert!((d - 5.0).abs() < 1e-4);

        let d = distance_to_line_segment(Pos2::new(3.0, 4.0), Pos2::ZERO, Pos2::ZERO);
        assert!((d - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_negative_rect_hit() {
        let node = Node::new(NodeKind::Rect {
            size: Vec2::new(-100.0, -50.0),
        })
        .with_position(Pos2::new(200.0, 200.0));

        assert!(node_contains(&node, Pos2::new(150.0, 180.0)));
        assert!(!node_contains(&node, Pos2::new(250.0, 250.0)));
    }

    #[test]
    fn test_line_hit_uses_hit_width() {
        let config = NodeConfig {
            hit_stroke_width: Some(20.0),
            ..Default::default()
        };
        let node = Node::new(NodeKind::line(vec![Pos2::ZERO, Pos2::new(100.0, 0.0)])).with_config(config);

        assert!(node_contains(&node, Pos2::new(50.0, 10.0)));
        assert!(!node_contains(&node, Pos2::new(50.0, 20.0)));
    }
}
