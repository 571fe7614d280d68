use egui::{Pos2, Vec2};

/// Snapshot of the drawing root's transform relative to the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Size of the surface
    pub size: Vec2,
    /// Scale of the drawing root
    pub scale: Vec2,
    /// Pan offset (position) of the drawing root
    pub pan: Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            size: Vec2::ZERO,
            scale: Vec2::splat(1.0),
            pan: Vec2::ZERO,
        }
    }
}

/// Pointer position relative to the container, as an absolute difference per axis.
///
/// A pointer left of or above the container yields the mirrored distance, not a
/// negative coordinate.
pub fn stage_position(page: Pos2, container_origin: Pos2) -> Pos2 {
    Pos2::new(
        (page.x - container_origin.x).abs(),
        (page.y - container_origin.y).abs(),
    )
}

/// Rescales `position` for a drawing root scaled by `viewport.scale`.
pub fn position_by_scale(position: Pos2, viewport: &Viewport) -> Pos2 {
    if viewport.scale == Vec2::splat(1.0) {
        return position;
    }

    Pos2::new(
        rescale_axis(position.x, viewport.size.x, viewport.scale.x),
        rescale_axis(position.y, viewport.size.y, viewport.scale.y),
    )
}

fn rescale_axis(value: f32, size: f32, scale: f32) -> f32 {
    if size == 0.0 {
        return value / scale;
    }
    value / (size * scale) * size
}

/// Converts a page-space pointer position into drawing-root coordinates.
///
/// Scale correction is applied first, then the pan offset is subtracted when
/// `compensate_for_pan` is set and the root has moved.
pub fn relative_position(
    page: Pos2,
    container_origin: Pos2,
    viewport: Option<&Viewport>,
    compensate_for_pan: bool,
) -> Pos2 {
    let raw = stage_position(page, container_origin);
    let Some(viewport) = viewport else {
        return raw;
    };

    let corrected = position_by_scale(raw, viewport);
    if compensate_for_pan && viewport.pan != Vec2::ZERO {
        corrected - viewport.pan
    } else {
        corrected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(scale: f32, pan: Vec2) -> Viewport {
        Viewport {
            size: Vec2::splat(2000.0),
            scale: Vec2::splat(scale),
            pan,
        }
    }

    #[test]
    fn test_absolute_difference_is_preserved() {
        let pos = stage_position(Pos2::new(10.0, 40.0), Pos2::new(30.0, 20.0));
        assert_eq!(pos, Pos2::new(20.0, 20.0));
    }

    #[test]
    fn test_without_surface_is_raw() {
        let pos = relative_position(Pos2::new(110.0, 150.0), Pos2::new(10.0, 0.0), None, true);
        assert_eq!(pos, Pos2::new(100.0, 150.0));
    }

    #[test]
    fn test_unit_scale_passthrough_and_pan() {
        let vp = viewport(1.0, Vec2::new(100.0, 100.0));
        assert_eq!(
            relative_position(Pos2::new(100.0, 150.0), Pos2::ZERO, Some(&vp), false),
            Pos2::new(100.0, 150.0)
        );
        assert_eq!(
            relative_position(Pos2::new(100.0, 150.0), Pos2::ZERO, Some(&vp), true),
            Pos2::new(0.0, 50.0)
        );
    }

    #[test]
    fn test_scale_then_pan() {
        let vp = viewport(2.0, Vec2::new(10.0, 20.0));
        let pos = relative_position(Pos2::new(400.0, 200.0), Pos2::ZERO, Some(&vp), true);
        assert!((pos.x - 190.0).abs() < 1e-3);
        assert!((pos.y - 80.0).abs() < 1e-3);
    }
}
