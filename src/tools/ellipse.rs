use std::cell::Cell;
use std::rc::Rc;

use egui::{Key, Vec2};

use super::base::{is_key, pointer, primary};
use super::circle::{Anchored, add_anchor_marker, half_extent};
use super::{Gesture, ToolContext, ToolKind, ToolOptions};
use crate::scene::{Channel, Node, NodeKind};

/// Like the circle tool, but the shape is an ellipse with a 2:1 axis ratio
/// rotated towards the pointer
#[derive(Debug, Clone, Copy, Default)]
pub struct EllipseTool;

/// Rotation in degrees of the segment `delta`, 0 for a vertical drag
fn rotation_of(delta: Vec2) -> f32 {
    if delta.x == 0.0 {
        return 0.0;
    }
    (delta.y / delta.x).atan().to_degrees()
}

impl Gesture for EllipseTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Ellipse
    }

    fn default_options(&self) -> ToolOptions {
        ToolOptions::stroked(2.0)
    }

    fn mount(&mut self, ctx: &ToolContext) {
        let pending: Rc<Cell<Option<Anchored>>> = Rc::default();
        ctx.discard_on_dispose(pending.clone(), Anchored::nodes);

        let (c, state) = (ctx.clone(), pending.clone());
        ctx.on(Channel::Click, move |event| {
            let Some(input) = primary(event) else {
                return;
            };
            let Some(surface) = c.surface() else {
                return;
            };
            if let Some(done) = state.take() {
                surface.scene_mut().destroy(done.marker);
                c.notify(done.shape);
                return;
            }

            let start = surface.relative_position(input.page, true);
            let Some(marker) = add_anchor_marker(&surface, &c, start) else {
                return;
            };
            let ellipse = Node::new(NodeKind::Ellipse {
                radius: Vec2::ZERO,
                rotation: 0.0,
            })
            .with_position(start)
            .with_config(c.node_config());
            if let Some(shape) = surface.add_to_root(ellipse) {
                state.set(Some(Anchored {
                    shape,
                    marker,
                    start,
                }));
            }
        });

        let (c, state) = (ctx.clone(), pending.clone());
        ctx.on(Channel::PointerMove, move |event| {
            let (Some(drawing), Some(input)) = (state.get(), pointer(event)) else {
                return;
            };
            let Some(surface) = c.surface() else {
                return;
            };

            let end = surface.relative_position(input.page, true);
            let half = half_extent(drawing.start, end);
            let radius = half.length();
            let mut scene = surface.scene_mut();
            if let Some(node) = scene.get_mut(drawing.shape) {
                node.position = drawing.start + half;
                node.kind = NodeKind::Ellipse {
                    radius: Vec2::new(radius, radius / 2.0),
                    rotation: rotation_of(end - drawing.start),
                };
            }
        });

        let (c, state) = (ctx.clone(), pending);
        ctx.on(Channel::KeyDown, move |event| {
            if !is_key(event, Key::Escape) {
                return;
            }
            if let (Some(drawing), Some(surface)) = (state.take(), c.surface()) {
                let mut scene = surface.scene_mut();
                scene.destroy(drawing.shape);
                scene.destroy(drawing.marker);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation() {
        assert_eq!(rotation_of(Vec2::new(0.0, 50.0)), 0.0);
        assert_eq!(rotation_of(Vec2::ZERO), 0.0);
        assert!((rotation_of(Vec2::new(10.0, 10.0)) - 45.0).abs() < 1e-4);
        assert!((rotation_of(Vec2::new(-10.0, 10.0)) + 45.0).abs() < 1e-4);
    }
}
