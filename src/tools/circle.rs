use std::cell::Cell;
use std::rc::Rc;

use egui::{Color32, Key, Pos2, Vec2};

use super::base::{is_key, pointer, primary};
use super::{Gesture, ToolContext, ToolKind, ToolOptions};
use crate::scene::{Channel, Node, NodeConfig, NodeId, NodeKind, Surface};

/// Click to set the center anchor, move to size, click again to commit
#[derive(Debug, Clone, Copy, Default)]
pub struct CircleTool;

/// A circle or ellipse being sized, with the anchor dot marking its start
#[derive(Debug, Clone, Copy)]
pub(super) struct Anchored {
    pub shape: NodeId,
    pub marker: NodeId,
    pub start: Pos2,
}

impl Anchored {
    pub fn nodes(self) -> Vec<NodeId> {
        vec![self.shape, self.marker]
    }
}

/// Adds the small dot shown at the anchor while sizing, filled with the
/// tool's stroke color
pub(super) fn add_anchor_marker(
    surface: &Surface,
    ctx: &ToolContext,
    at: Pos2,
) -> Option<NodeId> {
    let fill = ctx.options().node_config.stroke.unwrap_or(Color32::BLACK);
    let marker = Node::new(NodeKind::Circle {
        radius: ctx.config().anchor_radius,
    })
    .with_position(at)
    .with_config(NodeConfig {
        fill: Some(fill),
        stroke_width: 0.0,
        ..Default::default()
    });
    surface.add_to_root(marker)
}

/// Half of the dragged box, from the anchor to the pointer
pub(super) fn half_extent(start: Pos2, end: Pos2) -> Vec2 {
    (end - start) / 2.0
}

impl Gesture for CircleTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Circle
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
            let circle = Node::new(NodeKind::Circle { radius: 0.0 })
                .with_position(start)
                .with_config(c.node_config());
            if let Some(shape) = surface.add_to_root(circle) {
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

            // The node is positioned at its center, halfway between anchor and pointer.
            let end = surface.relative_position(input.page, true);
            let half = half_extent(drawing.start, end);
            let mut scene = surface.scene_mut();
            if let Some(node) = scene.get_mut(drawing.shape) {
                node.position = drawing.start + half;
                node.kind = NodeKind::Circle {
                    radius: half.length(),
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
