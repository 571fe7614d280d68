use std::cell::Cell;
use std::rc::Rc;

use egui::{Key, Pos2, Vec2};

use super::base::{is_key, pointer, primary};
use super::{Gesture, ToolContext, ToolKind, ToolOptions};
use crate::scene::{Channel, Node, NodeId, NodeKind};

/// Click to anchor a corner, move to size, click again to commit
#[derive(Debug, Clone, Copy, Default)]
pub struct RectTool;

#[derive(Debug, Clone, Copy)]
struct Pending {
    node: NodeId,
    start: Pos2,
}

impl Gesture for RectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Rect
    }

    fn default_options(&self) -> ToolOptions {
        ToolOptions::stroked(2.0)
    }

    fn mount(&mut self, ctx: &ToolContext) {
        let pending: Rc<Cell<Option<Pending>>> = Rc::default();
        ctx.discard_on_dispose(pending.clone(), |drawing| vec![drawing.node]);

        let (c, state) = (ctx.clone(), pending.clone());
        ctx.on(Channel::Click, move |event| {
            let Some(input) = primary(event) else {
                return;
            };
            if let Some(done) = state.take() {
                c.notify(done.node);
                return;
            }
            let Some(surface) = c.surface() else {
                return;
            };

            let start = surface.relative_position(input.page, true);
            let rect = Node::new(NodeKind::Rect { size: Vec2::ZERO })
                .with_position(start)
                .with_config(c.node_config());
            if let Some(node) = surface.add_to_root(rect) {
                state.set(Some(Pending { node, start }));
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
            if let Some(node) = surface.scene_mut().get_mut(drawing.node) {
                node.set_size(end - drawing.start);
            }
        });

        let (c, state) = (ctx.clone(), pending);
        ctx.on(Channel::KeyDown, move |event| {
            if !is_key(event, Key::Escape) {
                return;
            }
            if let (Some(drawing), Some(surface)) = (state.take(), c.surface()) {
                surface.scene_mut().destroy(drawing.node);
            }
        });
    }
}
