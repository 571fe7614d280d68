use std::cell::Cell;
use std::rc::Rc;

use egui::{Key, Pos2};

use super::base::{is_key, pointer, primary};
use super::{BrushType, Gesture, ToolContext, ToolKind, ToolOptions};
use crate::scene::{Channel, LineCap, LineJoin, Node, NodeId, NodeKind};

/// Freehand strokes from pointer down to pointer up
#[derive(Debug, Clone, Copy, Default)]
pub struct BrushTool;

#[derive(Debug, Clone, Copy)]
struct Stroke {
    line: NodeId,
    last: Pos2,
}

impl Gesture for BrushTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Brush
    }

    fn default_options(&self) -> ToolOptions {
        ToolOptions::default()
    }

    fn mount(&mut self, ctx: &ToolContext) {
        let stroke: Rc<Cell<Option<Stroke>>> = Rc::default();
        ctx.discard_on_dispose(stroke.clone(), |current| vec![current.line]);

        let (c, state) = (ctx.clone(), stroke.clone());
        ctx.on(Channel::PointerDown, move |event| {
            let Some(input) = primary(event) else {
                return;
            };
            let Some(surface) = c.surface() else {
                return;
            };

            let position = surface.relative_position(input.page, true);
            let (mut config, width, brush_type) = {
                let options = c.options();
                (options.node_config.clone(), options.brush_width, options.brush_type)
            };
            config.stroke_width = width;
            config.hit_stroke_width = Some(width + c.config().brush_hit_padding);
            let (cap, join) = match brush_type {
                BrushType::Round => (LineCap::Round, LineJoin::Round),
                BrushType::Square => (LineCap::Square, LineJoin::Bevel),
            };

            let line = Node::new(NodeKind::Line {
                points: vec![position],
                cap,
                join,
                tension: 1.0,
            })
            .with_config(config);
            if let Some(line) = surface.add_to_root(line) {
                state.set(Some(Stroke {
                    line,
                    last: position,
                }));
            }
        });

        let (c, state) = (ctx.clone(), stroke.clone());
        ctx.on(Channel::PointerMove, move |event| {
            let (Some(mut current), Some(input)) = (state.get(), pointer(event)) else {
                return;
            };
            let Some(surface) = c.surface() else {
                return;
            };

            let position = surface.relative_position(input.page, true);
            if position == current.last {
                return;
            }
            if let Some(NodeKind::Line { points, .. }) =
                surface.scene_mut().get_mut(current.line).map(|node| &mut node.kind)
            {
                points.push(position);
            }
            current.last = position;
            state.set(Some(current));
        });

        let (c, state) = (ctx.clone(), stroke.clone());
        ctx.on(Channel::PointerUp, move |_| {
            let Some(done) = state.take() else {
                return;
            };
            if let Some(surface) = c.surface() {
                // A lone point would not render, so draw it as a zero-length segment.
                if let Some(NodeKind::Line { points, .. }) =
                    surface.scene_mut().get_mut(done.line).map(|node| &mut node.kind)
                {
                    if let [single] = points[..] {
                        points.push(single);
                    }
                }
            }
            c.notify(done.line);
        });

        let (c, state) = (ctx.clone(), stroke);
        ctx.on(Channel::KeyDown, move |event| {
            if !is_key(event, Key::Escape) {
                return;
            }
            if let (Some(cancelled), Some(surface)) = (state.take(), c.surface()) {
                surface.scene_mut().destroy(cancelled.line);
            }
        });
    }
}
