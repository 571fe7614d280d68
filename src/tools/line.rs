use std::cell::Cell;
use std::rc::Rc;

use egui::{Key, PointerButton, Pos2};

use super::base::{key, pointer};
use super::{Gesture, ToolContext, ToolKind, ToolOptions};
use crate::scene::{Channel, LineCap, LineJoin, Node, NodeId, NodeKind, Surface};

/// Polyline tool: every click fixes a vertex, the last vertex follows the
/// pointer, and Enter, Escape or a right click finishes
#[derive(Debug, Clone, Copy, Default)]
pub struct LineTool;

fn with_points(surface: &Surface, line: NodeId, edit: impl FnOnce(&mut Vec<Pos2>)) {
    if let Some(NodeKind::Line { points, .. }) =
        surface.scene_mut().get_mut(line).map(|node| &mut node.kind)
    {
        edit(points);
    }
}

/// Commits the line without its trailing in-progress vertex, or discards it
/// when no vertex was ever added
fn finish(ctx: &ToolContext, surface: &Surface, line: NodeId) {
    let vertices = surface
        .scene()
        .get(line)
        .and_then(|node| node.points().map(<[Pos2]>::len))
        .unwrap_or(0);

    if vertices > 2 {
        with_points(surface, line, |points| {
            points.pop();
        });
        ctx.notify(line);
    } else {
        surface.scene_mut().destroy(line);
    }
}

impl Gesture for LineTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Line
    }

    fn default_options(&self) -> ToolOptions {
        let mut options = ToolOptions::stroked(2.0);
        options.node_config.hit_stroke_width = Some(10.0);
        options
    }

    fn mount(&mut self, ctx: &ToolContext) {
        let drawing: Rc<Cell<Option<NodeId>>> = Rc::default();
        ctx.discard_on_dispose(drawing.clone(), |line| vec![line]);

        let (c, state) = (ctx.clone(), drawing.clone());
        ctx.on(Channel::Click, move |event| {
            let Some(input) = pointer(event) else {
                return;
            };
            let Some(surface) = c.surface() else {
                return;
            };

            match (input.button, state.get()) {
                (PointerButton::Secondary, Some(line)) => {
                    state.set(None);
                    finish(&c, &surface, line);
                }
                (PointerButton::Primary, None) => {
                    let start = surface.relative_position(input.page, true);
                    let line = Node::new(NodeKind::Line {
                        points: vec![start, start],
                        cap: LineCap::Round,
                        join: LineJoin::Round,
                        tension: 0.0,
                    })
                    .with_config(c.node_config());
                    state.set(surface.add_to_root(line));
                }
                (PointerButton::Primary, Some(line)) => {
                    let at = surface.relative_position(input.page, true);
                    with_points(&surface, line, |points| {
                        if let Some(last) = points.last_mut() {
                            *last = at;
                        }
                        points.push(at);
                    });
                }
                _ => {}
            }
        });

        let (c, state) = (ctx.clone(), drawing.clone());
        ctx.on(Channel::PointerMove, move |event| {
            let (Some(line), Some(input)) = (state.get(), pointer(event)) else {
                return;
            };
            let Some(surface) = c.surface() else {
                return;
            };
            let at = surface.relative_position(input.page, true);
            with_points(&surface, line, |points| {
                if let Some(last) = points.last_mut() {
                    *last = at;
                }
            });
        });

        let (c, state) = (ctx.clone(), drawing);
        ctx.on(Channel::KeyDown, move |event| {
            if !key(event).is_some_and(|input| matches!(input.key, Key::Escape | Key::Enter)) {
                return;
            }
            if let (Some(line), Some(surface)) = (state.take(), c.surface()) {
                finish(&c, &surface, line);
            }
        });
    }
}
