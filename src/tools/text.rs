use std::cell::RefCell;
use std::rc::Rc;

use egui::{Color32, Key, Pos2, Vec2};

use super::base::{is_key, pointer, primary};
use super::{ColorKey, Gesture, ToolContext, ToolKind, ToolOptions};
use crate::event::{CancelText, HideTextEditor, SaveText, ShowTextEditor, TextStyle};
use crate::scene::{Channel, Node, NodeConfig, NodeId, NodeKind, Surface};

pub const TEXT_GROUP_NAME: &str = "text-group";
pub const TEXT_BORDER_NAME: &str = "text-border-rect";
pub const TEXT_CONTENT_NAME: &str = "text-content";

const BORDER_COLOR: Color32 = Color32::from_rgb(0xcc, 0xcc, 0xcc);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TextBox {
    group: NodeId,
    border: NodeId,
    text: NodeId,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum TextState {
    #[default]
    Idle,
    /// Box anchored, following the pointer
    Sizing { pending: TextBox, start: Pos2 },
    /// Box committed, waiting for the overlay to save or cancel
    Editing { pending: TextBox },
}

impl TextState {
    fn pending(&self) -> Option<TextBox> {
        match self {
            Self::Idle => None,
            Self::Sizing { pending, .. } | Self::Editing { pending } => Some(*pending),
        }
    }
}

/// Text boxes: click to anchor, move to size, click to open the input overlay.
///
/// The box is finished once the overlay sends [`SaveText`]; [`CancelText`] or
/// Escape discard it.
#[derive(Debug, Clone, Default)]
pub struct TextTool {
    state: Rc<RefCell<TextState>>,
}

impl TextTool {
    /// Drops the box in progress, if any. A group already deleted from the
    /// drawing is left to the history that holds it.
    fn discard(state: &RefCell<TextState>, surface: &Surface) -> bool {
        let previous = std::mem::take(&mut *state.borrow_mut());
        let Some(pending) = previous.pending() else {
            return false;
        };
        let mut scene = surface.scene_mut();
        if scene.parent(pending.group) == Some(surface.root_id()) {
            scene.destroy(pending.group);
        }
        true
    }

    fn start(ctx: &ToolContext, surface: &Surface, start: Pos2) -> Option<TextBox> {
        let border = Node::new(NodeKind::Rect { size: Vec2::ZERO })
            .with_name(TEXT_BORDER_NAME)
            .with_config(NodeConfig {
                stroke: Some(BORDER_COLOR),
                dash: vec![10.0, 5.0],
                ..Default::default()
            });
        let text = Node::new(NodeKind::Text {
            text: String::new(),
            size: Vec2::ZERO,
        })
        .with_name(TEXT_CONTENT_NAME)
        .with_config(ctx.node_config());

        let group = surface.add_to_root(
            Node::new(NodeKind::Group)
                .with_name(TEXT_GROUP_NAME)
                .with_position(start),
        )?;
        let mut scene = surface.scene_mut();
        Some(TextBox {
            group,
            border: scene.insert_child(group, border),
            text: scene.insert_child(group, text),
        })
    }

    /// Overlay placement for a sized box: normalised to a positive size and
    /// kept inside the dashed border
    fn editor_request(surface: &Surface, pending: TextBox) -> Option<ShowTextEditor> {
        let scene = surface.scene();
        let group = scene.get(pending.group)?;
        let border = scene.get(pending.border)?;
        let text = scene.get(pending.text)?;

        let border_width = border.config.stroke_width;
        let mut position = group.position;
        let mut size = border.size().unwrap_or_default();
        if size.x < 0.0 {
            position.x += size.x;
            size.x = -size.x;
        }
        if size.y < 0.0 {
            position.y += size.y;
            size.y = -size.y;
        }

        let config = &text.config;
        Some(ShowTextEditor {
            node_id: pending.text,
            position: Pos2::new(position.x + border_width, position.y),
            size: Vec2::new(size.x - border_width * 3.5, size.y - border_width * 3.0),
            style: TextStyle {
                font_family: config.font_family.clone().unwrap_or_else(|| "monospace".into()),
                font_size: config.font_size.unwrap_or(12.0),
                font_style: config.font_style.clone().unwrap_or_else(|| "normal".into()),
                padding: config.padding.unwrap_or(0.0),
                fill: config.fill.unwrap_or(Color32::BLACK),
            },
        })
    }

    /// Installs the overlay handlers once; they outlive activations
    fn install_overlay_handlers(&self, ctx: &ToolContext) {
        let bus = ctx.bus();

        if !bus.exists::<SaveText>() {
            let (c, state) = (ctx.clone(), self.state.clone());
            bus.on(move |save: &SaveText| {
                let Some(surface) = c.surface() else {
                    return;
                };
                let group = {
                    let mut scene = surface.scene_mut();
                    let Some(node) = scene.get_mut(save.node_id) else {
                        return;
                    };
                    let NodeKind::Text { text, .. } = &mut node.kind else {
                        return;
                    };
                    *text = save.value.clone();
                    let group = node.parent();

                    // Keep the border so the box can be edited again, just hide it.
                    let border =
                        group.and_then(|group| scene.find_one_by_name(group, TEXT_BORDER_NAME));
                    if let Some(border) = border.and_then(|border| scene.get_mut(border)) {
                        border.visible = false;
                    }
                    group
                };

                let finished = match *state.borrow() {
                    TextState::Editing { pending } if pending.text == save.node_id => {
                        Some(pending.group)
                    }
                    _ => None,
                };
                if let Some(finished) = finished {
                    *state.borrow_mut() = TextState::Idle;
                    // Deleted while the overlay was open: nothing left to record.
                    let attached = surface.scene().parent(finished) == Some(surface.root_id());
                    if attached {
                        c.notify(finished);
                    } else {
                        log::debug!("text group {finished} was removed before saving");
                    }
                } else {
                    log::debug!("re-edited text {} in group {group:?}", save.node_id);
                }
            });
        }

        if !bus.exists::<CancelText>() {
            let (c, state) = (ctx.clone(), self.state.clone());
            bus.on(move |cancel: &CancelText| {
                let editing = match *state.borrow() {
                    TextState::Editing { pending } => pending.text == cancel.node_id,
                    _ => false,
                };
                if !editing {
                    return;
                }
                if let Some(surface) = c.surface() {
                    TextTool::discard(&state, &surface);
                }
                c.bus().emit(HideTextEditor);
            });
        }
    }
}

impl Gesture for TextTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Text
    }

    fn default_options(&self) -> ToolOptions {
        ToolOptions {
            node_config: NodeConfig {
                fill: Some(Color32::BLACK),
                font_family: Some("monospace".into()),
                font_style: Some("normal".into()),
                padding: Some(4.0),
                font_size: Some(12.0),
                ..Default::default()
            },
            color_keys: vec![ColorKey::Fill],
            ..Default::default()
        }
    }

    fn mount(&mut self, ctx: &ToolContext) {
        let (c, state) = (ctx.clone(), self.state.clone());
        ctx.on(Channel::Click, move |event| {
            let Some(input) = primary(event) else {
                return;
            };
            let Some(surface) = c.surface() else {
                return;
            };

            let current = *state.borrow();
            if let TextState::Sizing { pending, .. } = current {
                *state.borrow_mut() = TextState::Editing { pending };
                if let Some(request) = TextTool::editor_request(&surface, pending) {
                    c.bus().emit(request);
                }
                return;
            }

            // Close whatever overlay may still be open before drawing a new box.
            TextTool::discard(&state, &surface);
            c.bus().emit(HideTextEditor);

            let start = surface.relative_position(input.page, true);
            if let Some(pending) = TextTool::start(&c, &surface, start) {
                *state.borrow_mut() = TextState::Sizing { pending, start };
            }
        });

        let (c, state) = (ctx.clone(), self.state.clone());
        ctx.on(Channel::PointerMove, move |event| {
            let (TextState::Sizing { pending, start }, Some(input)) =
                (*state.borrow(), pointer(event))
            else {
                return;
            };
            let Some(surface) = c.surface() else {
                return;
            };

            let size = surface.relative_position(input.page, true) - start;
            let mut scene = surface.scene_mut();
            for id in [pending.border, pending.text] {
                if let Some(node) = scene.get_mut(id) {
                    node.set_size(size);
                }
            }
        });

        let (c, state) = (ctx.clone(), self.state.clone());
        ctx.on(Channel::KeyDown, move |event| {
            if !is_key(event, Key::Escape) {
                return;
            }
            let Some(surface) = c.surface() else {
                return;
            };
            if TextTool::discard(&state, &surface) {
                c.bus().emit(HideTextEditor);
            }
        });

        self.install_overlay_handlers(ctx);
    }

    fn unmount(&mut self, ctx: &ToolContext) {
        ctx.unbind_gestures();

        // A box still being sized has no overlay to finish it.
        let sizing = matches!(*self.state.borrow(), TextState::Sizing { .. });
        if let (true, Some(surface)) = (sizing, ctx.surface()) {
            TextTool::discard(&self.state, &surface);
        }
    }

    fn destroy(&mut self, ctx: &ToolContext) {
        ctx.bus().off::<SaveText>();
        ctx.bus().off::<CancelText>();
        *self.state.borrow_mut() = TextState::Idle;
    }
}
