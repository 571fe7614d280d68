use egui::{FontId, Key, Modifiers, Order, Vec2};

use crate::PaintApp;
use crate::event::{CancelText, SaveText};
use crate::renderer::root_to_screen;
use crate::scene::NodeId;

enum EditorAction {
    Save { node_id: NodeId, value: String },
    Cancel { node_id: NodeId },
}

/// Enter and Ctrl+Enter save the text; Shift+Enter is left to the field as a
/// line break.
fn saves_on_enter(modifiers: Modifiers) -> bool {
    !modifiers.shift && !modifiers.alt
}

/// Text input overlay placed over the text box being edited.
///
/// Enter or Ctrl+Enter saves, Shift+Enter inserts a line break and Escape cancels.
pub fn text_editor(app: &mut PaintApp, ctx: &egui::Context) {
    let surface = app.board().surface().clone();
    let canvas = app.canvas_rect();
    let overlays = app.overlays().clone();

    let action = {
        let mut overlays = overlays.borrow_mut();
        let Some(state) = overlays.text_editor.as_mut() else {
            return;
        };

        let scale = surface.root_scale();
        let request = &state.request;
        let position = root_to_screen(&surface, canvas, request.position);
        let size = Vec2::new(
            (request.size.x * scale.x).max(24.0),
            (request.size.y * scale.y).max(16.0),
        );
        let font = match request.style.font_family.as_str() {
            "monospace" => FontId::monospace(request.style.font_size * scale.y),
            _ => FontId::proportional(request.style.font_size * scale.y),
        };
        let id = egui::Id::new("board_text_editor").with(request.node_id);

        let mut action = None;
        egui::Area::new(id.with("area"))
            .order(Order::Foreground)
            .fixed_pos(position)
            .show(ctx, |ui| {
                let focused = ui.memory(|m| m.has_focus(id));
                if focused {
                    let save = ui.input_mut(|i| {
                        let modifiers = i.modifiers;
                        saves_on_enter(modifiers) && i.consume_key(modifiers, Key::Enter)
                    });
                    if save {
                        action = Some(EditorAction::Save {
                            node_id: state.request.node_id,
                            value: state.value.clone(),
                        });
                    } else if ui.input_mut(|i| i.consume_key(Modifiers::NONE, Key::Escape)) {
                        action = Some(EditorAction::Cancel {
                            node_id: state.request.node_id,
                        });
                    }
                }

                let response = ui.add_sized(
                    size,
                    egui::TextEdit::multiline(&mut state.value)
                        .id(id)
                        .font(font)
                        .text_color(state.request.style.fill)
                        .margin(Vec2::splat(state.request.style.padding))
                        .frame(false),
                );
                if !state.focused {
                    response.request_focus();
                    state.focused = true;
                }
            });

        if action.is_some() {
            overlays.text_editor = None;
        }
        action
    };

    // The overlay borrow is released before the tools react to the result.
    match action {
        Some(EditorAction::Save { node_id, value }) => {
            app.board().bus().emit(SaveText { node_id, value });
        }
        Some(EditorAction::Cancel { node_id }) => {
            app.board().bus().emit(CancelText { node_id });
        }
        None => {}
    }
}
