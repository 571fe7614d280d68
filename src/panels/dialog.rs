use egui::{Align2, Color32, RichText};

use crate::PaintApp;
use crate::event::Severity;

fn accent(severity: Severity) -> (&'static str, Color32) {
    match severity {
        Severity::Info => ("ℹ", Color32::LIGHT_BLUE),
        Severity::Warning => ("⚠", Color32::from_rgb(230, 160, 0)),
        Severity::Error => ("⛔", Color32::RED),
    }
}

/// Confirmation dialog; `on_confirm` only runs when the user accepts
pub fn dialog(app: &mut PaintApp, ctx: &egui::Context) {
    let Some(request) = app.overlays().borrow().dialog.clone() else {
        return;
    };

    let (icon, color) = accent(request.severity);
    let mut answer = None;
    egui::Window::new(RichText::new(format!("{icon} {}", request.title)).color(color))
        .id(egui::Id::new("board_dialog"))
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(&request.body);
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Confirm").clicked() {
                    answer = Some(true);
                }
                if ui.button("Cancel").clicked() {
                    answer = Some(false);
                }
            });
        });

    let Some(confirmed) = answer else {
        return;
    };
    app.overlays().borrow_mut().dialog = None;
    if confirmed {
        (request.on_confirm)();
    } else {
        log::debug!("dialog \"{}\" dismissed", request.title);
    }
}
