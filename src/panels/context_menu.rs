use egui::{Key, Order};

use crate::PaintApp;
use crate::contextmenu::MenuKind;

/// Popup listing the entries published for the last right click
pub fn context_menu(app: &mut PaintApp, ctx: &egui::Context) {
    let Some(menu) = app.overlays().borrow().context_menu.clone() else {
        return;
    };

    let mut picked = None;
    let area = egui::Area::new(egui::Id::new("board_contextmenu"))
        .order(Order::Foreground)
        .fixed_pos(menu.position)
        .show(ctx, |ui| {
            egui::Frame::menu(ui.style()).show(ui, |ui| {
                ui.set_min_width(140.0);
                for entry in &menu.entries {
                    match &entry.kind {
                        MenuKind::Item { label } => {
                            if ui.button(label).clicked() {
                                picked = Some(entry.key.clone());
                            }
                        }
                        MenuKind::Divider => {
                            ui.separator();
                        }
                    }
                }
            });
        });

    let dismissed = ctx.input(|i| i.key_pressed(Key::Escape))
        || (ctx.input(|i| i.pointer.any_pressed()) && !area.response.contains_pointer());
    if picked.is_some() || dismissed {
        app.overlays().borrow_mut().context_menu = None;
    }

    if let Some(key) = picked {
        log::debug!("context menu picked {key}");
        if !app.board().factory().emit(&key, menu.target) {
            log::warn!("no command bound to {key}");
        }
    }
}
