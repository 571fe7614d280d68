use egui::{Color32, Vec2};

use crate::PaintApp;
use crate::factory::Toolbar;
use crate::tools::{BrushType, NodeConfigPatch, OptionsPatch, ToolKind};

fn font_size(size: f32) -> OptionsPatch {
    OptionsPatch {
        node_config: Some(NodeConfigPatch {
            font_size: Some(size),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn padding(padding: f32) -> OptionsPatch {
    OptionsPatch {
        node_config: Some(NodeConfigPatch {
            padding: Some(padding),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn tools_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(180.0)
        .show(ctx, |ui| {
            ui.heading("Tools");

            // Collect tool info first to avoid borrowing issues
            let active = app.board().factory().current_kind();
            let tools: Vec<(ToolKind, &'static str, &'static str)> = app
                .board()
                .factory()
                .items()
                .map(|item| (item.tool.kind(), item.icon, item.tip))
                .collect();

            for (kind, icon, tip) in tools {
                let label = format!("{icon}  {tip}");
                if ui.selectable_label(active == Some(kind), label).clicked() {
                    log::info!("Tool selected from UI: {}", kind.name());
                    app.select_tool(kind);
                }
            }
            ui.separator();

            tool_options(app, ui);
            ui.separator();

            ui.horizontal(|ui| {
                let (can_undo, can_redo) = {
                    let history = app.board().history().borrow();
                    (history.can_undo(), history.can_redo())
                };
                if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                    app.board().undo();
                }
                if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                    app.board().redo();
                }
            });
            {
                let history = app.board().history().borrow();
                ui.label(format!(
                    "Undo: {}  Redo: {}",
                    history.undo_len(),
                    history.redo_len()
                ));
            }

            let scale = app.board().surface().root_scale();
            ui.label(format!("Zoom: {:.0}%", scale.x * 100.0));
        });
}

/// Options of the active tool, laid out by its toolbar
fn tool_options(app: &mut PaintApp, ui: &mut egui::Ui) {
    let Some(kind) = app.board().factory().current_kind() else {
        return;
    };
    let Some(toolbar) = app.board().factory().item(kind).and_then(|item| item.toolbar) else {
        ui.label("Drag to pan the board");
        return;
    };
    let Some(options) = app.board().factory().tool(kind).map(|tool| tool.options()) else {
        return;
    };

    let mut color = options.primary_color().unwrap_or(Color32::BLACK);
    ui.horizontal(|ui| {
        ui.label("Color");
        if ui.color_edit_button_srgba(&mut color).changed() {
            app.board().factory().change_color(color);
        }
    });

    let mut patch = None;
    match toolbar {
        Toolbar::Base => {
            let mut width = options.node_config.stroke_width;
            if ui
                .add(egui::Slider::new(&mut width, 1.0..=40.0).text("Stroke"))
                .changed()
            {
                patch = Some(OptionsPatch::stroke_width(width));
            }
        }
        Toolbar::Text => {
            let mut size = options.node_config.font_size.unwrap_or(12.0);
            if ui
                .add(egui::Slider::new(&mut size, 8.0..=96.0).text("Font size"))
                .changed()
            {
                patch = Some(font_size(size));
            }
            let mut pad = options.node_config.padding.unwrap_or(0.0);
            if ui
                .add(egui::Slider::new(&mut pad, 0.0..=32.0).text("Padding"))
                .changed()
            {
                patch = Some(padding(pad));
            }
        }
        Toolbar::Brush => {
            let mut width = options.brush_width;
            if ui
                .add(egui::Slider::new(&mut width, 1.0..=60.0).text("Width"))
                .changed()
            {
                patch = Some(OptionsPatch {
                    brush_width: Some(width),
                    ..Default::default()
                });
            }
            let mut brush_type = options.brush_type;
            ui.horizontal(|ui| {
                ui.radio_value(&mut brush_type, BrushType::Round, "Round");
                ui.radio_value(&mut brush_type, BrushType::Square, "Square");
            });
            if brush_type != options.brush_type {
                patch = Some(OptionsPatch {
                    brush_type: Some(brush_type),
                    ..Default::default()
                });
            }
        }
    }

    let preview_width = match toolbar {
        Toolbar::Brush => options.brush_width,
        _ => options.node_config.stroke_width,
    };
    let (rect, _) = ui.allocate_exact_size(Vec2::new(ui.available_width(), 24.0), egui::Sense::hover());
    app.renderer()
        .swatch(ui.painter(), rect, color, preview_width);

    if let (Some(patch), Some(tool)) = (patch, app.board_mut().factory_mut().tool_mut(kind)) {
        tool.set_options(patch);
    }
}
