use crate::PaintApp;

/// The drawing canvas: feeds input to the board, then paints it
pub fn central_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none())
        .show(ctx, |ui| {
            let canvas_rect = ui.available_rect_before_wrap();
            let response = ui.allocate_rect(canvas_rect, egui::Sense::click_and_drag());
            let hovered = response.hovered() || response.is_pointer_button_down_on();

            app.handle_input(ctx, canvas_rect, hovered);
            if hovered {
                ctx.set_cursor_icon(app.board().surface().cursor());
            }

            let painter = ui.painter_at(canvas_rect);
            app.renderer()
                .render(&painter, app.board().surface(), canvas_rect);
        });
}
