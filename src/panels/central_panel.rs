use eframe::egui::{self, Color32, CursorIcon, Pos2, Rect};

use crate::app::WhiteboardApp;

const FULL_UV: Rect = Rect {
    min: Pos2::ZERO,
    max: Pos2::new(1.0, 1.0),
};

pub fn central_panel(app: &mut WhiteboardApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let available = ui.available_size();
        let (response, painter) = ui.allocate_painter(available, egui::Sense::click_and_drag());
        let canvas_rect = response.rect;

        app.ensure_canvas_size(canvas_rect);

        for event in app.gather_pointer_events(ctx, canvas_rect) {
            app.apply_event(event);
        }
        app.sync_canvas(ctx);

        // Background beneath, then the drawing raster on top.
        if let Some(texture) = app.background_texture(ctx) {
            painter.image(texture.id(), canvas_rect, FULL_UV, Color32::WHITE);
        }
        if let Some(texture) = app.canvas_texture() {
            painter.image(texture.id(), canvas_rect, FULL_UV, Color32::WHITE);
        }

        if app.controller.is_positioning() && response.hovered() {
            ctx.set_cursor_icon(CursorIcon::Crosshair);
        }
    });
}
