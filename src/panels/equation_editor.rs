use eframe::egui::{self, DragValue};

use crate::app::WhiteboardApp;
use crate::equation::PlacementMode;

pub fn equation_editor(app: &mut WhiteboardApp, ctx: &egui::Context) {
    if !app.editor.open {
        return;
    }

    let mut open = app.editor.open;
    egui::Window::new("Equation")
        .open(&mut open)
        .resizable(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("LaTeX:");
                ui.text_edit_singleline(&mut app.editor.latex);
            });

            ui.horizontal(|ui| {
                ui.label("Scale:");
                let mut scale = app.tool_ctx.equation_scale;
                ui.add(DragValue::new(&mut scale).range(0.5..=5.0).speed(0.1));
                if scale != app.tool_ctx.equation_scale {
                    app.tool_ctx = app.tool_ctx.with_equation_scale(scale);
                }
            });

            ui.horizontal(|ui| {
                if ui.button("Insert").clicked() {
                    app.request_equation(PlacementMode::InsertAtDefault);
                }
                if ui.button("Position").clicked() {
                    app.request_equation(PlacementMode::Position);
                }
                if ui.button("Cancel").clicked() {
                    app.editor.open = false;
                    app.equations.cancel();
                    app.controller.cancel_positioning();
                }
            });

            if !app.editor.status.is_empty() {
                ui.label(app.editor.status.clone());
            }
            if let Some(preview) = &app.editor.preview {
                ui.separator();
                ui.image((preview.id(), preview.size_vec2()));
            }
        });
    app.editor.open = app.editor.open && open;
}
