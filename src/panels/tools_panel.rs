use eframe::egui::{self, Slider};

use crate::app::WhiteboardApp;
use crate::tool::Tool;

pub fn tools_panel(app: &mut WhiteboardApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(200.0)
        .show(ctx, |ui| {
            ui.heading("Tools");
            ui.separator();

            for tool in Tool::ALL {
                let selected = app.tool_ctx.tool == tool;
                if ui.selectable_label(selected, tool.name()).clicked() {
                    log::info!("tool selected from UI: {}", tool.name());
                    app.tool_ctx = app.tool_ctx.with_tool(tool);
                }
            }

            ui.separator();

            ui.horizontal(|ui| {
                ui.label("Color:");
                let mut color = app.tool_ctx.color;
                egui::color_picker::color_edit_button_srgba(
                    ui,
                    &mut color,
                    egui::color_picker::Alpha::Opaque,
                );
                if color != app.tool_ctx.color {
                    app.tool_ctx = app.tool_ctx.with_color(color);
                }
            });

            ui.horizontal(|ui| {
                ui.label("Size:");
                let mut width = app.tool_ctx.stroke_width;
                ui.add(Slider::new(&mut width, 1.0..=50.0));
                if width != app.tool_ctx.stroke_width {
                    app.tool_ctx = app.tool_ctx.with_stroke_width(width);
                }
            });

            ui.separator();

            if ui.button("Equation…").clicked() {
                app.editor.open = true;
            }

            if ui.button("Clear canvas").clicked() {
                app.clear_canvas();
            }

            ui.separator();
            ui.label("Drop an image anywhere to set the background.");
        });
}
