use egui::{Context, TextureHandle, TextureOptions};
use log::debug;

use crate::action::Action;
use crate::document::ActionLog;
use crate::raster::Surface;

/// Paint a single action onto the surface.
///
/// Used both during replay and for incremental painting while the user is
/// drawing; either way an action is rendered exactly the same.
pub fn draw_action(surface: &mut Surface, action: &Action) {
    match action {
        Action::Line(line) => {
            surface.stroke_segment(
                line.start,
                line.end,
                line.width,
                line.color,
                line.tool.opacity(),
                line.tool.composite_mode(),
            );
        }
        Action::Equation(eq) => {
            surface.blit(&eq.image, eq.rect());
        }
    }
}

/// Rebuild the raster from scratch: clear, then repaint every logged action
/// in insertion order.
///
/// The result is a deterministic function of the log and the surface size;
/// it never depends on prior raster state. An empty log replays to a fully
/// transparent surface.
pub fn replay(log: &ActionLog, size: [usize; 2]) -> Surface {
    debug!("replaying {} actions at {}x{}", log.len(), size[0], size[1]);
    let mut surface = Surface::new(size[0], size[1]);
    for action in log.all() {
        draw_action(&mut surface, action);
    }
    surface
}

/// Owns the GPU texture the canvas surface is displayed through and
/// re-uploads it when the raster changes.
pub struct CanvasTexture {
    name: &'static str,
    handle: Option<TextureHandle>,
}

impl CanvasTexture {
    pub fn new(name: &'static str) -> Self {
        Self { name, handle: None }
    }

    /// Upload the surface, replacing the previous texture contents.
    pub fn upload(&mut self, ctx: &Context, surface: &Surface) -> &TextureHandle {
        let image = surface.to_color_image();
        match &mut self.handle {
            Some(handle) => handle.set(image, TextureOptions::NEAREST),
            None => {
                self.handle = Some(ctx.load_texture(self.name, image, TextureOptions::NEAREST));
            }
        }
        self.handle.as_ref().expect("texture was just created")
    }

    pub fn handle(&self) -> Option<&TextureHandle> {
        self.handle.as_ref()
    }
}
