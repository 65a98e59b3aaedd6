use eframe::egui;
use log::{info, warn};

/// Receives image files dropped onto the window; the newest dropped image
/// becomes the background-image candidate.
pub struct FileHandler {
    dropped_files: Vec<egui::DroppedFile>,
}

impl Default for FileHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl FileHandler {
    pub fn new() -> Self {
        Self {
            dropped_files: Vec::new(),
        }
    }

    /// Collect any newly dropped files from the UI context.
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) {
        ctx.input(|i| {
            if !i.raw.dropped_files.is_empty() {
                self.dropped_files = i.raw.dropped_files.clone();
            }
        });
    }

    /// Take the bytes of the most recently dropped image file, if any.
    pub fn take_background_candidate(&mut self) -> Option<Vec<u8>> {
        let files = std::mem::take(&mut self.dropped_files);
        for file in files.into_iter().rev() {
            if !is_image_file(&file) {
                warn!("dropped file is not a supported image: {}", file_name(&file));
                continue;
            }
            if let Some(bytes) = &file.bytes {
                info!(
                    "background candidate from memory: {} ({} bytes)",
                    file_name(&file),
                    bytes.len()
                );
                return Some(bytes.to_vec());
            }
            #[cfg(not(target_arch = "wasm32"))]
            if let Some(path) = &file.path {
                match std::fs::read(path) {
                    Ok(bytes) => {
                        info!("background candidate from path: {}", path.display());
                        return Some(bytes);
                    }
                    Err(err) => {
                        warn!("failed to read dropped file {}: {err}", path.display());
                    }
                }
            }
        }
        None
    }

    /// Overlay shown while files are being dragged over the window.
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, Id, LayerId, Order, TextStyle};

        if ctx.input(|i| i.raw.hovered_files.is_empty()) {
            return;
        }

        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            "Drop an image to set the background",
            TextStyle::Heading.resolve(&ctx.style()),
            Color32::WHITE,
        );
    }
}

fn file_name(file: &egui::DroppedFile) -> String {
    if let Some(path) = &file.path {
        path.display().to_string()
    } else if !file.name.is_empty() {
        file.name.clone()
    } else {
        "unknown".to_owned()
    }
}

fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        file.mime.starts_with("image/")
    } else if let Some(path) = &file.path {
        path.extension()
            .map(|ext| {
                let ext = ext.to_string_lossy().to_lowercase();
                matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp")
            })
            .unwrap_or(false)
    } else {
        false
    }
}
