use egui::{Pos2, Rect, Vec2};

use crate::raster::RasterImage;

/// A rendered equation placed on the canvas at a fixed position and size.
///
/// The width and height are already scaled; the action is not re-editable
/// after placement.
#[derive(Debug, Clone, PartialEq)]
pub struct EquationAction {
    pub image: RasterImage,
    pub pos: Pos2,
    pub size: Vec2,
}

impl EquationAction {
    /// Place an equation of the given natural pixel size, scaled by `scale`
    /// and anchored at `pos`.
    pub fn place(image: RasterImage, natural_size: Vec2, pos: Pos2, scale: f32) -> Self {
        Self {
            image,
            pos,
            size: natural_size * scale,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.pos, self.size)
    }
}
