use egui::{Color32, Pos2, Vec2};

use crate::raster::CompositeMode;

/// The three line-shaped drawing tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LineTool {
    Pencil,
    Eraser,
    Marker,
}

impl LineTool {
    /// Opacity applied to every segment drawn with this tool.
    pub fn opacity(self) -> f32 {
        match self {
            LineTool::Pencil | LineTool::Eraser => 1.0,
            LineTool::Marker => 0.2,
        }
    }

    /// How the tool's pixels combine with the existing raster.
    pub fn composite_mode(self) -> CompositeMode {
        match self {
            LineTool::Pencil | LineTool::Marker => CompositeMode::SourceOver,
            LineTool::Eraser => CompositeMode::DestinationOut,
        }
    }
}

/// One short straight segment; a freehand stroke is a run of these.
#[derive(Debug, Clone, PartialEq)]
pub struct LineAction {
    pub tool: LineTool,
    pub color: Color32,
    pub width: f32,
    pub start: Pos2,
    pub end: Pos2,
}

impl LineAction {
    /// Create a segment. The eraser ignores the requested color; it is
    /// forced to opaque black so the segment's coverage alpha is 1.
    pub fn new(tool: LineTool, color: Color32, width: f32, start: Pos2, end: Pos2) -> Self {
        let color = match tool {
            LineTool::Eraser => Color32::BLACK,
            LineTool::Pencil | LineTool::Marker => color,
        };
        Self {
            tool,
            color,
            width,
            start,
            end,
        }
    }

    /// Move both endpoints by the given delta.
    pub fn translate(&mut self, delta: Vec2) {
        self.start += delta;
        self.end += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn test_eraser_color_is_forced() {
        let line = LineAction::new(
            LineTool::Eraser,
            Color32::RED,
            5.0,
            pos2(0.0, 0.0),
            pos2(1.0, 1.0),
        );
        assert_eq!(line.color, Color32::BLACK);

        let line = LineAction::new(
            LineTool::Pencil,
            Color32::RED,
            5.0,
            pos2(0.0, 0.0),
            pos2(1.0, 1.0),
        );
        assert_eq!(line.color, Color32::RED);
    }

    #[test]
    fn test_marker_is_translucent_source_over() {
        assert_eq!(LineTool::Marker.opacity(), 0.2);
        assert_eq!(LineTool::Marker.composite_mode(), CompositeMode::SourceOver);
        assert_eq!(LineTool::Eraser.composite_mode(), CompositeMode::DestinationOut);
        assert_eq!(LineTool::Pencil.opacity(), 1.0);
    }
}
