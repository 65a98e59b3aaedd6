use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::action::LineTool;

/// The user-selectable canvas tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tool {
    Pencil,
    Eraser,
    Marker,
    Selection,
}

impl Tool {
    pub fn name(self) -> &'static str {
        match self {
            Tool::Pencil => "Pencil",
            Tool::Eraser => "Eraser",
            Tool::Marker => "Marker",
            Tool::Selection => "Selection",
        }
    }

    /// All tools, in toolbar order.
    pub const ALL: [Tool; 4] = [Tool::Pencil, Tool::Eraser, Tool::Marker, Tool::Selection];
}

/// The current input context: tool, color, stroke size and equation scale.
///
/// This is an immutable value passed into each event-handling call and
/// replaced through the pure `with_*` transitions below. Actions read it at
/// creation time, so changing the color later never recolors an existing
/// stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolContext {
    pub tool: Tool,
    pub color: Color32,
    pub stroke_width: f32,
    pub equation_scale: f32,
}

impl Default for ToolContext {
    fn default() -> Self {
        Self {
            tool: Tool::Pencil,
            color: Color32::BLACK,
            stroke_width: 5.0,
            equation_scale: 2.0,
        }
    }
}

impl ToolContext {
    pub fn with_tool(self, tool: Tool) -> Self {
        Self { tool, ..self }
    }

    pub fn with_color(self, color: Color32) -> Self {
        Self { color, ..self }
    }

    pub fn with_stroke_width(self, stroke_width: f32) -> Self {
        Self {
            stroke_width,
            ..self
        }
    }

    pub fn with_equation_scale(self, equation_scale: f32) -> Self {
        Self {
            equation_scale,
            ..self
        }
    }

    /// The line tool this context draws with, if the current tool draws
    /// lines at all.
    pub fn line_tool(&self) -> Option<LineTool> {
        match self.tool {
            Tool::Pencil => Some(LineTool::Pencil),
            Tool::Eraser => Some(LineTool::Eraser),
            Tool::Marker => Some(LineTool::Marker),
            Tool::Selection => None,
        }
    }
}
