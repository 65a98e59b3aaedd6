use egui::Vec2;

mod equation;
mod line;

pub use equation::EquationAction;
pub use line::{LineAction, LineTool};

/// One entry in the action log.
///
/// Every consumer (render, hit-test, drag) matches exhaustively on this
/// enum, so adding a variant forces each site to decide what to do with it.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Line(LineAction),
    Equation(EquationAction),
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Line(_) => "line",
            Action::Equation(_) => "equation",
        }
    }

    /// Move the action by the given delta.
    ///
    /// Only line actions are draggable through the selection tool, but
    /// translation itself is well-defined for both variants.
    pub fn translate(&mut self, delta: Vec2) {
        match self {
            Action::Line(line) => line.translate(delta),
            Action::Equation(eq) => eq.pos += delta,
        }
    }

    pub fn as_line(&self) -> Option<&LineAction> {
        match self {
            Action::Line(line) => Some(line),
            Action::Equation(_) => None,
        }
    }

    pub fn as_line_mut(&mut self) -> Option<&mut LineAction> {
        match self {
            Action::Line(line) => Some(line),
            Action::Equation(_) => None,
        }
    }
}

impl From<LineAction> for Action {
    fn from(line: LineAction) -> Self {
        Action::Line(line)
    }
}

impl From<EquationAction> for Action {
    fn from(eq: EquationAction) -> Self {
        Action::Equation(eq)
    }
}
