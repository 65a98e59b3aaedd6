mod central_panel;
mod equation_editor;
mod tools_panel;

pub use central_panel::central_panel;
pub use equation_editor::equation_editor;
pub use tools_panel::tools_panel;
