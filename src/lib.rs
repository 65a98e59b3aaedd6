#![warn(clippy::all, rust_2018_idioms)]

pub mod action;
pub mod app;
pub mod background;
pub mod controller;
pub mod document;
pub mod equation;
pub mod file_handler;
pub mod geometry;
pub mod panels;
pub mod raster;
pub mod renderer;
pub mod tool;

pub use action::{Action, EquationAction, LineAction, LineTool};
pub use app::WhiteboardApp;
pub use controller::{Controller, PointerEvent, Redraw};
pub use document::ActionLog;
pub use equation::{EquationRenderer, EquationService, RenderedEquation};
pub use raster::{RasterImage, Surface};
pub use tool::{Tool, ToolContext};
