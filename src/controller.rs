use egui::{Pos2, Vec2};
use log::{debug, info};

use crate::action::{EquationAction, LineAction};
use crate::document::ActionLog;
use crate::equation::RenderedEquation;
use crate::geometry::hit_testing;
use crate::tool::ToolContext;

/// A pointer event over the canvas, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Pressed(Pos2),
    Moved(Pos2),
    Released,
    Left,
}

/// What the app must repaint after an event has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Redraw {
    /// Nothing changed on the canvas.
    None,
    /// Actions were appended; painting just the new entries is enough.
    Appended,
    /// Logged actions were mutated in place; only a full replay reproduces
    /// the canvas.
    Full,
}

/// Transient interaction state of the canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerState {
    Idle,
    /// A line tool is down; `last` is the previous sample point and becomes
    /// the start of the next appended segment.
    Drawing { last: Pos2 },
    /// The selection tool grabbed the action at `index`; `grab_offset` is
    /// the pointer's offset from the action's start point at grab time.
    Dragging { index: usize, grab_offset: Vec2 },
    /// A rendered equation is waiting for the next pointer press to be
    /// placed. There is no timeout: the equation stays queued until a press
    /// consumes it or positioning is cancelled.
    PositioningEquation { pending: RenderedEquation },
}

/// Translates pointer events and the current tool context into action-log
/// entries, and tells the caller how much repainting each event demands.
#[derive(Debug)]
pub struct Controller {
    state: ControllerState,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    pub fn new() -> Self {
        Self {
            state: ControllerState::Idle,
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn is_positioning(&self) -> bool {
        matches!(self.state, ControllerState::PositioningEquation { .. })
    }

    /// Arm positioning mode: the next pointer press places `pending`.
    pub fn begin_positioning(&mut self, pending: RenderedEquation) {
        info!(
            "positioning equation ({}x{} natural)",
            pending.image.width(),
            pending.image.height()
        );
        self.state = ControllerState::PositioningEquation { pending };
    }

    /// Leave positioning mode without placing, dropping the pending
    /// equation. A no-op in any other state.
    pub fn cancel_positioning(&mut self) {
        if self.is_positioning() {
            self.state = ControllerState::Idle;
        }
    }

    pub fn handle_event(
        &mut self,
        event: PointerEvent,
        ctx: &ToolContext,
        log: &mut ActionLog,
    ) -> Redraw {
        let (next, redraw) = transition(
            std::mem::replace(&mut self.state, ControllerState::Idle),
            event,
            ctx,
            log,
        );
        self.state = next;
        redraw
    }
}

/// Pure state transition: consumes the current state and yields the next
/// one plus a repaint verdict. Log mutation is the only side effect.
fn transition(
    state: ControllerState,
    event: PointerEvent,
    ctx: &ToolContext,
    log: &mut ActionLog,
) -> (ControllerState, Redraw) {
    match (state, event) {
        (ControllerState::PositioningEquation { pending }, PointerEvent::Pressed(pos)) => {
            place_equation(log, pending, pos, ctx.equation_scale);
            (ControllerState::Idle, Redraw::Appended)
        }

        (ControllerState::Idle, PointerEvent::Pressed(pos)) => match ctx.line_tool() {
            Some(_) => (ControllerState::Drawing { last: pos }, Redraw::None),
            None => match hit_testing::hit_test(log, pos) {
                Some(index) => {
                    let grab_offset = match log.get(index).and_then(|a| a.as_line()) {
                        Some(line) => pos - line.start,
                        None => Vec2::ZERO,
                    };
                    debug!("grabbed action {index}");
                    (ControllerState::Dragging { index, grab_offset }, Redraw::None)
                }
                None => (ControllerState::Idle, Redraw::None),
            },
        },

        (ControllerState::Drawing { last }, PointerEvent::Moved(pos)) => {
            // Both endpoints are known here, so the appended action is
            // always fully constructed.
            if let Some(tool) = ctx.line_tool() {
                log.append(LineAction::new(tool, ctx.color, ctx.stroke_width, last, pos));
                (ControllerState::Drawing { last: pos }, Redraw::Appended)
            } else {
                // Tool switched away mid-stroke; stop drawing.
                (ControllerState::Idle, Redraw::None)
            }
        }

        (ControllerState::Dragging { index, grab_offset }, PointerEvent::Moved(pos)) => {
            let Some(line) = log.get_mut(index).and_then(|a| a.as_line_mut()) else {
                return (ControllerState::Idle, Redraw::None);
            };
            let delta = pos - grab_offset - line.start;
            line.translate(delta);
            (ControllerState::Dragging { index, grab_offset }, Redraw::Full)
        }

        (ControllerState::Drawing { .. }, PointerEvent::Released | PointerEvent::Left)
        | (ControllerState::Dragging { .. }, PointerEvent::Released | PointerEvent::Left) => {
            (ControllerState::Idle, Redraw::None)
        }

        // A queued equation survives release/leave; only a press places it.
        (state, _) => (state, Redraw::None),
    }
}

/// Append an equation placement: anchored at `pos`, natural size scaled by
/// `scale`. Called both for explicit "insert here" placements and when a
/// positioning press lands.
pub fn place_equation(log: &mut ActionLog, rendered: RenderedEquation, pos: Pos2, scale: f32) {
    info!(
        "placing equation at {pos:?}, natural {}x{}, scale {scale}",
        rendered.image.width(),
        rendered.image.height()
    );
    log.append(EquationAction::place(
        rendered.image,
        rendered.natural_size,
        pos,
        scale,
    ));
}
