use egui::Pos2;

use crate::action::Action;
use crate::document::ActionLog;

/// Maximum distance, in pixels, from a line endpoint at which a click
/// still selects the action.
pub const HIT_TOLERANCE: f32 = 10.0;

/// Find the action under the pointer, if any.
///
/// Scans the log newest-first so the most recently drawn qualifying action
/// wins (newest is on top). An action is hit when the pointer is within
/// [`HIT_TOLERANCE`] of either of its endpoints; equation actions have no
/// endpoints and are never selectable.
pub fn hit_test(log: &ActionLog, pos: Pos2) -> Option<usize> {
    for (index, action) in log.all().iter().enumerate().rev() {
        match action {
            Action::Line(line) => {
                if pos.distance(line.start) <= HIT_TOLERANCE
                    || pos.distance(line.end) <= HIT_TOLERANCE
                {
                    return Some(index);
                }
            }
            Action::Equation(_) => {}
        }
    }
    None
}
