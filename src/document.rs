use crate::action::Action;

/// The action log: the single source of truth for what the canvas shows.
///
/// Insertion-ordered and append-only while drawing; the only wholesale
/// mutation is `clear`. Replay walks the log front to back, so later
/// actions draw over earlier ones.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ActionLog {
    actions: Vec<Action>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    /// Append a fully-constructed action to the end of the log.
    pub fn append(&mut self, action: impl Into<Action>) {
        self.actions.push(action.into());
    }

    /// Empty the log.
    pub fn clear(&mut self) {
        self.actions.clear();
    }

    /// The ordered sequence of actions, oldest first.
    pub fn all(&self) -> &[Action] {
        &self.actions
    }

    pub fn get(&self, index: usize) -> Option<&Action> {
        self.actions.get(index)
    }

    /// Mutable access for the selection drag; there is no other in-place
    /// mutation of logged actions.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Action> {
        self.actions.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
