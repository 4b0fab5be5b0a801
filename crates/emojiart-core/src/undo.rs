//! Linear undo/redo history of named, reversible actions.

/// Default number of undo steps to keep.
pub const DEFAULT_UNDO_LIMIT: usize = 50;

/// An action on the history together with its user-facing name.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoEntry<A> {
    pub name: String,
    pub action: A,
}

/// Undo and redo stacks.
///
/// `A` is an action that, when applied, yields its own inverse. Undoing pops
/// the newest action, applies it, and pushes the inverse onto the redo stack
/// under the same name. Redo mirrors this.
#[derive(Debug, Clone)]
pub struct UndoManager<A> {
    undo_stack: Vec<UndoEntry<A>>,
    redo_stack: Vec<UndoEntry<A>>,
    limit: usize,
}

impl<A> Default for UndoManager<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> UndoManager<A> {
    /// Create an empty history with the default limit.
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_UNDO_LIMIT)
    }

    /// Create an empty history keeping at most `limit` undo steps.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Record the inverse of an action that was just performed.
    ///
    /// Clears the redo stack.
    pub fn register(&mut self, name: impl Into<String>, action: A) {
        self.redo_stack.clear();
        self.push_undo(UndoEntry {
            name: name.into(),
            action,
        });
    }

    fn push_undo(&mut self, entry: UndoEntry<A>) {
        self.undo_stack.push(entry);
        if self.undo_stack.len() > self.limit {
            self.undo_stack.remove(0);
        }
    }

    /// Undo the newest action using `apply`, which performs it and returns
    /// its inverse, or `None` if it no longer applies.
    /// Returns true if undo was performed. A stale entry is dropped and
    /// reported as false.
    pub fn undo(&mut self, apply: impl FnOnce(A) -> Option<A>) -> bool {
        let Some(entry) = self.undo_stack.pop() else {
            return false;
        };
        match apply(entry.action) {
            Some(inverse) => {
                self.redo_stack.push(UndoEntry {
                    name: entry.name,
                    action: inverse,
                });
                true
            }
            None => {
                log::warn!("Dropped undo entry '{}': nothing to revert", entry.name);
                false
            }
        }
    }

    /// Redo the most recently undone action.
    /// Returns true if redo was performed. A stale entry is dropped and
    /// reported as false.
    pub fn redo(&mut self, apply: impl FnOnce(A) -> Option<A>) -> bool {
        let Some(entry) = self.redo_stack.pop() else {
            return false;
        };
        match apply(entry.action) {
            Some(inverse) => {
                self.push_undo(UndoEntry {
                    name: entry.name,
                    action: inverse,
                });
                true
            }
            None => {
                log::warn!("Dropped redo entry '{}': nothing to re-apply", entry.name);
                false
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Name of the action [`UndoManager::undo`] would revert.
    pub fn undo_action_name(&self) -> Option<&str> {
        self.undo_stack.last().map(|entry| entry.name.as_str())
    }

    /// Name of the action [`UndoManager::redo`] would re-apply.
    pub fn redo_action_name(&self) -> Option<&str> {
        self.redo_stack.last().map(|entry| entry.name.as_str())
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
