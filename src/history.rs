//! Undo/redo engine over reversible actions.
//!
//! A [`History`] owns the value it edits (its *target*) together with a stack
//! of [`Action`]s. Actions below `pos` have been applied; actions at or above
//! `pos` can be redone. Once a target lives inside a `History`, every edit is
//! expected to go through [`History::push_and_apply`] so it can be reversed.
//!
//! ```
//! use treesource::history::{Action, History};
//!
//! struct Append(i32);
//!
//! impl Action<Vec<i32>> for Append {
//!     fn apply(&mut self, target: &mut Vec<i32>) {
//!         target.push(self.0);
//!     }
//!     fn unapply(&mut self, target: &mut Vec<i32>) {
//!         target.pop();
//!     }
//! }
//!
//! let mut history = History::new(Vec::new());
//! history.push_and_apply(Append(1));
//! history.push_and_apply(Append(2));
//! history.undo();
//! assert_eq!(history.target(), &vec![1]);
//! history.redo();
//! assert_eq!(history.target(), &vec![1, 2]);
//! ```

use tracing::debug;

/// A reversible edit of a `T`.
///
/// `unapply` must exactly reverse the effect of the preceding `apply`. Both
/// take `&mut self` so an action can capture whatever it needs for reversal at
/// the moment it is applied.
pub trait Action<T> {
    /// Perform the edit on `target`.
    fn apply(&mut self, target: &mut T);

    /// Reverse the edit on `target`.
    fn unapply(&mut self, target: &mut T);
}

/// Undo/redo stack bound to its target.
#[derive(Debug)]
pub struct History<T, A> {
    target: T,
    stack: Vec<A>,
    pos: usize,
    /// `None` once the saved state has been discarded from the stack.
    saved_pos: Option<usize>,
}

impl<T, A: Action<T>> History<T, A> {
    /// Bind a fresh, saved history to `target`.
    pub const fn new(target: T) -> Self {
        Self {
            target,
            stack: Vec::new(),
            pos: 0,
            saved_pos: Some(0),
        }
    }

    /// Record `action` as the newest applied action without running it.
    ///
    /// Any redoable actions are discarded. If the save point was among them
    /// it can never be reached again, and the history stays unsaved until the
    /// next [`History::mark_saved`].
    pub fn push(&mut self, action: A) {
        self.stack.truncate(self.pos);
        self.stack.push(action);
        if self.saved_pos.is_some_and(|saved| saved > self.pos) {
            self.saved_pos = None;
        }
        self.pos += 1;
        self.check();
        debug!(pos = self.pos, len = self.stack.len(), "action pushed");
    }

    /// Push `action` and apply it to the target.
    pub fn push_and_apply(&mut self, action: A) {
        self.push(action);
        if let Some(action) = self.stack.last_mut() {
            action.apply(&mut self.target);
        }
    }

    /// Reverse the most recently applied action. No-op at the bottom.
    pub fn undo(&mut self) {
        if self.pos == 0 {
            return;
        }
        self.stack[self.pos - 1].unapply(&mut self.target);
        self.pos -= 1;
        self.check();
        debug!(pos = self.pos, len = self.stack.len(), "undo");
    }

    /// Re-apply the next redoable action. No-op at the top.
    pub fn redo(&mut self) {
        if self.pos == self.stack.len() {
            return;
        }
        self.stack[self.pos].apply(&mut self.target);
        self.pos += 1;
        self.check();
        debug!(pos = self.pos, len = self.stack.len(), "redo");
    }

    /// Whether [`History::undo`] would do anything.
    #[must_use]
    pub const fn undoable(&self) -> bool {
        self.pos > 0
    }

    /// Whether [`History::redo`] would do anything.
    #[must_use]
    pub fn redoable(&self) -> bool {
        self.pos < self.stack.len()
    }

    /// Drop every action and treat the current target state as saved.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.pos = 0;
        self.saved_pos = Some(0);
    }

    /// Record the current position as the saved state.
    pub const fn mark_saved(&mut self) {
        self.saved_pos = Some(self.pos);
    }

    /// Whether the current position differs from the saved one.
    #[must_use]
    pub fn unsaved(&self) -> bool {
        self.saved_pos != Some(self.pos)
    }

    /// Number of applied actions.
    #[must_use]
    pub const fn pos(&self) -> usize {
        self.pos
    }

    /// Position recorded by the last save, if still reachable.
    #[must_use]
    pub const fn saved_pos(&self) -> Option<usize> {
        self.saved_pos
    }

    /// Number of actions on the stack, applied or redoable.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Whether the stack holds no actions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// The edited value.
    pub const fn target(&self) -> &T {
        &self.target
    }

    /// Mutable access for edits that are deliberately not undoable, such as
    /// reconciling with the filesystem.
    pub(crate) const fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    /// Give up the history and return the target.
    pub fn into_target(self) -> T {
        self.target
    }

    /// A position outside the stack means the engine itself is broken.
    fn check(&self) {
        assert!(
            self.pos <= self.stack.len(),
            "history position {} outside stack of {}",
            self.pos,
            self.stack.len()
        );
    }
}
