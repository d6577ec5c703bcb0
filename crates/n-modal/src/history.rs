//! Undo/redo history: whole-buffer snapshots.
//!
//! Before the first mutation of a user-visible command the dispatcher calls
//! [`History::begin`] with a snapshot of the buffer as it was. Later
//! mutations of the same command (the rest of an insert session, every
//! iteration of a macro) find the change already open and push nothing, so
//! the whole command undoes as one step. [`History::close`] ends it.
//!
//! ```text
//! undo stack: [loaded, before-1, before-2]   ← u pops before-2
//! redo stack: [after-2]                      ← Ctrl-R pops it back
//! ```
//!
//! The bottom entry is the loaded text and is never popped. Snapshots clone
//! the rope, which shares structure, so each costs O(1) plus the nodes a
//! later edit touches.

use ropey::Rope;
use tracing::trace;

use crate::position::Position;

/// Buffer state before a change.
#[derive(Debug, Clone)]
pub struct UndoEntry {
    pub rope: Rope,
    pub cursor: Position,
    pub scroll: usize,
}

/// Buffer state an undo left behind, for redo.
#[derive(Debug, Clone)]
pub struct RedoEntry {
    pub rope: Rope,
    pub scroll: usize,
    /// Cursor when `u` was pressed.
    pub cursor_undo: Position,
    /// Where redo puts the cursor: the start of the re-applied change.
    pub cursor_redo: Position,
}

#[derive(Debug)]
pub struct History {
    undo_stack: Vec<UndoEntry>,
    redo_stack: Vec<RedoEntry>,
    limit: usize,
    open: bool,
}

impl History {
    /// History whose bottom entry is `loaded`. `limit` bounds the number of
    /// undoable changes.
    #[must_use]
    pub fn new(loaded: UndoEntry, limit: usize) -> Self {
        Self {
            undo_stack: vec![loaded],
            redo_stack: Vec::new(),
            limit: limit.max(1),
            open: false,
        }
    }

    /// Open a change, pushing the snapshot `before` produces unless one is
    /// already open. Returns whether a snapshot was pushed.
    pub fn begin(&mut self, before: impl FnOnce() -> UndoEntry) -> bool {
        if self.open {
            return false;
        }
        self.open = true;
        self.undo_stack.push(before());
        self.redo_stack.clear();
        if self.undo_stack.len() > self.limit + 1 {
            self.undo_stack.remove(0);
            trace!(target: "engine.undo", limit = self.limit, "trimmed oldest change");
        }
        trace!(target: "engine.undo", depth = self.undoable(), "push");
        true
    }

    /// End the open change; the next mutation starts a new undo step.
    pub const fn close(&mut self) {
        self.open = false;
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Pop the newest change. `current` is the state being undone; it goes
    /// to the redo stack. `None` when only the bottom entry remains.
    pub fn undo(&mut self, current: UndoEntry) -> Option<UndoEntry> {
        self.open = false;
        if self.undo_stack.len() <= 1 {
            return None;
        }
        let entry = self.undo_stack.pop()?;
        self.redo_stack.push(RedoEntry {
            rope: current.rope,
            scroll: current.scroll,
            cursor_undo: current.cursor,
            cursor_redo: entry.cursor,
        });
        trace!(
            target: "engine.undo",
            depth = self.undoable(),
            redo = self.redo_stack.len(),
            "undo"
        );
        Some(entry)
    }

    /// Pop the newest undone change. `current` is the state being redone
    /// over; it is pushed back as an undo step.
    pub fn redo(&mut self, current: UndoEntry) -> Option<RedoEntry> {
        self.open = false;
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push(UndoEntry {
            rope: current.rope,
            cursor: entry.cursor_redo,
            scroll: current.scroll,
        });
        trace!(
            target: "engine.undo",
            depth = self.undoable(),
            redo = self.redo_stack.len(),
            from = ?entry.cursor_undo,
            "redo"
        );
        Some(entry)
    }

    /// Changes that `u` can still undo.
    #[must_use]
    pub fn undoable(&self) -> usize {
        self.undo_stack.len() - 1
    }

    #[must_use]
    pub fn redoable(&self) -> usize {
        self.redo_stack.len()
    }
}
