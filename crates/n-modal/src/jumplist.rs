//! Jump list, change list and marks.
//!
//! The **jump list** records the cursor before jump motions (`G`, `gg`, `/`,
//! `?`, `n`, `N`, `*`, `#`, `%`, `(`, `)`, `{`, `}`, `H`, `M`, `L`, `:N`,
//! mark jumps). `Ctrl-O` walks back, `Ctrl-I` / Tab forward.
//!
//! The **change list** records where changes happened. `g;` walks back,
//! `g,` forward.
//!
//! Both are append-only and bounded. Walking back from the newest entry
//! first appends the live cursor so walking forward can return to it.

use crate::error::{EngineError, EngineResult};
use crate::position::Position;

// ---------------------------------------------------------------------------
// PositionList
// ---------------------------------------------------------------------------

/// How a list collapses entries on the same line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dedup {
    /// Any older entry on the new entry's line is dropped (jumps).
    AnyLine,
    /// Only the newest entry is compared (changes).
    LastLine,
}

/// Bounded position history with a navigation index.
#[derive(Debug, Clone)]
pub struct PositionList {
    entries: Vec<Position>,
    /// Equal to `entries.len()` while not navigating.
    current: usize,
    max: usize,
    dedup: Dedup,
}

impl PositionList {
    #[must_use]
    pub fn new(max: usize, dedup: Dedup) -> Self {
        Self {
            entries: Vec::new(),
            current: 0,
            max: max.max(1),
            dedup,
        }
    }

    /// Record a position and stop navigating.
    pub fn push(&mut self, pos: Position) {
        match self.dedup {
            Dedup::AnyLine => self.entries.retain(|e| e.line != pos.line),
            Dedup::LastLine => {
                if self.entries.last().is_some_and(|e| e.line == pos.line) {
                    self.entries.pop();
                }
            }
        }
        self.entries.push(pos);
        if self.entries.len() > self.max {
            self.entries.remove(0);
        }
        self.current = self.entries.len();
    }

    /// Walk `count` entries back. `live` is the cursor, saved on the first
    /// step away from the newest entry.
    pub fn back(&mut self, live: Position, count: usize) -> Option<Position> {
        if self.entries.is_empty() {
            return None;
        }
        if self.current >= self.entries.len() {
            let same_line = self.entries.last().is_some_and(|e| e.line == live.line);
            if !same_line {
                self.entries.push(live);
                if self.entries.len() > self.max + 1 {
                    self.entries.remove(0);
                }
                self.current = self.entries.len() - 1;
            } else if self.dedup == Dedup::AnyLine {
                // Already on the newest jump: skip it.
                self.current = self.entries.len() - 1;
            } else {
                self.current = self.entries.len();
            }
        }
        if self.current < count {
            return None;
        }
        self.current -= count;
        self.entries.get(self.current).copied()
    }

    /// Walk `count` entries forward.
    pub fn forward(&mut self, count: usize) -> Option<Position> {
        if self.current + count >= self.entries.len() {
            return None;
        }
        self.current += count;
        self.entries.get(self.current).copied()
    }

    #[must_use]
    pub fn newest(&self) -> Option<Position> {
        self.entries.last().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.current = 0;
    }
}

// ---------------------------------------------------------------------------
// Marks
// ---------------------------------------------------------------------------

/// `a`–`z` plus the special marks the engine maintains itself.
#[derive(Debug, Clone, Default)]
pub struct Marks {
    named: [Option<Position>; 26],
    /// `` ` `` / `'`: where the last jump started.
    context: Option<Position>,
    /// `.`: the last change.
    change: Option<Position>,
    /// `<` / `>`: the last visual selection.
    visual: Option<(Position, Position)>,
}

impl Marks {
    /// `m{a-z}`. Returns false for names `m` does not accept.
    pub fn set(&mut self, name: char, pos: Position) -> bool {
        match name {
            'a'..='z' => {
                self.named[usize::from(name as u8 - b'a')] = Some(pos);
                true
            }
            '`' | '\'' => {
                self.context = Some(pos);
                true
            }
            _ => false,
        }
    }

    pub const fn set_context(&mut self, pos: Position) {
        self.context = Some(pos);
    }

    pub const fn set_change(&mut self, pos: Position) {
        self.change = Some(pos);
    }

    pub const fn set_visual(&mut self, start: Position, end: Position) {
        self.visual = Some((start, end));
    }

    #[must_use]
    pub const fn visual(&self) -> Option<(Position, Position)> {
        self.visual
    }

    /// Look a mark up for `` ` `` / `'`.
    ///
    /// # Errors
    ///
    /// [`EngineError::MarkNotSet`] for unset or unknown marks.
    pub fn get(&self, name: char) -> EngineResult<Position> {
        let pos = match name {
            'a'..='z' => self.named[usize::from(name as u8 - b'a')],
            '`' | '\'' => self.context,
            '.' => self.change,
            '<' => self.visual.map(|(start, _)| start),
            '>' => self.visual.map(|(_, end)| end),
            _ => None,
        };
        pos.ok_or(EngineError::MarkNotSet)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
