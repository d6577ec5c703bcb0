//! Cursor with a sticky virtual column and an optional visual anchor.
//!
//! # Virtual columns
//!
//! Vertical motions remember where the cursor *appears* on screen, not its
//! char index: a tab advances to the next multiple of [`TAB_WIDTH`] and wide
//! chars take their `unicode-width`. Moving through a short line and back
//! onto a long one restores the remembered column. After `$` the cursor
//! sticks to the end of every line ([`STICKY_EOL`]).

use unicode_width::UnicodeWidthChar;

use crate::buffer::Buffer;
use crate::position::{Position, Range};

/// Display width of a tab stop. Fixed; there is no `tabstop` option.
pub const TAB_WIDTH: usize = 8;

/// Desired column meaning "end of line" (set by `$`).
pub const STICKY_EOL: usize = usize::MAX;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pos: Position,
    want_vcol: usize,
    anchor: Option<Position>,
}

impl Cursor {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pos: Position::ZERO,
            want_vcol: 0,
            anchor: None,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    #[must_use]
    pub const fn line(&self) -> usize {
        self.pos.line
    }

    #[inline]
    #[must_use]
    pub const fn col(&self) -> usize {
        self.pos.col
    }

    /// The remembered virtual column for `j`/`k`.
    #[inline]
    #[must_use]
    pub const fn want_vcol(&self) -> usize {
        self.want_vcol
    }

    #[inline]
    #[must_use]
    pub const fn sticks_to_eol(&self) -> bool {
        self.want_vcol == STICKY_EOL
    }

    #[inline]
    #[must_use]
    pub const fn anchor(&self) -> Option<Position> {
        self.anchor
    }

    /// Anchor-to-cursor span, ordered.
    #[must_use]
    pub fn selection(&self) -> Option<Range> {
        self.anchor.map(|a| Range::ordered(a, self.pos))
    }

    // -- Movement -----------------------------------------------------------

    /// Move and remember the new virtual column.
    pub fn set(&mut self, pos: Position, buf: &Buffer) {
        self.pos = pos;
        self.want_vcol = virtual_col(buf, pos);
    }

    /// Move without touching the remembered column (vertical motions).
    pub const fn set_keep_vcol(&mut self, pos: Position) {
        self.pos = pos;
    }

    pub const fn set_want_vcol(&mut self, vcol: usize) {
        self.want_vcol = vcol;
    }

    /// Recompute the remembered column from the current position.
    pub fn refresh_vcol(&mut self, buf: &Buffer) {
        self.want_vcol = virtual_col(buf, self.pos);
    }

    /// Pull the position back into the buffer.
    pub fn clamp(&mut self, buf: &Buffer, past_end: bool) {
        self.pos = buf.clamp(self.pos, past_end);
    }

    // -- Anchor -------------------------------------------------------------

    pub const fn set_anchor(&mut self, pos: Position) {
        self.anchor = Some(pos);
    }

    pub const fn clear_anchor(&mut self) {
        self.anchor = None;
    }

    /// Visual `o`: jump to the other end of the selection.
    pub fn swap_anchor(&mut self, buf: &Buffer) {
        if let Some(anchor) = self.anchor {
            self.anchor = Some(self.pos);
            self.set(anchor, buf);
        }
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Virtual column math
// ---------------------------------------------------------------------------

fn char_width(ch: char, vcol: usize) -> usize {
    if ch == '\t' {
        TAB_WIDTH - vcol % TAB_WIDTH
    } else {
        ch.width().unwrap_or(1)
    }
}

/// Screen width of `text` drawn from column 0.
#[must_use]
pub fn display_width(text: &str) -> usize {
    text.chars().fold(0, |vcol, ch| vcol + char_width(ch, vcol))
}

/// Screen column of the char at `pos`. A tab reports its last cell, where
/// Vim draws the Normal-mode cursor.
#[must_use]
pub fn virtual_col(buf: &Buffer, pos: Position) -> usize {
    let Some(line) = buf.line(pos.line) else {
        return 0;
    };
    let mut vcol = 0;
    for (col, ch) in line.chars().enumerate() {
        let width = char_width(ch, vcol);
        if col == pos.col {
            return if ch == '\t' { vcol + width - 1 } else { vcol };
        }
        vcol += width;
    }
    vcol
}

/// The column whose screen cells cover `vcol` (the last column if the line
/// is too short, or `len` when `past_end` allows it).
#[must_use]
pub fn col_for_vcol(buf: &Buffer, line: usize, want: usize, past_end: bool) -> usize {
    let len = buf.line_len(line);
    let fallback = if past_end { len } else { len.saturating_sub(1) };
    if want == STICKY_EOL {
        return fallback;
    }
    let Some(slice) = buf.line(line) else {
        return 0;
    };
    let mut vcol = 0;
    for (col, ch) in slice.chars().enumerate() {
        vcol += char_width(ch, vcol);
        if want < vcol {
            return col;
        }
    }
    fallback
}
