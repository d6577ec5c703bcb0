//! Line store backed by a rope.
//!
//! The engine sees a buffer as an ordered list of lines with no trailing
//! newline: the rope holds the lines joined by `\n`, so `rope.len_lines()` is
//! exactly the number of lines and the last line never ends with `\n`. An
//! "empty" buffer is one empty line.
//!
//! Columns are char offsets. Every mutation clamps its coordinates instead of
//! panicking; callers that need exact bounds check them first with
//! [`Buffer::line_len`].

use std::fmt;

use ropey::{Rope, RopeSlice};

use crate::position::{Position, Range};

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

/// Ordered lines of text.
#[derive(Clone, Default)]
pub struct Buffer {
    rope: Rope,
}

impl Buffer {
    // -- Construction -------------------------------------------------------

    /// One empty line.
    #[must_use]
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Load full file text: split on `\n`, dropping one trailing empty line
    /// so `"a\nb\n"` is two lines, not three.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let body = text.strip_suffix('\n').unwrap_or(text);
        Self {
            rope: Rope::from_str(body),
        }
    }

    /// Build from explicit lines. No lines at all is treated as one empty line.
    #[must_use]
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let joined = lines
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            rope: Rope::from_str(&joined),
        }
    }

    // -- Rope access ---------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Swap the whole text for a snapshot (undo/redo restore).
    pub fn set_rope(&mut self, rope: Rope) {
        self.rope = rope;
    }

    // -- Line queries --------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    #[inline]
    #[must_use]
    pub fn last_line(&self) -> usize {
        self.line_count().saturating_sub(1)
    }

    #[inline]
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Line content without its terminating newline.
    #[must_use]
    pub fn line(&self, line: usize) -> Option<RopeSlice<'_>> {
        if line >= self.line_count() {
            return None;
        }
        let slice = self.rope.line(line);
        let len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            Some(slice.slice(..len - 1))
        } else {
            Some(slice)
        }
    }

    /// Line content as an owned string (empty for out-of-range lines).
    #[must_use]
    pub fn line_text(&self, line: usize) -> String {
        self.line(line).map(|l| l.to_string()).unwrap_or_default()
    }

    /// All lines, for snapshots and tests.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        (0..self.line_count()).map(|l| self.line_text(l)).collect()
    }

    /// Content length of a line in chars (0 for out-of-range lines).
    #[must_use]
    pub fn line_len(&self, line: usize) -> usize {
        self.line(line).map_or(0, |l| l.len_chars())
    }

    /// Highest Normal-mode column on a line: `len - 1`, or 0 when empty.
    #[inline]
    #[must_use]
    pub fn last_col(&self, line: usize) -> usize {
        self.line_len(line).saturating_sub(1)
    }

    #[inline]
    #[must_use]
    pub fn is_empty_line(&self, line: usize) -> bool {
        self.line_len(line) == 0
    }

    /// Char at a position inside a line's content (`None` at or past `len`).
    #[must_use]
    pub fn char_at(&self, pos: Position) -> Option<char> {
        let line = self.line(pos.line)?;
        (pos.col < line.len_chars()).then(|| line.char(pos.col))
    }

    /// Column of the first non-blank char, or `None` if the line is all blank.
    #[must_use]
    pub fn first_non_blank(&self, line: usize) -> Option<usize> {
        self.line(line)?
            .chars()
            .position(|c| c != ' ' && c != '\t')
    }

    /// Column of the last non-blank char, or `None` if the line is all blank.
    #[must_use]
    pub fn last_non_blank(&self, line: usize) -> Option<usize> {
        let slice = self.line(line)?;
        let len = slice.len_chars();
        (0..len).rev().find(|&c| !matches!(slice.char(c), ' ' | '\t'))
    }

    /// Leading whitespace of a line.
    #[must_use]
    pub fn indent(&self, line: usize) -> String {
        self.line(line)
            .map(|l| l.chars().take_while(|c| *c == ' ' || *c == '\t').collect())
            .unwrap_or_default()
    }

    // -- Coordinate conversion ------------------------------------------------

    /// Absolute char index of a position; `col == len` is valid.
    #[must_use]
    pub fn pos_to_char_idx(&self, pos: Position) -> Option<usize> {
        if pos.line >= self.line_count() || pos.col > self.line_len(pos.line) {
            return None;
        }
        Some(self.rope.line_to_char(pos.line) + pos.col)
    }

    /// Inverse of [`pos_to_char_idx`](Self::pos_to_char_idx).
    #[must_use]
    pub fn char_idx_to_pos(&self, idx: usize) -> Position {
        let idx = idx.min(self.rope.len_chars());
        let line = self.rope.char_to_line(idx);
        Position::new(line, idx - self.rope.line_to_char(line))
    }

    /// Char index with the position clamped into the buffer first. A position
    /// at `(line_count, 0)` maps to the end of the text.
    fn clamped_idx(&self, pos: Position) -> usize {
        if pos.line >= self.line_count() {
            return self.rope.len_chars();
        }
        let col = pos.col.min(self.line_len(pos.line));
        self.rope.line_to_char(pos.line) + col
    }

    /// Clamp to an existing line and a column within `0..=len` (or
    /// `0..len` when `past_end` is false).
    #[must_use]
    pub fn clamp(&self, pos: Position, past_end: bool) -> Position {
        let line = pos.line.min(self.last_line());
        let max = if past_end {
            self.line_len(line)
        } else {
            self.last_col(line)
        };
        Position::new(line, pos.col.min(max))
    }

    // -- Slicing --------------------------------------------------------------

    /// Text of a half-open range, newlines included.
    #[must_use]
    pub fn slice_text(&self, range: Range) -> String {
        let start = self.clamped_idx(range.start);
        let end = self.clamped_idx(range.end).max(start);
        self.rope.slice(start..end).to_string()
    }

    // -- Editing --------------------------------------------------------------

    /// Insert `text` (which may contain newlines) at `pos`.
    pub fn insert(&mut self, pos: Position, text: &str) {
        let idx = self.clamped_idx(pos);
        self.rope.insert(idx, text);
    }

    /// Remove a half-open range and return what was removed.
    pub fn delete(&mut self, range: Range) -> String {
        let start = self.clamped_idx(range.start);
        let end = self.clamped_idx(range.end).max(start);
        let removed = self.rope.slice(start..end).to_string();
        self.rope.remove(start..end);
        removed
    }

    /// Replace a half-open range with `text`.
    pub fn replace(&mut self, range: Range, text: &str) {
        let start = self.clamped_idx(range.start);
        self.delete(range);
        self.rope.insert(start, text);
    }

    /// Overwrite a whole line's content.
    pub fn set_line(&mut self, line: usize, text: &str) {
        let len = self.line_len(line);
        self.replace(
            Range::ordered(Position::new(line, 0), Position::new(line, len)),
            text,
        );
    }

    /// Insert new lines so the first of them becomes line `at`
    /// (`at == line_count` appends).
    pub fn insert_lines<S: AsRef<str>>(&mut self, at: usize, lines: &[S]) {
        if lines.is_empty() {
            return;
        }
        let joined = lines
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("\n");
        if at >= self.line_count() {
            let end = self.rope.len_chars();
            self.rope.insert(end, &format!("\n{joined}"));
        } else {
            let idx = self.rope.line_to_char(at);
            self.rope.insert(idx, &format!("{joined}\n"));
        }
    }

    /// Remove lines `first..=last` and return their contents. Removing every
    /// line leaves a single empty line.
    pub fn remove_lines(&mut self, first: usize, last: usize) -> Vec<String> {
        let last = last.min(self.last_line());
        if first > last {
            return Vec::new();
        }
        let removed: Vec<String> = (first..=last).map(|l| self.line_text(l)).collect();
        let total = self.rope.len_chars();
        let (start, end) = if last + 1 < self.line_count() {
            (self.rope.line_to_char(first), self.rope.line_to_char(last + 1))
        } else if first > 0 {
            // Trailing block: also take the newline that ends the line above.
            (self.rope.line_to_char(first) - 1, total)
        } else {
            (0, total)
        };
        self.rope.remove(start..end);
        removed
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("lines", &self.line_count())
            .field("chars", &self.len_chars())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
