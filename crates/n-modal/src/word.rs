//! Word and WORD scanning.
//!
//! | Function               | Vim key  | Lands on                           |
//! |------------------------|----------|------------------------------------|
//! | [`next_start`]         | `w` `W`  | first char of the next word        |
//! | [`prev_start`]         | `b` `B`  | first char of the previous word    |
//! | [`next_end`]           | `e` `E`  | last char of the current/next word |
//! | [`prev_end`]           | `ge` `gE`| last char of the previous word     |
//!
//! A **word** is a run of word chars (letters, digits, `_`) or a run of other
//! non-blank chars. A **WORD** is any run of non-blanks. An empty line counts
//! as a word of its own: `w`, `b` and `ge` stop on it, `e` skips it.
//!
//! Every function returns `None` when there is nothing further in that
//! direction; the motion layer turns that into `moved = false`.

use crate::buffer::Buffer;
use crate::position::Position;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharClass {
    Word,
    Punctuation,
    Blank,
    Newline,
}

impl CharClass {
    #[inline]
    pub(crate) const fn is_text(self) -> bool {
        matches!(self, Self::Word | Self::Punctuation)
    }
}

pub(crate) fn classify(ch: char, big: bool) -> CharClass {
    if ch == '\n' {
        CharClass::Newline
    } else if ch == ' ' || ch == '\t' || ch.is_whitespace() {
        CharClass::Blank
    } else if big || ch.is_alphanumeric() || ch == '_' {
        CharClass::Word
    } else {
        CharClass::Punctuation
    }
}

/// True for chars that make up a keyword (`*`, `#`, `iw`).
#[inline]
pub(crate) fn is_keyword_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Class at a char index, treating the end of the text as a newline.
pub(crate) fn class_at(buf: &Buffer, idx: usize, big: bool) -> CharClass {
    let rope = buf.rope();
    if idx >= rope.len_chars() {
        CharClass::Newline
    } else {
        classify(rope.char(idx), big)
    }
}

fn is_empty_line_start(buf: &Buffer, idx: usize) -> bool {
    let pos = buf.char_idx_to_pos(idx);
    pos.col == 0 && buf.is_empty_line(pos.line)
}

// ---------------------------------------------------------------------------
// Scanners
// ---------------------------------------------------------------------------

/// `w` / `W`: skip the current word, then blanks and newlines, stopping at
/// an empty line.
#[must_use]
pub fn next_start(buf: &Buffer, pos: Position, big: bool) -> Option<Position> {
    let rope = buf.rope();
    let total = rope.len_chars();
    let mut idx = buf.pos_to_char_idx(pos)?;
    if idx >= total {
        return None;
    }

    let start = class_at(buf, idx, big);
    if start.is_text() {
        while idx < total && class_at(buf, idx, big) == start {
            idx += 1;
        }
    }

    while idx < total {
        match class_at(buf, idx, big) {
            CharClass::Word | CharClass::Punctuation => break,
            CharClass::Blank => idx += 1,
            CharClass::Newline => {
                idx += 1;
                if is_empty_line_start(buf, idx) {
                    return Some(buf.char_idx_to_pos(idx));
                }
            }
        }
    }

    (idx < total).then(|| buf.char_idx_to_pos(idx))
}

/// `b` / `B`: step back over blanks and newlines (stopping at an empty line),
/// then to the start of that word.
#[must_use]
pub fn prev_start(buf: &Buffer, pos: Position, big: bool) -> Option<Position> {
    let mut idx = buf.pos_to_char_idx(pos)?;
    if idx == 0 {
        return None;
    }
    idx -= 1;

    loop {
        match class_at(buf, idx, big) {
            CharClass::Word | CharClass::Punctuation => break,
            CharClass::Newline if is_empty_line_start(buf, idx) => {
                return Some(buf.char_idx_to_pos(idx));
            }
            CharClass::Newline | CharClass::Blank => {
                if idx == 0 {
                    return Some(Position::ZERO);
                }
                idx -= 1;
            }
        }
    }

    let class = class_at(buf, idx, big);
    while idx > 0 && class_at(buf, idx - 1, big) == class {
        idx -= 1;
    }
    Some(buf.char_idx_to_pos(idx))
}

/// `e` / `E`: step forward once, skip blanks and newlines (empty lines
/// included), then to the last char of that word.
#[must_use]
pub fn next_end(buf: &Buffer, pos: Position, big: bool) -> Option<Position> {
    let total = buf.len_chars();
    let mut idx = buf.pos_to_char_idx(pos)? + 1;

    while idx < total && !class_at(buf, idx, big).is_text() {
        idx += 1;
    }
    if idx >= total {
        return None;
    }

    let class = class_at(buf, idx, big);
    while idx + 1 < total && class_at(buf, idx + 1, big) == class {
        idx += 1;
    }
    Some(buf.char_idx_to_pos(idx))
}

/// `ge` / `gE`: leave the current word backwards, skip blanks and newlines
/// (stopping at an empty line), land on the previous word's last char.
#[must_use]
pub fn prev_end(buf: &Buffer, pos: Position, big: bool) -> Option<Position> {
    let mut idx = buf.pos_to_char_idx(pos)?;

    let start = class_at(buf, idx, big);
    if start.is_text() {
        while idx > 0 && class_at(buf, idx - 1, big) == start {
            idx -= 1;
        }
    }

    loop {
        if idx == 0 {
            return None;
        }
        idx -= 1;
        match class_at(buf, idx, big) {
            CharClass::Word | CharClass::Punctuation => return Some(buf.char_idx_to_pos(idx)),
            CharClass::Newline if is_empty_line_start(buf, idx) => {
                return Some(buf.char_idx_to_pos(idx));
            }
            CharClass::Newline | CharClass::Blank => {}
        }
    }
}

/// True when `pos` is on the last char of a word (`cw` stops here).
#[must_use]
pub fn at_end(buf: &Buffer, pos: Position, big: bool) -> bool {
    let Some(idx) = buf.pos_to_char_idx(pos) else {
        return false;
    };
    let class = class_at(buf, idx, big);
    class.is_text() && class_at(buf, idx + 1, big) != class
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
