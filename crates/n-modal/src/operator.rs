//! Operators and the extent they act on.
//!
//! ```text
//! [count] operator [count] motion      d3w, 2yj, c$
//! [count] operator text-object         ci", yap
//! [count] operator operator            dd, >>, gUU, g~g~
//! ```
//!
//! [`extent`] turns the cursor and a resolved motion into the text an
//! operator touches, applying Vim's exclusive and linewise adjustments:
//!
//! 1. The range is ordered start to end.
//! 2. An exclusive charwise range ending at column 0 of a later line ends at
//!    the previous line's end instead; if it also starts at or before the
//!    first non-blank, it becomes linewise (except for yank).
//! 3. Paragraph motions drop the line they land on (forward) or start on
//!    (backward), unless it is the non-blank last line.
//! 4. Inclusive motions take the char under the end position.

use crate::buffer::Buffer;
use crate::key::Key;
use crate::motion::MotionResult;
use crate::position::{Position, Range};
use crate::text_object::ObjectRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Delete,
    Change,
    Yank,
    ShiftRight,
    ShiftLeft,
    Lower,
    Upper,
    Toggle,
}

impl Operator {
    /// `d`, `c`, `y`, `>`, `<`.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'd' => Some(Self::Delete),
            'c' => Some(Self::Change),
            'y' => Some(Self::Yank),
            '>' => Some(Self::ShiftRight),
            '<' => Some(Self::ShiftLeft),
            _ => None,
        }
    }

    /// The key after `g`: `gu`, `gU`, `g~`.
    #[must_use]
    pub const fn from_g_char(c: char) -> Option<Self> {
        match c {
            'u' => Some(Self::Lower),
            'U' => Some(Self::Upper),
            '~' => Some(Self::Toggle),
            _ => None,
        }
    }

    /// The key that, repeated, makes this a whole-line operation
    /// (`dd`, `>>`, `guu`).
    #[must_use]
    pub const fn line_char(self) -> char {
        match self {
            Self::Delete => 'd',
            Self::Change => 'c',
            Self::Yank => 'y',
            Self::ShiftRight => '>',
            Self::ShiftLeft => '<',
            Self::Lower => 'u',
            Self::Upper => 'U',
            Self::Toggle => '~',
        }
    }

    #[must_use]
    pub const fn is_case(self) -> bool {
        matches!(self, Self::Lower | Self::Upper | Self::Toggle)
    }

    /// Keys that type this operator in Normal mode.
    #[must_use]
    pub fn keys(self) -> Vec<Key> {
        if self.is_case() {
            vec![Key::Char('g'), Key::Char(self.line_char())]
        } else {
            vec![Key::Char(self.line_char())]
        }
    }

    /// Convert the text of a case operator.
    #[must_use]
    pub fn convert_case(self, text: &str) -> String {
        match self {
            Self::Lower => text.to_lowercase(),
            Self::Upper => text.to_uppercase(),
            Self::Toggle => text.chars().map(toggle_char).collect(),
            _ => text.to_string(),
        }
    }
}

/// Swap one char's case; chars without a single-char counterpart stay.
#[must_use]
pub fn toggle_char(c: char) -> char {
    let swapped: Vec<char> = if c.is_uppercase() {
        c.to_lowercase().collect()
    } else if c.is_lowercase() {
        c.to_uppercase().collect()
    } else {
        return c;
    };
    match swapped.as_slice() {
        [one] => *one,
        _ => c,
    }
}

// ---------------------------------------------------------------------------
// Extents
// ---------------------------------------------------------------------------

/// What an operator acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extent {
    /// Half-open charwise range.
    Chars(Range),
    /// Whole lines `first..=last`.
    Lines { first: usize, last: usize },
    /// A paragraph motion that covered no whole line; `change` still enters
    /// Insert mode here.
    Empty(Position),
}

impl Extent {
    /// Extent of a resolved text object.
    #[must_use]
    pub const fn from_object(object: ObjectRange) -> Self {
        if object.linewise {
            Self::Lines {
                first: object.range.start.line,
                last: object.range.end.line,
            }
        } else {
            Self::Chars(object.range)
        }
    }

    /// First and last line touched.
    #[must_use]
    pub const fn line_span(self) -> (usize, usize) {
        match self {
            Self::Chars(range) => (range.start.line, range.end.line),
            Self::Lines { first, last } => (first, last),
            Self::Empty(pos) => (pos.line, pos.line),
        }
    }

    #[must_use]
    pub const fn start(self) -> Position {
        match self {
            Self::Chars(range) => range.start,
            Self::Lines { first, .. } => Position::new(first, 0),
            Self::Empty(pos) => pos,
        }
    }
}

/// True if `col` is at or before the first non-blank (an all-blank line
/// counts as before).
fn at_or_before_first_non_blank(buf: &Buffer, pos: Position) -> bool {
    buf.first_non_blank(pos.line).is_none_or(|fnb| pos.col <= fnb)
}

/// The extent `op` covers when applied from `from` with a resolved motion.
#[must_use]
pub fn extent(buf: &Buffer, op: Operator, from: Position, motion: &MotionResult) -> Extent {
    let to = motion.pos;
    let (start, end) = if from <= to { (from, to) } else { (to, from) };

    if motion.exclusive {
        return paragraph_extent(buf, from, to);
    }
    if motion.linewise {
        return Extent::Lines {
            first: start.line,
            last: end.line,
        };
    }
    if motion.inclusive {
        let end = end.with_col(end.col + 1).min(Position::new(end.line, buf.line_len(end.line)));
        return Extent::Chars(Range { start, end });
    }
    if end.col == 0 && end.line > start.line {
        let prev = end.line - 1;
        if op != Operator::Yank && at_or_before_first_non_blank(buf, start) {
            return Extent::Lines {
                first: start.line,
                last: prev,
            };
        }
        let end = Position::new(prev, buf.line_len(prev));
        return Extent::Chars(Range { start, end });
    }
    Extent::Chars(Range { start, end })
}

/// `{` and `}` under an operator.
fn paragraph_extent(buf: &Buffer, from: Position, to: Position) -> Extent {
    let last_line = buf.last_line();
    if to >= from {
        let edge = to.line == last_line && !buf.is_empty_line(to.line);
        let last = if edge {
            to.line
        } else if to.line > from.line {
            to.line - 1
        } else {
            return Extent::Empty(from);
        };
        if at_or_before_first_non_blank(buf, from) {
            Extent::Lines {
                first: from.line,
                last,
            }
        } else {
            Extent::Chars(Range {
                start: from,
                end: Position::new(last, buf.line_len(last)),
            })
        }
    } else if from.col == 0 {
        if from.line == to.line {
            return Extent::Empty(from);
        }
        Extent::Lines {
            first: to.line,
            last: from.line - 1,
        }
    } else {
        Extent::Chars(Range { start: to, end: from })
    }
}
