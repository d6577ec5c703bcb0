//! Motion resolver.
//!
//! [`resolve`] maps a [`Motion`] and a count to a destination plus the
//! classification an operator needs:
//!
//! | Field       | Meaning                                                   |
//! |-------------|-----------------------------------------------------------|
//! | `inclusive` | charwise range includes the destination char (`e`, `f`, `$`) |
//! | `linewise`  | range covers whole lines (`j`, `G`, `{`)                  |
//! | `exclusive` | exclusive-linewise paragraph motion: drop the far line    |
//! | `moved`     | the position actually changed                             |
//!
//! Failed motions return the original position with `moved = false`; the
//! dispatcher cancels a pending operator and aborts macro replay on that.

use crate::buffer::Buffer;
use crate::cursor::{self, Cursor, STICKY_EOL};
use crate::position::Position;
use crate::word;

// ---------------------------------------------------------------------------
// Find-char
// ---------------------------------------------------------------------------

/// `f` / `F` / `t` / `T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindKind {
    Forward,
    Backward,
    TillForward,
    TillBackward,
}

impl FindKind {
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'f' => Some(Self::Forward),
            'F' => Some(Self::Backward),
            't' => Some(Self::TillForward),
            'T' => Some(Self::TillBackward),
            _ => None,
        }
    }

    /// Direction flip for `,`.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
            Self::TillForward => Self::TillBackward,
            Self::TillBackward => Self::TillForward,
        }
    }

    const fn is_forward(self) -> bool {
        matches!(self, Self::Forward | Self::TillForward)
    }

    const fn is_till(self) -> bool {
        matches!(self, Self::TillForward | Self::TillBackward)
    }
}

// ---------------------------------------------------------------------------
// Motion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    /// Backspace: like `h` but wraps to the previous line.
    LeftWrap,
    /// Space: like `l` but wraps to the next line.
    RightWrap,
    Up,
    Down,
    LineStart,
    FirstNonBlank,
    LineEnd,
    LastNonBlank,
    Column,
    WordStart { big: bool },
    WordBack { big: bool },
    WordEnd { big: bool },
    WordEndBack { big: bool },
    ParagraphForward,
    ParagraphBackward,
    SentenceForward,
    SentenceBackward,
    /// `fx` and friends; `repeat` is set for `;` / `,`.
    Find { kind: FindKind, ch: char, repeat: bool },
    FirstLine,
    LastLine,
    NextLineStart,
    PrevLineStart,
    CurrentLineStart,
    ScreenTop,
    ScreenMiddle,
    ScreenBottom,
    MatchPair,
}

impl Motion {
    /// Single-key motions in Normal, Visual and operator-pending contexts.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        let motion = match c {
            'h' => Self::Left,
            'l' => Self::Right,
            'j' => Self::Down,
            'k' => Self::Up,
            ' ' => Self::RightWrap,
            '0' => Self::LineStart,
            '^' => Self::FirstNonBlank,
            '$' => Self::LineEnd,
            '|' => Self::Column,
            'w' => Self::WordStart { big: false },
            'W' => Self::WordStart { big: true },
            'b' => Self::WordBack { big: false },
            'B' => Self::WordBack { big: true },
            'e' => Self::WordEnd { big: false },
            'E' => Self::WordEnd { big: true },
            '}' => Self::ParagraphForward,
            '{' => Self::ParagraphBackward,
            ')' => Self::SentenceForward,
            '(' => Self::SentenceBackward,
            'G' => Self::LastLine,
            '+' => Self::NextLineStart,
            '-' => Self::PrevLineStart,
            '_' => Self::CurrentLineStart,
            'H' => Self::ScreenTop,
            'M' => Self::ScreenMiddle,
            'L' => Self::ScreenBottom,
            '%' => Self::MatchPair,
            _ => return None,
        };
        Some(motion)
    }

    /// Second key after `g`.
    #[must_use]
    pub const fn from_g_char(c: char) -> Option<Self> {
        match c {
            'g' => Some(Self::FirstLine),
            'e' => Some(Self::WordEndBack { big: false }),
            'E' => Some(Self::WordEndBack { big: true }),
            '_' => Some(Self::LastNonBlank),
            _ => None,
        }
    }

    /// Relative motions. Staying put means they failed, which stops a
    /// macro; absolute ones (`0`, `G`, `|`) may legitimately land in place.
    #[must_use]
    pub const fn fails_in_place(self) -> bool {
        !matches!(
            self,
            Self::LineStart
                | Self::LineEnd
                | Self::FirstNonBlank
                | Self::LastNonBlank
                | Self::Column
                | Self::FirstLine
                | Self::LastLine
                | Self::CurrentLineStart
                | Self::ScreenTop
                | Self::ScreenMiddle
                | Self::ScreenBottom
        )
    }

    /// Motions recorded in the jump list.
    #[must_use]
    pub const fn is_jump(self) -> bool {
        matches!(
            self,
            Self::FirstLine
                | Self::LastLine
                | Self::ParagraphForward
                | Self::ParagraphBackward
                | Self::SentenceForward
                | Self::SentenceBackward
                | Self::ScreenTop
                | Self::ScreenMiddle
                | Self::ScreenBottom
                | Self::MatchPair
        )
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// What the caller should do with the cursor's remembered column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vcol {
    Recompute,
    Keep,
    Set(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionResult {
    pub pos: Position,
    pub inclusive: bool,
    pub linewise: bool,
    pub exclusive: bool,
    pub moved: bool,
    pub vcol: Vcol,
}

impl MotionResult {
    const fn charwise(pos: Position, inclusive: bool, moved: bool) -> Self {
        Self {
            pos,
            inclusive,
            linewise: false,
            exclusive: false,
            moved,
            vcol: Vcol::Recompute,
        }
    }

    const fn linewise(pos: Position, moved: bool) -> Self {
        Self {
            pos,
            inclusive: false,
            linewise: true,
            exclusive: false,
            moved,
            vcol: Vcol::Recompute,
        }
    }

    const fn failed(pos: Position) -> Self {
        Self::charwise(pos, false, false)
    }
}

/// Where a motion is evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionContext {
    /// An operator is waiting for this motion.
    pub op_pending: bool,
    /// Visual mode: `$` may leave the cursor at `len`.
    pub visual: bool,
    /// The user typed a count (`G`, `gg`, `|`, `%` care).
    pub count_given: bool,
    pub viewport_top: usize,
    pub viewport_height: usize,
}

/// Resolve `motion` from the cursor. `count` is at least 1.
#[must_use]
pub fn resolve(
    buf: &Buffer,
    cursor: &Cursor,
    motion: Motion,
    count: usize,
    ctx: MotionContext,
) -> MotionResult {
    let from = cursor.position();
    let count = count.max(1);
    match motion {
        Motion::Left => {
            let col = from.col.saturating_sub(count);
            MotionResult::charwise(from.with_col(col), false, col != from.col)
        }
        Motion::Right => {
            let max = if ctx.op_pending {
                buf.line_len(from.line)
            } else {
                buf.last_col(from.line)
            };
            let col = (from.col + count).min(max);
            MotionResult::charwise(from.with_col(col), false, col != from.col)
        }
        Motion::LeftWrap => {
            let mut pos = from;
            for _ in 0..count {
                pos = match (pos.col, pos.line) {
                    (0, 0) => break,
                    (0, line) => Position::new(line - 1, buf.line_len(line - 1)),
                    (col, line) => Position::new(line, col - 1),
                };
            }
            let pos = buf.clamp(pos, ctx.op_pending);
            MotionResult::charwise(pos, false, pos != from)
        }
        Motion::RightWrap => {
            let mut pos = from;
            for _ in 0..count {
                let len = buf.line_len(pos.line);
                if pos.col + 1 < len {
                    pos.col += 1;
                } else if pos.line < buf.last_line() {
                    pos = Position::new(pos.line + 1, 0);
                } else {
                    if ctx.op_pending {
                        pos.col = len;
                    }
                    break;
                }
            }
            MotionResult::charwise(pos, false, pos != from)
        }
        Motion::Up | Motion::Down => vertical(buf, cursor, motion == Motion::Down, count, ctx),
        Motion::LineStart => MotionResult::charwise(from.with_col(0), false, from.col != 0),
        Motion::FirstNonBlank => {
            let pos = from.with_col(first_non_blank_or_last(buf, from.line));
            MotionResult::charwise(pos, false, pos != from)
        }
        Motion::LineEnd => {
            let line = from.line + count - 1;
            if line > buf.last_line() {
                return MotionResult::failed(from);
            }
            let col = if ctx.visual {
                buf.line_len(line)
            } else {
                buf.last_col(line)
            };
            let pos = Position::new(line, col);
            MotionResult {
                vcol: Vcol::Set(STICKY_EOL),
                ..MotionResult::charwise(pos, true, pos != from)
            }
        }
        Motion::LastNonBlank => {
            let line = (from.line + count - 1).min(buf.last_line());
            let col = buf
                .last_non_blank(line)
                .unwrap_or_else(|| buf.last_col(line));
            let pos = Position::new(line, col);
            MotionResult::charwise(pos, true, pos != from)
        }
        Motion::Column => {
            let want = count - 1;
            let col = cursor::col_for_vcol(buf, from.line, want, false);
            MotionResult {
                vcol: Vcol::Set(want),
                ..MotionResult::charwise(from.with_col(col), false, col != from.col)
            }
        }
        Motion::WordStart { big } => {
            let pos = if ctx.op_pending {
                word_forward_for_operator(buf, from, count, big)
            } else {
                word_forward(buf, from, count, big)
            };
            MotionResult::charwise(pos, false, pos != from)
        }
        Motion::WordBack { big } => {
            let pos = repeat(from, count, |p| word::prev_start(buf, p, big));
            MotionResult::charwise(pos, false, pos != from)
        }
        Motion::WordEnd { big } => {
            let pos = repeat(from, count, |p| word::next_end(buf, p, big));
            MotionResult::charwise(pos, true, pos != from)
        }
        Motion::WordEndBack { big } => {
            let pos = repeat(from, count, |p| word::prev_end(buf, p, big));
            MotionResult::charwise(pos, true, pos != from)
        }
        Motion::ParagraphForward => paragraph_forward(buf, from, count),
        Motion::ParagraphBackward => paragraph_backward(buf, from, count),
        Motion::SentenceForward => {
            let pos = repeat(from, count, |p| sentence_forward(buf, p));
            MotionResult::charwise(pos, false, pos != from)
        }
        Motion::SentenceBackward => {
            let pos = repeat(from, count, |p| sentence_backward(buf, p));
            MotionResult::charwise(pos, false, pos != from)
        }
        Motion::Find { kind, ch, repeat } => find_char(buf, from, kind, ch, count, repeat),
        Motion::FirstLine => {
            let line = if ctx.count_given { count - 1 } else { 0 };
            to_line(buf, from, line)
        }
        Motion::LastLine => {
            let line = if ctx.count_given {
                count - 1
            } else {
                buf.last_line()
            };
            to_line(buf, from, line)
        }
        Motion::NextLineStart => {
            if from.line >= buf.last_line() {
                return MotionResult::failed(from);
            }
            to_line(buf, from, from.line + count)
        }
        Motion::PrevLineStart => {
            if from.line == 0 {
                return MotionResult::failed(from);
            }
            to_line(buf, from, from.line.saturating_sub(count))
        }
        Motion::CurrentLineStart => to_line(buf, from, from.line + count - 1),
        Motion::ScreenTop | Motion::ScreenMiddle | Motion::ScreenBottom => {
            screen_line(buf, from, motion, count, ctx)
        }
        Motion::MatchPair => {
            if ctx.count_given {
                // `N%` goes to N percent of the file.
                let line = (count * buf.line_count()).div_ceil(100);
                return to_line(buf, from, line.saturating_sub(1));
            }
            match match_pair(buf, from) {
                Some(pos) => MotionResult::charwise(pos, true, pos != from),
                None => MotionResult::failed(from),
            }
        }
    }
}

/// Apply a step function up to `count` times, stopping when it runs out.
fn repeat(
    from: Position,
    count: usize,
    mut step: impl FnMut(Position) -> Option<Position>,
) -> Position {
    let mut pos = from;
    for _ in 0..count {
        match step(pos) {
            Some(next) => pos = next,
            None => break,
        }
    }
    pos
}

fn first_non_blank_or_last(buf: &Buffer, line: usize) -> usize {
    buf.first_non_blank(line)
        .unwrap_or_else(|| buf.last_col(line))
}

fn to_line(buf: &Buffer, from: Position, line: usize) -> MotionResult {
    let line = line.min(buf.last_line());
    let pos = Position::new(line, first_non_blank_or_last(buf, line));
    MotionResult::linewise(pos, pos != from)
}

fn vertical(
    buf: &Buffer,
    cursor: &Cursor,
    down: bool,
    count: usize,
    ctx: MotionContext,
) -> MotionResult {
    let from = cursor.position();
    let line = if down {
        if from.line >= buf.last_line() {
            return MotionResult::failed(from);
        }
        (from.line + count).min(buf.last_line())
    } else {
        if from.line == 0 {
            return MotionResult::failed(from);
        }
        from.line.saturating_sub(count)
    };
    let past_end = ctx.visual && cursor.sticks_to_eol();
    let col = cursor::col_for_vcol(buf, line, cursor.want_vcol(), past_end);
    MotionResult {
        vcol: Vcol::Keep,
        ..MotionResult::linewise(Position::new(line, col), true)
    }
}

fn screen_line(
    buf: &Buffer,
    from: Position,
    motion: Motion,
    count: usize,
    ctx: MotionContext,
) -> MotionResult {
    let top = ctx.viewport_top.min(buf.last_line());
    let height = ctx.viewport_height.max(1);
    let bottom = (top + height - 1).min(buf.last_line());
    let line = match motion {
        Motion::ScreenTop => (top + count - 1).min(bottom),
        Motion::ScreenBottom => bottom.saturating_sub(count - 1).max(top),
        _ => top + (bottom - top) / 2,
    };
    to_line(buf, from, line)
}

// ---------------------------------------------------------------------------
// Words
// ---------------------------------------------------------------------------

/// `w` in Normal/Visual: with no next word, stop on the last char.
fn word_forward(buf: &Buffer, from: Position, count: usize, big: bool) -> Position {
    let mut pos = from;
    for _ in 0..count {
        match word::next_start(buf, pos, big) {
            Some(next) => pos = next,
            None => {
                let last = buf.last_line();
                return Position::new(last, buf.last_col(last));
            }
        }
    }
    pos
}

/// `w` under an operator. The final step stops at the end of the line it
/// started on, so `dw` on a line's last word never eats the line break.
fn word_forward_for_operator(buf: &Buffer, from: Position, count: usize, big: bool) -> Position {
    let mut pos = from;
    for _ in 1..count {
        match word::next_start(buf, pos, big) {
            Some(next) => pos = next,
            None => {
                let last = buf.last_line();
                return Position::new(last, buf.line_len(last));
            }
        }
    }

    let len = buf.line_len(pos.line);
    if len == 0 {
        // An empty line is a word; the step crosses its line break.
        return if pos.line < buf.last_line() {
            Position::new(pos.line + 1, 0)
        } else {
            pos
        };
    }

    let class_at = |col: usize| buf.char_at(pos.with_col(col)).map(|c| word::classify(c, big));
    let mut col = pos.col;
    if let Some(start) = class_at(col).filter(|c| c.is_text()) {
        while col < len && class_at(col) == Some(start) {
            col += 1;
        }
    }
    while col < len && class_at(col).is_some_and(|c| !c.is_text()) {
        col += 1;
    }
    pos.with_col(col)
}

/// `cw` on a non-blank: like `ce`, but a cursor already on a word end
/// changes just that word.
#[must_use]
pub fn change_word_end(buf: &Buffer, from: Position, count: usize, big: bool) -> Position {
    let mut steps = count.max(1);
    if word::at_end(buf, from, big) {
        steps -= 1;
    }
    repeat(from, steps, |p| word::next_end(buf, p, big))
}

// ---------------------------------------------------------------------------
// Paragraphs
// ---------------------------------------------------------------------------

/// Line of the `count`-th empty line in `forward` direction that follows
/// text, or the buffer edge.
pub(crate) fn paragraph_line(buf: &Buffer, from: usize, count: usize, forward: bool) -> usize {
    let last = buf.last_line();
    let mut line = from;
    for _ in 0..count {
        let mut seen_text = false;
        let mut first = true;
        loop {
            let empty = buf.is_empty_line(line);
            if !empty {
                seen_text = true;
            }
            if !first && seen_text && empty {
                break;
            }
            first = false;
            if forward && line < last {
                line += 1;
            } else if !forward && line > 0 {
                line -= 1;
            } else {
                return line;
            }
        }
    }
    line
}

fn paragraph_forward(buf: &Buffer, from: Position, count: usize) -> MotionResult {
    let line = paragraph_line(buf, from.line, count, true);
    let col = if buf.is_empty_line(line) {
        0
    } else {
        buf.last_col(line)
    };
    let pos = Position::new(line, col);
    MotionResult {
        exclusive: true,
        ..MotionResult::linewise(pos, pos != from)
    }
}

fn paragraph_backward(buf: &Buffer, from: Position, count: usize) -> MotionResult {
    let pos = Position::new(paragraph_line(buf, from.line, count, false), 0);
    MotionResult {
        exclusive: true,
        ..MotionResult::linewise(pos, pos != from)
    }
}

// ---------------------------------------------------------------------------
// Sentences
// ---------------------------------------------------------------------------

const SENTENCE_END: &[char] = &['.', '!', '?'];
const SENTENCE_CLOSER: &[char] = &[')', ']', '"', '\''];

fn is_space(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\n'
}

/// True when a sentence (or a paragraph break) starts at char index `idx`.
pub(crate) fn is_sentence_start(buf: &Buffer, idx: usize) -> bool {
    let rope = buf.rope();
    if idx >= rope.len_chars() {
        return false;
    }
    let pos = buf.char_idx_to_pos(idx);
    if buf.is_empty_line(pos.line) {
        // First empty line of a run.
        return pos.line > 0 && !buf.is_empty_line(pos.line - 1);
    }
    if is_space(rope.char(idx)) {
        return false;
    }
    if idx == 0 {
        return true;
    }

    let mut j = idx;
    let mut saw_space = false;
    while j > 0 && is_space(rope.char(j - 1)) {
        j -= 1;
        saw_space = true;
        let p = buf.char_idx_to_pos(j);
        if p.col == 0 && buf.is_empty_line(p.line) {
            return true;
        }
    }
    if j == 0 {
        return true;
    }
    if !saw_space {
        return false;
    }
    while j > 0 && SENTENCE_CLOSER.contains(&rope.char(j - 1)) {
        j -= 1;
    }
    j > 0 && SENTENCE_END.contains(&rope.char(j - 1))
}

fn sentence_forward(buf: &Buffer, from: Position) -> Option<Position> {
    let total = buf.len_chars();
    let start = buf.pos_to_char_idx(from)?;
    if let Some(idx) = (start + 1..total).find(|&i| is_sentence_start(buf, i)) {
        return Some(buf.char_idx_to_pos(idx));
    }
    let last = buf.last_line();
    let end = Position::new(last, buf.last_col(last));
    (end > from).then_some(end)
}

fn sentence_backward(buf: &Buffer, from: Position) -> Option<Position> {
    let start = buf.pos_to_char_idx(from)?;
    if let Some(idx) = (0..start).rev().find(|&i| is_sentence_start(buf, i)) {
        return Some(buf.char_idx_to_pos(idx));
    }
    (from != Position::ZERO).then_some(Position::ZERO)
}

// ---------------------------------------------------------------------------
// Find-char
// ---------------------------------------------------------------------------

fn find_char(
    buf: &Buffer,
    from: Position,
    kind: FindKind,
    ch: char,
    count: usize,
    repeat: bool,
) -> MotionResult {
    let Some(line) = buf.line(from.line) else {
        return MotionResult::failed(from);
    };
    // A repeated `t`/`T` must not get stuck on the adjacent match.
    let skip = usize::from(repeat && kind.is_till() && count == 1);

    let found = if kind.is_forward() {
        let start = from.col + 1 + skip;
        (start..line.len_chars())
            .filter(|&c| line.char(c) == ch)
            .nth(count - 1)
    } else {
        let end = from.col.saturating_sub(skip);
        (0..end).rev().filter(|&c| line.char(c) == ch).nth(count - 1)
    };

    let Some(col) = found else {
        return MotionResult::failed(from);
    };
    let col = match kind {
        FindKind::Forward | FindKind::Backward => col,
        FindKind::TillForward => col - 1,
        FindKind::TillBackward => col + 1,
    };
    let pos = from.with_col(col);
    MotionResult::charwise(pos, kind.is_forward(), pos != from)
}

// ---------------------------------------------------------------------------
// Bracket matching
// ---------------------------------------------------------------------------

const PAIRS: &[(char, char)] = &[('(', ')'), ('[', ']'), ('{', '}')];

/// `%`: the bracket under or after the cursor on this line, then its mate.
#[must_use]
pub fn match_pair(buf: &Buffer, from: Position) -> Option<Position> {
    let line = buf.line(from.line)?;
    let col = (from.col..line.len_chars()).find(|&c| {
        let ch = line.char(c);
        PAIRS.iter().any(|&(o, c)| ch == o || ch == c)
    })?;
    let ch = line.char(col);
    let rope = buf.rope();
    let start = buf.pos_to_char_idx(from.with_col(col))?;

    let mut depth = 0usize;
    if let Some(&(open, close)) = PAIRS.iter().find(|(o, _)| *o == ch) {
        for i in start..rope.len_chars() {
            let c = rope.char(i);
            if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    return Some(buf.char_idx_to_pos(i));
                }
            }
        }
    } else {
        let &(open, close) = PAIRS.iter().find(|(_, c)| *c == ch)?;
        for i in (0..=start).rev() {
            let c = rope.char(i);
            if c == close {
                depth += 1;
            } else if c == open {
                depth -= 1;
                if depth == 0 {
                    return Some(buf.char_idx_to_pos(i));
                }
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    fn at(buf: &Buffer, pos: Position) -> Cursor {
        let mut c = Cursor::new();
        c.set(pos, buf);
        c
    }

    fn go(lines: &[&str], from: Position, motion: Motion, count: usize) -> MotionResult {
        let buf = Buffer::from_lines(lines);
        resolve(&buf, &at(&buf, from), motion, count, MotionContext::default())
    }

    fn go_op(lines: &[&str], from: Position, motion: Motion, count: usize) -> MotionResult {
        let buf = Buffer::from_lines(lines);
        let ctx = MotionContext {
            op_pending: true,
            ..MotionContext::default()
        };
        resolve(&buf, &at(&buf, from), motion, count, ctx)
    }

    // -- Characters ----------------------------------------------------------

    #[test]
    fn h_and_l_stop_at_line_edges() {
        let r = go(&["abc"], p(0, 0), Motion::Left, 1);
        assert!(!r.moved);
        let r = go(&["abc"], p(0, 1), Motion::Right, 5);
        assert_eq!(r.pos, p(0, 2));
        let r = go(&["abc"], p(0, 2), Motion::Right, 1);
        assert!(!r.moved);
    }

    #[test]
    fn l_under_operator_reaches_past_end() {
        let r = go_op(&["abc"], p(0, 2), Motion::Right, 1);
        assert_eq!(r.pos, p(0, 3));
        assert!(r.moved);
    }

    #[test]
    fn space_and_backspace_wrap_lines() {
        let r = go(&["ab", "cd"], p(0, 1), Motion::RightWrap, 1);
        assert_eq!(r.pos, p(1, 0));
        let r = go(&["ab", "cd"], p(1, 0), Motion::LeftWrap, 1);
        assert_eq!(r.pos, p(0, 1));
    }

    // -- Lines ---------------------------------------------------------------

    #[test]
    fn line_motions() {
        let lines = ["  foo bar  "];
        assert_eq!(go(&lines, p(0, 5), Motion::LineStart, 1).pos, p(0, 0));
        assert_eq!(go(&lines, p(0, 5), Motion::FirstNonBlank, 1).pos, p(0, 2));
        let r = go(&lines, p(0, 5), Motion::LineEnd, 1);
        assert_eq!(r.pos, p(0, 10));
        assert!(r.inclusive);
        assert_eq!(r.vcol, Vcol::Set(STICKY_EOL));
        assert_eq!(go(&lines, p(0, 0), Motion::LastNonBlank, 1).pos, p(0, 8));
    }

    #[test]
    fn blank_line_non_blank_falls_back_to_last_column() {
        assert_eq!(go(&["    "], p(0, 0), Motion::FirstNonBlank, 1).pos, p(0, 3));
        assert_eq!(go(&["    "], p(0, 0), Motion::LastNonBlank, 1).pos, p(0, 3));
        assert_eq!(go(&[""], p(0, 0), Motion::FirstNonBlank, 1).pos, p(0, 0));
    }

    #[test]
    fn dollar_with_count_moves_down() {
        let r = go(&["ab", "cdef", "g"], p(0, 0), Motion::LineEnd, 2);
        assert_eq!(r.pos, p(1, 3));
        assert!(!go(&["ab"], p(0, 0), Motion::LineEnd, 2).moved);
    }

    #[test]
    fn dollar_in_visual_reaches_len() {
        let buf = Buffer::from_lines(&["abc"]);
        let ctx = MotionContext {
            visual: true,
            ..MotionContext::default()
        };
        let r = resolve(&buf, &at(&buf, p(0, 0)), Motion::LineEnd, 1, ctx);
        assert_eq!(r.pos, p(0, 3));
    }

    #[test]
    fn bar_goes_to_screen_column() {
        let r = go(&["\tabc"], p(0, 3), Motion::Column, 10);
        assert_eq!(r.pos, p(0, 2));
    }

    // -- Vertical ------------------------------------------------------------

    #[test]
    fn vertical_keeps_sticky_column() {
        let buf = Buffer::from_lines(&["hello world", "hi", "another line"]);
        let mut cur = at(&buf, p(0, 8));
        let r = resolve(&buf, &cur, Motion::Down, 1, MotionContext::default());
        assert_eq!(r.pos, p(1, 1));
        assert_eq!(r.vcol, Vcol::Keep);
        cur.set_keep_vcol(r.pos);
        let r = resolve(&buf, &cur, Motion::Down, 1, MotionContext::default());
        assert_eq!(r.pos, p(2, 8));
    }

    #[test]
    fn vertical_through_tabs_uses_screen_columns() {
        let buf = Buffer::from_lines(&["abcdefghij", "\tx"]);
        let cur = at(&buf, p(0, 9));
        let r = resolve(&buf, &cur, Motion::Down, 1, MotionContext::default());
        assert_eq!(r.pos, p(1, 1));
    }

    #[test]
    fn vertical_fails_at_edges_and_clamps_count() {
        assert!(!go(&["a", "b"], p(1, 0), Motion::Down, 1).moved);
        assert!(!go(&["a", "b"], p(0, 0), Motion::Up, 1).moved);
        let r = go(&["a", "b", "c"], p(0, 0), Motion::Down, 9);
        assert_eq!(r.pos, p(2, 0));
        assert!(r.linewise);
    }

    // -- Words ---------------------------------------------------------------

    #[test]
    fn w_with_count() {
        let r = go(&["a b c d"], p(0, 0), Motion::WordStart { big: false }, 3);
        assert_eq!(r.pos, p(0, 6));
        assert!(!r.inclusive);
    }

    #[test]
    fn w_on_last_word_goes_to_last_char() {
        let r = go(&["one two"], p(0, 4), Motion::WordStart { big: false }, 1);
        assert_eq!(r.pos, p(0, 6));
        let r = go(&["one two"], p(0, 6), Motion::WordStart { big: false }, 1);
        assert!(!r.moved);
    }

    #[test]
    fn w_under_operator_stops_at_line_end() {
        let r = go_op(&["foo bar", "baz"], p(0, 4), Motion::WordStart { big: false }, 1);
        assert_eq!(r.pos, p(0, 7));
        let r = go_op(&["foo  ", "baz"], p(0, 0), Motion::WordStart { big: false }, 1);
        assert_eq!(r.pos, p(0, 5));
        let r = go_op(&["foo bar"], p(0, 0), Motion::WordStart { big: false }, 1);
        assert_eq!(r.pos, p(0, 4));
    }

    #[test]
    fn w_under_operator_on_empty_line_crosses_it() {
        let r = go_op(&["", "x"], p(0, 0), Motion::WordStart { big: false }, 1);
        assert_eq!(r.pos, p(1, 0));
    }

    #[test]
    fn e_is_inclusive() {
        let r = go(&["foo bar"], p(0, 0), Motion::WordEnd { big: false }, 2);
        assert_eq!(r.pos, p(0, 6));
        assert!(r.inclusive);
    }

    #[test]
    fn change_word_end_stops_on_current_word() {
        let buf = Buffer::from_lines(&["foo bar"]);
        assert_eq!(change_word_end(&buf, p(0, 0), 1, false), p(0, 2));
        assert_eq!(change_word_end(&buf, p(0, 2), 1, false), p(0, 2));
        assert_eq!(change_word_end(&buf, p(0, 2), 2, false), p(0, 6));
    }

    // -- Paragraphs ----------------------------------------------------------

    #[test]
    fn paragraph_forward_lands_on_blank_line() {
        let lines = ["a", "b", "", "c", "", "d"];
        let r = go(&lines, p(0, 0), Motion::ParagraphForward, 1);
        assert_eq!(r.pos, p(2, 0));
        assert!(r.linewise && r.exclusive);
        assert_eq!(go(&lines, p(0, 0), Motion::ParagraphForward, 2).pos, p(4, 0));
        assert_eq!(go(&lines, p(4, 0), Motion::ParagraphForward, 1).pos, p(5, 0));
    }

    #[test]
    fn paragraph_forward_without_blank_goes_to_last_char() {
        let r = go(&["abc", "def"], p(0, 0), Motion::ParagraphForward, 1);
        assert_eq!(r.pos, p(1, 2));
        assert!(!go(&["abc", "def"], p(1, 2), Motion::ParagraphForward, 1).moved);
    }

    #[test]
    fn paragraph_backward() {
        let lines = ["a", "", "b", "c"];
        assert_eq!(go(&lines, p(3, 0), Motion::ParagraphBackward, 1).pos, p(1, 0));
        assert_eq!(go(&lines, p(2, 0), Motion::ParagraphBackward, 1).pos, p(1, 0));
        assert_eq!(go(&lines, p(1, 0), Motion::ParagraphBackward, 1).pos, p(0, 0));
        assert!(!go(&lines, p(0, 0), Motion::ParagraphBackward, 1).moved);
    }

    // -- Sentences -----------------------------------------------------------

    #[test]
    fn sentence_forward_and_back() {
        let lines = ["One two. Three four!  Five", "six."];
        let r = go(&lines, p(0, 0), Motion::SentenceForward, 1);
        assert_eq!(r.pos, p(0, 9));
        assert_eq!(go(&lines, p(0, 9), Motion::SentenceForward, 1).pos, p(0, 22));
        assert_eq!(go(&lines, p(0, 24), Motion::SentenceBackward, 1).pos, p(0, 22));
        assert_eq!(go(&lines, p(0, 22), Motion::SentenceBackward, 1).pos, p(0, 9));
    }

    #[test]
    fn sentence_stops_at_paragraph_break() {
        let lines = ["Alpha beta", "", "Gamma."];
        assert_eq!(go(&lines, p(0, 2), Motion::SentenceForward, 1).pos, p(1, 0));
        assert_eq!(go(&lines, p(1, 0), Motion::SentenceForward, 1).pos, p(2, 0));
    }

    #[test]
    fn sentence_motions_fail_at_buffer_edges() {
        let lines = ["Only one."];
        assert!(!go(&lines, p(0, 0), Motion::SentenceBackward, 1).moved);
        assert_eq!(go(&lines, p(0, 0), Motion::SentenceForward, 1).pos, p(0, 8));
        assert!(!go(&lines, p(0, 8), Motion::SentenceForward, 1).moved);
    }

    #[test]
    fn abbreviation_without_space_is_not_a_boundary() {
        let lines = ["e.g.x and more"];
        let r = go(&lines, p(0, 0), Motion::SentenceForward, 1);
        assert_eq!(r.pos, p(0, 13));
    }

    // -- Find ----------------------------------------------------------------

    fn find(kind: FindKind, ch: char, repeat: bool) -> Motion {
        Motion::Find { kind, ch, repeat }
    }

    #[test]
    fn find_forward_and_back() {
        let lines = ["a,b,c,d"];
        let r = go(&lines, p(0, 0), find(FindKind::Forward, ',', false), 2);
        assert_eq!(r.pos, p(0, 3));
        assert!(r.inclusive);
        let r = go(&lines, p(0, 6), find(FindKind::Backward, ',', false), 1);
        assert_eq!(r.pos, p(0, 5));
        assert!(!r.inclusive);
    }

    #[test]
    fn till_lands_beside_target() {
        let lines = ["a,b,c"];
        assert_eq!(go(&lines, p(0, 0), find(FindKind::TillForward, ',', false), 1).pos, p(0, 0));
        assert_eq!(go(&lines, p(0, 4), find(FindKind::TillBackward, ',', false), 1).pos, p(0, 4));
        assert_eq!(go(&lines, p(0, 2), find(FindKind::TillForward, ',', false), 1).pos, p(0, 2));
    }

    #[test]
    fn repeated_till_skips_adjacent_match() {
        let lines = ["a,b,c"];
        let r = go(&lines, p(0, 0), find(FindKind::TillForward, ',', true), 1);
        assert_eq!(r.pos, p(0, 2));
    }

    #[test]
    fn find_missing_char_fails() {
        let r = go(&["abc"], p(0, 0), find(FindKind::Forward, 'z', false), 1);
        assert!(!r.moved);
        assert_eq!(r.pos, p(0, 0));
    }

    // -- Jumps ---------------------------------------------------------------

    #[test]
    fn g_and_gg_land_on_first_non_blank() {
        let lines = ["a", "  b", "c"];
        let r = go(&lines, p(0, 0), Motion::LastLine, 1);
        assert_eq!(r.pos, p(2, 0));
        let buf = Buffer::from_lines(&lines);
        let ctx = MotionContext {
            count_given: true,
            ..MotionContext::default()
        };
        let r = resolve(&buf, &at(&buf, p(0, 0)), Motion::LastLine, 2, ctx);
        assert_eq!(r.pos, p(1, 2));
        let r = resolve(&buf, &at(&buf, p(2, 0)), Motion::FirstLine, 1, MotionContext::default());
        assert_eq!(r.pos, p(0, 0));
    }

    #[test]
    fn percent_matches_brackets_across_lines() {
        let lines = ["if (a) {", "  x[1];", "}"];
        assert_eq!(go(&lines, p(0, 0), Motion::MatchPair, 1).pos, p(0, 5));
        assert_eq!(go(&lines, p(0, 7), Motion::MatchPair, 1).pos, p(2, 0));
        assert_eq!(go(&lines, p(2, 0), Motion::MatchPair, 1).pos, p(0, 7));
        assert!(!go(&["plain"], p(0, 0), Motion::MatchPair, 1).moved);
    }

    #[test]
    fn screen_lines_use_viewport() {
        let lines: Vec<String> = (0..30).map(|i| format!("l{i}")).collect();
        let buf = Buffer::from_lines(&lines);
        let ctx = MotionContext {
            viewport_top: 5,
            viewport_height: 10,
            ..MotionContext::default()
        };
        let cur = at(&buf, p(7, 0));
        assert_eq!(resolve(&buf, &cur, Motion::ScreenTop, 1, ctx).pos, p(5, 0));
        assert_eq!(resolve(&buf, &cur, Motion::ScreenBottom, 1, ctx).pos, p(14, 0));
        assert_eq!(resolve(&buf, &cur, Motion::ScreenMiddle, 1, ctx).pos, p(9, 0));
    }
}
