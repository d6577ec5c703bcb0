//! Text objects: selection by structure rather than by motion.
//!
//! ```text
//! operator + text-object = action
//! d        + iw          = delete inner word
//! c        + i"          = change inside quotes
//! y        + 2a(         = yank around the second enclosing parens
//! ```
//!
//! | Inner    | Around   | Object                                  |
//! |----------|----------|-----------------------------------------|
//! | `iw`     | `aw`     | word (letters, digits, `_`)             |
//! | `iW`     | `aW`     | WORD (non-blank chars)                  |
//! | `is`     | `as`     | sentence                                |
//! | `ip`     | `ap`     | paragraph (linewise)                    |
//! | `i"`     | `a"`     | double-quoted string (also `'` and `` ` ``) |
//! | `i(`     | `a(`     | parens (also `)` and `b`)               |
//! | `i[`     | `a[`     | square brackets                         |
//! | `i{`     | `a{`     | braces (also `}` and `B`)               |
//! | `i<`     | `a<`     | angle brackets                          |
//!
//! [`resolve`] returns `None` when the object does not exist at the cursor;
//! the dispatcher then cancels the pending operator.

use crate::buffer::Buffer;
use crate::motion;
use crate::position::{Position, Range};
use crate::word::{self, CharClass};

/// Which structure to select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Word { big: bool },
    Sentence,
    Paragraph,
    Quote(char),
    Bracket { open: char, close: char },
}

impl ObjectKind {
    /// The key after `i` / `a`.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        let kind = match c {
            'w' => Self::Word { big: false },
            'W' => Self::Word { big: true },
            's' => Self::Sentence,
            'p' => Self::Paragraph,
            '"' | '\'' | '`' => Self::Quote(c),
            '(' | ')' | 'b' => Self::Bracket { open: '(', close: ')' },
            '[' | ']' => Self::Bracket { open: '[', close: ']' },
            '{' | '}' | 'B' => Self::Bracket { open: '{', close: '}' },
            '<' | '>' => Self::Bracket { open: '<', close: '>' },
            _ => return None,
        };
        Some(kind)
    }
}

/// A resolved object. Charwise ranges are half-open; linewise ranges cover
/// `range.start.line..=range.end.line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectRange {
    pub range: Range,
    pub linewise: bool,
}

impl ObjectRange {
    const fn charwise(start: Position, end: Position) -> Self {
        Self {
            range: Range { start, end },
            linewise: false,
        }
    }

    fn lines(buf: &Buffer, first: usize, last: usize) -> Self {
        Self {
            range: Range {
                start: Position::new(first, 0),
                end: Position::new(last, buf.line_len(last)),
            },
            linewise: true,
        }
    }
}

/// Resolve `kind` around `pos`. `inner` selects `i` over `a`.
#[must_use]
pub fn resolve(
    buf: &Buffer,
    pos: Position,
    kind: ObjectKind,
    inner: bool,
    count: usize,
) -> Option<ObjectRange> {
    let count = count.max(1);
    match kind {
        ObjectKind::Word { big } => word_object(buf, pos, big, inner, count),
        ObjectKind::Sentence => sentence_object(buf, pos, inner, count),
        ObjectKind::Paragraph => Some(paragraph_object(buf, pos.line, inner, count)),
        ObjectKind::Quote(quote) => quote_object(buf, pos, quote, inner),
        ObjectKind::Bracket { open, close } => bracket_object(buf, pos, open, close, inner, count),
    }
}

/// Char index to position, mapping the end of the text to the last line's `len`.
fn idx_to_pos(buf: &Buffer, idx: usize) -> Position {
    buf.char_idx_to_pos(idx.min(buf.len_chars()))
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

// ---------------------------------------------------------------------------
// Words
// ---------------------------------------------------------------------------

fn word_object(
    buf: &Buffer,
    pos: Position,
    big: bool,
    inner: bool,
    count: usize,
) -> Option<ObjectRange> {
    if buf.is_empty_line(pos.line) {
        return None;
    }
    let total = buf.len_chars();
    let idx = buf.pos_to_char_idx(pos)?;
    let class = |i: usize| word::class_at(buf, i, big);
    let run_end = |from: usize| {
        let c = class(from);
        let mut end = from;
        while end < total && class(end) == c {
            end += 1;
        }
        end
    };
    // Crossing to a later line skips the line break and the next indent.
    let next_item = |from: usize| {
        let mut i = from;
        if class(i) == CharClass::Newline && i < total {
            i += 1;
            while i < total && class(i) == CharClass::Blank {
                i += 1;
            }
        }
        i
    };

    let start_class = class(idx);
    let mut start = idx;
    while start > 0 && class(start - 1) == start_class {
        start -= 1;
    }
    let mut end = run_end(idx);

    if inner {
        for _ in 1..count {
            let next = next_item(end);
            if next >= total {
                break;
            }
            end = run_end(next);
        }
        return Some(ObjectRange::charwise(idx_to_pos(buf, start), idx_to_pos(buf, end)));
    }

    let mut took_trailing = false;
    if start_class == CharClass::Blank {
        // Blank run plus the word after it, `count` times.
        for i in 0..count {
            if i > 0 {
                end = next_item(end);
                if class(end) == CharClass::Blank {
                    end = run_end(end);
                }
            }
            if end < total && class(end).is_text() {
                end = run_end(end);
            }
        }
    } else {
        // Word plus the blanks after it, `count` times.
        for i in 0..count {
            if i > 0 {
                let next = next_item(end);
                if next >= total {
                    break;
                }
                end = run_end(next);
            }
            if end < total && class(end) == CharClass::Blank {
                end = run_end(end);
                took_trailing = true;
            } else {
                took_trailing = false;
            }
        }
        if !took_trailing {
            // No trailing blanks: take the leading ones instead, but never
            // the line's indent.
            let mut back = start;
            while back > 0 && class(back - 1) == CharClass::Blank {
                back -= 1;
            }
            if back < start && idx_to_pos(buf, back).col > 0 {
                start = back;
            }
        }
    }
    Some(ObjectRange::charwise(idx_to_pos(buf, start), idx_to_pos(buf, end)))
}

// ---------------------------------------------------------------------------
// Sentences
// ---------------------------------------------------------------------------

fn sentence_object(buf: &Buffer, pos: Position, inner: bool, count: usize) -> Option<ObjectRange> {
    if buf.is_empty_line(pos.line) {
        return None;
    }
    let rope = buf.rope();
    let total = rope.len_chars();
    let idx = buf.pos_to_char_idx(pos)?;
    let is_space = |i: usize| i < total && matches!(rope.char(i), ' ' | '\t' | '\n');
    let next_start = |from: usize| {
        (from + 1..total)
            .find(|&i| motion::is_sentence_start(buf, i))
            .unwrap_or(total)
    };
    // End of a sentence's text, before the whitespace leading to `end`.
    let trim = |start: usize, end: usize| {
        let mut e = end;
        while e > start + 1 && is_space(e - 1) {
            e -= 1;
        }
        e
    };

    // Whitespace between two sentences is an object of its own.
    if is_space(idx) {
        let mut ws_start = idx;
        while ws_start > 0 && is_space(ws_start - 1) {
            ws_start -= 1;
        }
        let mut ws_end = idx;
        while is_space(ws_end) {
            ws_end += 1;
        }
        if ws_end >= total || motion::is_sentence_start(buf, ws_end) {
            let end = if inner || ws_end >= total {
                ws_end
            } else {
                trim(ws_end, next_start(ws_end))
            };
            return Some(ObjectRange::charwise(idx_to_pos(buf, ws_start), idx_to_pos(buf, end)));
        }
    }

    let mut start = (0..=idx)
        .rev()
        .find(|&i| motion::is_sentence_start(buf, i))
        .unwrap_or(0);
    let mut full_end = start;
    for _ in 0..count {
        if full_end >= total {
            break;
        }
        full_end = next_start(full_end);
    }
    let text_end = trim(start, full_end);
    if inner {
        return Some(ObjectRange::charwise(idx_to_pos(buf, start), idx_to_pos(buf, text_end)));
    }

    let mut end = text_end;
    while end < total && is_blank(rope.char(end)) {
        end += 1;
    }
    if end == text_end {
        while start > 0 && is_blank(rope.char(start - 1)) && idx_to_pos(buf, start - 1).col > 0 {
            start -= 1;
        }
    }
    Some(ObjectRange::charwise(idx_to_pos(buf, start), idx_to_pos(buf, end)))
}

// ---------------------------------------------------------------------------
// Paragraphs
// ---------------------------------------------------------------------------

/// `ip` is the run of lines sharing the cursor line's blankness; `ap` adds
/// the following run of the other kind (the preceding blank lines when a
/// paragraph has none after it). A count extends by further runs.
fn paragraph_object(buf: &Buffer, line: usize, inner: bool, count: usize) -> ObjectRange {
    let last = buf.last_line();
    let blank = |l: usize| buf.is_empty_line(l);
    let run_end = |from: usize| {
        let kind = blank(from);
        let mut end = from;
        while end < last && blank(end + 1) == kind {
            end += 1;
        }
        end
    };

    let on_blank = blank(line);
    let mut first = line;
    while first > 0 && blank(first - 1) == on_blank {
        first -= 1;
    }
    let mut end = run_end(line);

    let runs = if inner { count } else { count * 2 };
    for _ in 1..runs {
        if end >= last {
            break;
        }
        end = run_end(end + 1);
    }
    if !inner && !on_blank && !blank(end) {
        while first > 0 && blank(first - 1) {
            first -= 1;
        }
    }
    ObjectRange::lines(buf, first, end)
}

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

fn quote_object(buf: &Buffer, pos: Position, quote: char, inner: bool) -> Option<ObjectRange> {
    let (open, close) = find_quote_pair(buf, pos, quote)?;
    let at = |col: usize| Position::new(pos.line, col);
    if inner {
        return Some(ObjectRange::charwise(at(open + 1), at(close)));
    }

    let line = buf.line(pos.line)?;
    let len = line.len_chars();
    let mut start = open;
    let mut end = close + 1;
    while end < len && is_blank(line.char(end)) {
        end += 1;
    }
    if end == close + 1 {
        while start > 0 && is_blank(line.char(start - 1)) {
            start -= 1;
        }
        // Leading blanks that are the line's indent stay.
        if start == 0 {
            start = open;
        }
    }
    Some(ObjectRange::charwise(at(start), at(end)))
}

/// The quote pair straddling the cursor, else the first pair to its right.
///
/// Unescaped quotes pair up left to right: first with second, third with
/// fourth, and so on.
fn find_quote_pair(buf: &Buffer, pos: Position, quote: char) -> Option<(usize, usize)> {
    let line = buf.line(pos.line)?;
    let mut quotes = Vec::new();
    let mut escaped = false;
    for (col, ch) in line.chars().enumerate() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == quote {
            quotes.push(col);
        }
    }

    let pairs: Vec<(usize, usize)> = quotes
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect();
    let col = pos.col;
    pairs
        .iter()
        .find(|&&(open, close)| open <= col && col <= close)
        .or_else(|| pairs.iter().find(|&&(open, _)| open > col))
        .copied()
}

// ---------------------------------------------------------------------------
// Brackets
// ---------------------------------------------------------------------------

fn bracket_object(
    buf: &Buffer,
    pos: Position,
    open: char,
    close: char,
    inner: bool,
    count: usize,
) -> Option<ObjectRange> {
    let (open_idx, close_idx) = find_bracket_pair(buf, pos, open, close, count)
        .or_else(|| find_pair_ahead_on_line(buf, pos, open, close))?;
    let open_pos = idx_to_pos(buf, open_idx);
    let close_pos = idx_to_pos(buf, close_idx);

    if !inner {
        return Some(ObjectRange::charwise(open_pos, idx_to_pos(buf, close_idx + 1)));
    }

    let opener_ends_line = open_pos.col + 1 == buf.line_len(open_pos.line);
    let closer_starts_line = buf.first_non_blank(close_pos.line) == Some(close_pos.col);
    if close_pos.line > open_pos.line && opener_ends_line && closer_starts_line {
        if close_pos.line == open_pos.line + 1 {
            return Some(ObjectRange::charwise(close_pos, close_pos));
        }
        return Some(ObjectRange::lines(buf, open_pos.line + 1, close_pos.line - 1));
    }
    Some(ObjectRange::charwise(idx_to_pos(buf, open_idx + 1), close_pos))
}

/// The `count`-th enclosing pair around the cursor. A cursor on a bracket
/// counts as inside that pair.
fn find_bracket_pair(
    buf: &Buffer,
    pos: Position,
    open: char,
    close: char,
    count: usize,
) -> Option<(usize, usize)> {
    let rope = buf.rope();
    let total = rope.len_chars();
    let cursor = buf.pos_to_char_idx(pos)?;
    if cursor >= total {
        return None;
    }

    let mut open_idx = if rope.char(cursor) == open {
        cursor
    } else {
        find_opening(rope, cursor, open, close)?
    };
    for _ in 1..count {
        open_idx = find_opening(rope, open_idx, open, close)?;
    }
    let close_idx = find_closing(rope, open_idx, open, close)?;
    Some((open_idx, close_idx))
}

/// No enclosing pair: try the first opener after the cursor on its line.
fn find_pair_ahead_on_line(
    buf: &Buffer,
    pos: Position,
    open: char,
    close: char,
) -> Option<(usize, usize)> {
    let line = buf.line(pos.line)?;
    let col = (pos.col..line.len_chars()).find(|&c| line.char(c) == open)?;
    let open_idx = buf.pos_to_char_idx(pos.with_col(col))?;
    let close_idx = find_closing(buf.rope(), open_idx, open, close)?;
    Some((open_idx, close_idx))
}

/// Scan backward from `start` (exclusive) for an unmatched opener.
fn find_opening(rope: &ropey::Rope, start: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for i in (0..start).rev() {
        let ch = rope.char(i);
        if ch == close {
            depth += 1;
        } else if ch == open {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
        }
    }
    None
}

/// Scan forward from the opener at `start` for its closer.
fn find_closing(rope: &ropey::Rope, start: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for i in start + 1..rope.len_chars() {
        let ch = rope.char(i);
        if ch == open {
            depth += 1;
        } else if ch == close {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
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

    fn chars(sl: usize, sc: usize, el: usize, ec: usize) -> Option<ObjectRange> {
        Some(ObjectRange::charwise(p(sl, sc), p(el, ec)))
    }

    fn obj(
        lines: &[&str],
        pos: Position,
        key: char,
        inner: bool,
        count: usize,
    ) -> Option<ObjectRange> {
        let buf = Buffer::from_lines(lines);
        let kind = ObjectKind::from_char(key).expect("known object key");
        resolve(&buf, pos, kind, inner, count)
    }

    fn text(lines: &[&str], found: Option<ObjectRange>) -> String {
        let buf = Buffer::from_lines(lines);
        buf.slice_text(found.expect("object").range)
    }

    // == Words ===============================================================

    #[test]
    fn iw_selects_word_or_blank_run() {
        let lines = ["foo  bar.baz"];
        assert_eq!(obj(&lines, p(0, 1), 'w', true, 1), chars(0, 0, 0, 3));
        assert_eq!(obj(&lines, p(0, 3), 'w', true, 1), chars(0, 3, 0, 5));
        assert_eq!(obj(&lines, p(0, 8), 'w', true, 1), chars(0, 8, 0, 9));
        assert_eq!(obj(&lines, p(0, 8), 'W', true, 1), chars(0, 5, 0, 12));
    }

    #[test]
    fn iw_count_counts_blank_runs() {
        let lines = ["one two three"];
        assert_eq!(text(&lines, obj(&lines, p(0, 0), 'w', true, 3)), "one two");
    }

    #[test]
    fn aw_takes_trailing_then_leading_blanks() {
        let lines = ["foo bar baz"];
        assert_eq!(text(&lines, obj(&lines, p(0, 5), 'w', false, 1)), "bar ");
        assert_eq!(text(&lines, obj(&lines, p(0, 9), 'w', false, 1)), " baz");
        assert_eq!(text(&lines, obj(&lines, p(0, 3), 'w', false, 1)), " bar");
    }

    #[test]
    fn aw_keeps_indent() {
        let lines = ["    foo"];
        assert_eq!(text(&lines, obj(&lines, p(0, 5), 'w', false, 1)), "foo");
    }

    #[test]
    fn aw_with_count() {
        let lines = ["a b c d"];
        assert_eq!(text(&lines, obj(&lines, p(0, 0), 'w', false, 2)), "a b ");
    }

    #[test]
    fn word_object_on_empty_line_fails() {
        assert_eq!(obj(&["", "x"], p(0, 0), 'w', true, 1), None);
    }

    // == Sentences ===========================================================

    #[test]
    fn is_and_as() {
        let lines = ["Hello there. General Kenobi!  Yes."];
        assert_eq!(text(&lines, obj(&lines, p(0, 15), 's', true, 1)), "General Kenobi!");
        assert_eq!(text(&lines, obj(&lines, p(0, 15), 's', false, 1)), "General Kenobi!  ");
        assert_eq!(text(&lines, obj(&lines, p(0, 31), 's', false, 1)), "  Yes.");
    }

    #[test]
    fn is_on_gap_selects_whitespace() {
        let lines = ["One.  Two."];
        assert_eq!(text(&lines, obj(&lines, p(0, 4), 's', true, 1)), "  ");
        assert_eq!(text(&lines, obj(&lines, p(0, 4), 's', false, 1)), "  Two.");
    }

    // == Paragraphs ==========================================================

    #[test]
    fn ip_and_ap_are_linewise() {
        let lines = ["a", "b", "", "", "c"];
        let ip = obj(&lines, p(1, 0), 'p', true, 1).expect("ip");
        assert!(ip.linewise);
        assert_eq!((ip.range.start.line, ip.range.end.line), (0, 1));
        let ap = obj(&lines, p(1, 0), 'p', false, 1).expect("ap");
        assert_eq!((ap.range.start.line, ap.range.end.line), (0, 3));
    }

    #[test]
    fn ap_on_last_paragraph_takes_leading_blanks() {
        let lines = ["a", "", "c", "d"];
        let ap = obj(&lines, p(3, 0), 'p', false, 1).expect("ap");
        assert_eq!((ap.range.start.line, ap.range.end.line), (1, 3));
    }

    #[test]
    fn ip_on_blank_run() {
        let lines = ["a", "", "", "b"];
        let ip = obj(&lines, p(1, 0), 'p', true, 1).expect("ip");
        assert_eq!((ip.range.start.line, ip.range.end.line), (1, 2));
        let ap = obj(&lines, p(1, 0), 'p', false, 1).expect("ap");
        assert_eq!((ap.range.start.line, ap.range.end.line), (1, 3));
    }

    // == Quotes ==============================================================

    #[test]
    fn quotes_inside_and_ahead() {
        let lines = [r#"say "hi" and "bye""#];
        assert_eq!(text(&lines, obj(&lines, p(0, 6), '"', true, 1)), "hi");
        assert_eq!(text(&lines, obj(&lines, p(0, 0), '"', true, 1)), "hi");
        assert_eq!(text(&lines, obj(&lines, p(0, 10), '"', true, 1)), "bye");
        assert_eq!(text(&lines, obj(&lines, p(0, 6), '"', false, 1)), r#""hi" "#);
    }

    #[test]
    fn escaped_quotes_are_skipped() {
        let lines = [r#"x = "a \" b";"#];
        assert_eq!(text(&lines, obj(&lines, p(0, 6), '"', true, 1)), r#"a \" b"#);
    }

    #[test]
    fn a_quote_at_line_end_takes_leading_blanks() {
        let lines = [r#"call 'x'"#];
        assert_eq!(text(&lines, obj(&lines, p(0, 6), '\'', false, 1)), " 'x'");
    }

    #[test]
    fn empty_quotes_give_empty_inner_range() {
        let found = obj(&[r#"a "" b"#], p(0, 2), '"', true, 1).expect("pair");
        assert!(found.range.is_empty());
        assert_eq!(found.range.start, p(0, 3));
    }

    #[test]
    fn missing_quote_pair_fails() {
        assert_eq!(obj(&[r#"only " one"#], p(0, 0), '"', true, 1), None);
    }

    // == Brackets ============================================================

    #[test]
    fn brackets_with_nesting_and_count() {
        let lines = ["f(a, g(b), c)"];
        assert_eq!(text(&lines, obj(&lines, p(0, 7), 'b', true, 1)), "b");
        assert_eq!(text(&lines, obj(&lines, p(0, 7), '(', true, 2)), "a, g(b), c");
        assert_eq!(text(&lines, obj(&lines, p(0, 3), ')', false, 1)), "(a, g(b), c)");
        assert_eq!(text(&lines, obj(&lines, p(0, 1), '(', true, 1)), "a, g(b), c");
    }

    #[test]
    fn bracket_ahead_on_line() {
        let lines = ["call(x) [y]"];
        assert_eq!(text(&lines, obj(&lines, p(0, 0), '(', true, 1)), "x");
        assert_eq!(obj(&["no brackets"], p(0, 0), '(', true, 1), None);
    }

    #[test]
    fn multi_line_inner_block_is_linewise() {
        let lines = ["fn x() {", "    a;", "    b;", "}"];
        let found = obj(&lines, p(1, 4), 'B', true, 1).expect("block");
        assert!(found.linewise);
        assert_eq!((found.range.start.line, found.range.end.line), (1, 2));
        let around = obj(&lines, p(1, 4), '{', false, 1).expect("block");
        assert!(!around.linewise);
        assert_eq!(around.range, Range::ordered(p(0, 7), p(3, 1)));
    }

    #[test]
    fn angle_brackets() {
        let lines = ["Vec<u8>"];
        assert_eq!(text(&lines, obj(&lines, p(0, 4), '<', true, 1)), "u8");
    }
}
