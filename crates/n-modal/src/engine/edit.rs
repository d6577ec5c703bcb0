//! Single-key edits: `x`, `p`, `J`, `r`, `~`, `Ctrl-A`, undo and redo.

use super::Engine;
use super::operator::REPORT;
use crate::error::EngineError;
use crate::history::UndoEntry;
use crate::operator::{Extent, Operator, toggle_char};
use crate::position::{Position, Range};
use crate::register::{Register, RegisterKind};

/// A number under or after the cursor, as `Ctrl-A` sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NumberToken {
    start: usize,
    end: usize,
    hex: bool,
}

/// The first decimal (with an optional `-`) or `0x` hex number on the line
/// that ends after `col`.
fn find_number(chars: &[char], col: usize) -> Option<NumberToken> {
    let mut i = 0;
    while i < chars.len() {
        let hex_prefix = chars[i] == '0'
            && matches!(chars.get(i + 1), Some('x' | 'X'))
            && chars.get(i + 2).is_some_and(char::is_ascii_hexdigit);
        if hex_prefix {
            let mut end = i + 2;
            while end < chars.len() && chars[end].is_ascii_hexdigit() {
                end += 1;
            }
            if end > col {
                return Some(NumberToken { start: i, end, hex: true });
            }
            i = end;
        } else if chars[i].is_ascii_digit() {
            let mut end = i;
            while end < chars.len() && chars[end].is_ascii_digit() {
                end += 1;
            }
            if end > col {
                let start = if i > 0 && chars[i - 1] == '-' { i - 1 } else { i };
                return Some(NumberToken { start, end, hex: false });
            }
            i = end;
        } else {
            i += 1;
        }
    }
    None
}

/// The token's text after adding `delta`. Hex wraps at 64 bits and keeps
/// its width and letter case.
fn adjust_number(token: &str, hex: bool, delta: i128) -> Option<String> {
    if !hex {
        let value: i128 = token.parse().ok()?;
        return Some(value.saturating_add(delta).to_string());
    }
    let (prefix, digits) = token.split_at(2);
    let value = u64::from_str_radix(digits, 16).ok()?;
    let wrapped = (i128::from(value) + delta).rem_euclid(1 << 64);
    let value = u64::try_from(wrapped).ok()?;
    let width = digits.len();
    let upper = digits.chars().any(|c| c.is_ascii_uppercase());
    Some(if upper {
        format!("{prefix}{value:0width$X}")
    } else {
        format!("{prefix}{value:0width$x}")
    })
}

impl Engine {
    // -- x, X, s ----------------------------------------------------------------

    pub(super) fn delete_chars(&mut self, count: usize) {
        let pos = self.cursor.position();
        let len = self.buffer.line_len(pos.line);
        if len == 0 {
            self.fail();
            return;
        }
        let end = pos.with_col((pos.col + count).min(len));
        self.apply_operator(Operator::Delete, Extent::Chars(Range { start: pos, end }), pos);
    }

    pub(super) fn delete_chars_before(&mut self, count: usize) {
        let pos = self.cursor.position();
        if pos.col == 0 {
            self.fail();
            return;
        }
        let start = pos.with_col(pos.col.saturating_sub(count));
        self.apply_operator(Operator::Delete, Extent::Chars(Range { start, end: pos }), pos);
    }

    pub(super) fn substitute(&mut self, count: usize) {
        let pos = self.cursor.position();
        let end = pos.with_col((pos.col + count).min(self.buffer.line_len(pos.line)));
        self.apply_operator(Operator::Change, Extent::Chars(Range { start: pos, end }), pos);
    }

    // -- Put ------------------------------------------------------------------

    /// The register a put reads, or the error to show.
    pub(super) fn put_register(&mut self) -> Option<Register> {
        let name = self.register.take();
        match self.registers.read(name) {
            Ok(reg) if !reg.is_empty() => Some(reg.clone()),
            Ok(_) => {
                self.report(&EngineError::EmptyRegister('"'));
                self.fail();
                None
            }
            Err(err) => {
                self.report(&err);
                self.fail();
                None
            }
        }
    }

    /// `p` / `P`, and `gp` / `gP` with `cursor_after`.
    pub(super) fn put(&mut self, after: bool, cursor_after: bool, count: usize) {
        let Some(reg) = self.put_register() else {
            return;
        };
        let origin = self.cursor.position();
        self.begin_change(origin);
        match reg.kind() {
            RegisterKind::Char => {
                let at = if after && !self.buffer.is_empty_line(origin.line) {
                    origin.with_col(origin.col + 1)
                } else {
                    origin
                };
                self.put_chars(&reg.text().repeat(count), at, cursor_after);
            }
            RegisterKind::Line => {
                let at = if after { origin.line + 1 } else { origin.line };
                let block: Vec<&str> = (0..count).flat_map(|_| reg.lines()).collect();
                self.put_lines(&block, at, cursor_after);
            }
        }
    }

    /// Insert charwise text at `at`.
    pub(super) fn put_chars(&mut self, text: &str, at: Position, cursor_after: bool) {
        let Some(start) = self.buffer.pos_to_char_idx(at) else {
            return;
        };
        self.buffer.insert(at, text);
        let end = start + text.chars().count();
        let newlines = text.matches('\n').count();
        if newlines > REPORT {
            self.set_message(format!("{newlines} more lines"));
        }
        let pos = if cursor_after {
            self.buffer.char_idx_to_pos(end)
        } else if newlines > 0 {
            at
        } else {
            self.buffer.char_idx_to_pos(end.saturating_sub(1))
        };
        self.place_cursor(pos, false);
    }

    /// Insert whole lines so the first becomes line `at`.
    pub(super) fn put_lines<S: AsRef<str>>(&mut self, lines: &[S], at: usize, cursor_after: bool) {
        self.buffer.insert_lines(at, lines);
        let count = lines.len();
        if count > REPORT {
            self.set_message(format!("{count} more lines"));
        }
        let pos = if cursor_after {
            Position::new(at + count, 0)
        } else {
            Position::new(at, self.first_non_blank_col(at))
        };
        self.place_cursor(pos, false);
    }

    // -- Join -----------------------------------------------------------------

    /// `J` (with `spaces`) and `gJ`: join `count` lines, at least two.
    pub(super) fn join(&mut self, count: usize, spaces: bool) {
        let line = self.cursor.line();
        let last = self.buffer.last_line();
        if line >= last {
            self.fail();
            return;
        }
        let joins = (count.max(2) - 1).min(last - line);
        self.begin_change(self.cursor.position());
        let mut col = 0;
        for _ in 0..joins {
            let current = self.buffer.line_text(line);
            let next = self.buffer.line_text(line + 1);
            let (sep, tail) = if spaces {
                let tail = next.trim_start_matches([' ', '\t']);
                let bare = tail.is_empty()
                    || tail.starts_with(')')
                    || current.is_empty()
                    || current.ends_with([' ', '\t']);
                (if bare { "" } else { " " }, tail)
            } else {
                ("", next.as_str())
            };
            col = current.chars().count();
            let joined = format!("{current}{sep}{tail}");
            self.buffer.remove_lines(line + 1, line + 1);
            self.buffer.set_line(line, &joined);
        }
        self.place_cursor(Position::new(line, col), false);
    }

    // -- ~ and r --------------------------------------------------------------

    pub(super) fn toggle_case_chars(&mut self, count: usize) {
        let pos = self.cursor.position();
        let len = self.buffer.line_len(pos.line);
        if len == 0 {
            self.fail();
            return;
        }
        let end = (pos.col + count).min(len);
        let range = Range {
            start: pos,
            end: pos.with_col(end),
        };
        let toggled: String = self.buffer.slice_text(range).chars().map(toggle_char).collect();
        self.begin_change(pos);
        self.buffer.replace(range, &toggled);
        self.place_cursor(pos.with_col(end), false);
    }

    /// `r{ch}`: replace `count` chars. Fails without a change when fewer
    /// remain.
    pub(super) fn replace_chars(&mut self, ch: char, count: usize) {
        let pos = self.cursor.position();
        if pos.col + count > self.buffer.line_len(pos.line) {
            self.fail();
            return;
        }
        self.begin_change(pos);
        let range = Range {
            start: pos,
            end: pos.with_col(pos.col + count),
        };
        self.buffer.replace(range, &ch.to_string().repeat(count));
        self.place_cursor(pos.with_col(pos.col + count - 1), false);
    }

    /// `r<CR>`: the `count` chars become one line break.
    pub(super) fn replace_with_newline(&mut self, count: usize) {
        let pos = self.cursor.position();
        if pos.col + count > self.buffer.line_len(pos.line) {
            self.fail();
            return;
        }
        self.begin_change(pos);
        let text = self.buffer.line_text(pos.line);
        let head: String = text.chars().take(pos.col).collect();
        let rest: String = text.chars().skip(pos.col + count).collect();
        let (indent, rest) = if self.options.autoindent {
            (self.buffer.indent(pos.line), rest.trim_start_matches([' ', '\t']).to_string())
        } else {
            (String::new(), rest)
        };
        self.buffer.set_line(pos.line, &head);
        self.buffer.insert_lines(pos.line + 1, &[format!("{indent}{rest}")]);
        self.place_cursor(Position::new(pos.line + 1, indent.chars().count()), false);
    }

    // -- Ctrl-A / Ctrl-X -----------------------------------------------------

    pub(super) fn increment(&mut self, count: usize, up: bool) {
        let pos = self.cursor.position();
        let chars: Vec<char> = self.buffer.line_text(pos.line).chars().collect();
        let Some(token) = find_number(&chars, pos.col) else {
            self.fail();
            return;
        };
        let text: String = chars[token.start..token.end].iter().collect();
        let delta = i128::try_from(count).unwrap_or(i128::MAX);
        let delta = if up { delta } else { -delta };
        let Some(new) = adjust_number(&text, token.hex, delta) else {
            self.fail();
            return;
        };
        self.begin_change(pos);
        let range = Range {
            start: pos.with_col(token.start),
            end: pos.with_col(token.end),
        };
        self.buffer.replace(range, &new);
        let last = token.start + new.chars().count() - 1;
        self.place_cursor(pos.with_col(last), false);
    }

    // -- Undo / redo ----------------------------------------------------------

    fn current_state(&self) -> UndoEntry {
        UndoEntry {
            rope: self.buffer.rope().clone(),
            cursor: self.cursor.position(),
            scroll: self.scroll,
        }
    }

    pub(super) fn undo(&mut self, count: usize) {
        self.replay.dot_cancel();
        self.command_tick = None;
        for step in 0..count {
            let current = self.current_state();
            let Some(entry) = self.history.undo(current) else {
                if step == 0 {
                    self.set_message("Already at oldest change");
                    self.replay.no_progress();
                }
                break;
            };
            self.buffer.set_rope(entry.rope);
            self.scroll = entry.scroll;
            self.place_cursor(entry.cursor, false);
            self.tick += 1;
        }
    }

    pub(super) fn redo(&mut self, count: usize) {
        self.replay.dot_cancel();
        self.command_tick = None;
        for step in 0..count {
            let current = self.current_state();
            let Some(entry) = self.history.redo(current) else {
                if step == 0 {
                    self.set_message("Already at newest change");
                    self.replay.no_progress();
                }
                break;
            };
            self.buffer.set_rope(entry.rope);
            self.scroll = entry.scroll;
            self.place_cursor(entry.cursor_redo, false);
            self.tick += 1;
        }
    }
}
