//! Insert and Replace mode.

use super::Engine;
use crate::cursor::{self, TAB_WIDTH, display_width};
use crate::key::Key;
use crate::mode::Mode;
use crate::position::{Position, Range};
use crate::register::{self, RegisterKind};
use crate::word;

/// How a counted insert repeats on `Esc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum InsertRepeat {
    /// `3ix`: type the text again in place.
    Plain,
    /// `3ox`: open another line first.
    OpenLine,
}

#[derive(Debug, Clone)]
pub(super) struct InsertSession {
    count: usize,
    repeat: InsertRepeat,
    typed: Vec<Key>,
    /// Replace mode: the char each typed char overwrote, `None` when it
    /// extended the line.
    overwritten: Vec<Option<char>>,
    /// A line holding only autoindent; emptied if left that way.
    autoindent_line: Option<usize>,
    /// `Ctrl-R` typed; the next key names a register.
    register_pending: bool,
}

/// Where `Ctrl-O` left off.
#[derive(Debug, Clone, Copy)]
pub(super) struct InsertResume {
    mode: Mode,
    /// A key has been handled outside Insert mode since.
    pub(super) ran: bool,
    /// Replay nesting when `Ctrl-O` was typed.
    depth: usize,
    /// Set when the cursor was past the end of the line: the position it
    /// was clamped back to.
    eol: Option<Position>,
}

impl InsertSession {
    const fn new(count: usize, repeat: InsertRepeat) -> Self {
        Self {
            count,
            repeat,
            typed: Vec::new(),
            overwritten: Vec::new(),
            autoindent_line: None,
            register_pending: false,
        }
    }
}

impl InsertResume {
    pub(super) const fn indicator(self) -> &'static str {
        match self.mode {
            Mode::Replace => "-- (replace) --",
            _ => "-- (insert) --",
        }
    }
}

const fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

impl Engine {
    pub(super) fn start_insert(&mut self, count: usize, repeat: InsertRepeat) {
        self.mode = Mode::Insert;
        self.insert = Some(InsertSession::new(count, repeat));
    }

    pub(super) fn start_replace(&mut self, count: usize) {
        self.mode = Mode::Replace;
        self.insert = Some(InsertSession::new(count, InsertRepeat::Plain));
    }

    pub(super) fn mark_autoindent(&mut self, line: usize) {
        if let Some(session) = &mut self.insert {
            session.autoindent_line = Some(line);
        }
    }

    /// `o` / `O`.
    pub(super) fn open_line(&mut self, below: bool, count: usize) {
        self.begin_change(self.cursor.position());
        self.start_insert(count, InsertRepeat::OpenLine);
        self.insert_blank_line(below);
    }

    fn insert_blank_line(&mut self, below: bool) {
        let line = self.cursor.line();
        let indent = if self.options.autoindent {
            self.buffer.indent(line)
        } else {
            String::new()
        };
        let at = if below { line + 1 } else { line };
        self.buffer.insert_lines(at, &[indent.as_str()]);
        let col = indent.chars().count();
        self.cursor.set(Position::new(at, col), &self.buffer);
        if let Some(session) = &mut self.insert {
            session.autoindent_line = (col > 0).then_some(at);
        }
    }

    pub(super) fn insert_key(&mut self, key: Key) {
        if let Some(session) = self.insert.as_mut().filter(|s| s.register_pending) {
            session.register_pending = false;
            self.insert_register(key);
            return;
        }
        match key {
            Key::Escape | Key::Ctrl('[' | 'c') => self.finish_insert(),
            Key::Ctrl('r') => {
                if let Some(session) = &mut self.insert {
                    session.register_pending = true;
                }
            }
            Key::Ctrl('o') => self.suspend_insert(),
            _ => {
                if let Some(session) = &mut self.insert {
                    session.typed.push(key);
                }
                self.type_key(key);
            }
        }
    }

    /// `Ctrl-R {reg}`: the register's text, inserted as if typed.
    fn insert_register(&mut self, key: Key) {
        let Some(name) = key.char().filter(|&c| register::is_valid_name(c)) else {
            return;
        };
        let text = match self.registers.read((name != '"').then_some(name)) {
            Ok(reg) if reg.kind() == RegisterKind::Line => format!("{}\n", reg.text()),
            Ok(reg) => reg.text().to_string(),
            Err(err) => {
                self.report(&err);
                return;
            }
        };
        for c in text.chars() {
            let key = if c == '\n' { Key::Enter } else { Key::Char(c) };
            if let Some(session) = &mut self.insert {
                session.typed.push(key);
            }
            self.type_key(key);
        }
    }

    /// `Ctrl-O`: run one Normal-mode command, then carry on inserting. The
    /// text typed so far is its own undo step and repeats as if ended with
    /// `Esc`.
    fn suspend_insert(&mut self) {
        let pos = self.cursor.position();
        let len = self.buffer.line_len(pos.line);
        self.resume = Some(InsertResume {
            mode: self.mode,
            ran: false,
            depth: self.replay.depth(),
            eol: (len > 0 && pos.col >= len).then(|| pos.with_col(len - 1)),
        });
        self.replay.dot_replace_last(Key::Escape);
        self.insert = None;
        self.mode = Mode::Normal;
    }

    /// Back to Insert (or Replace) once the `Ctrl-O` command is complete.
    /// A command that starts its own insert takes over instead.
    pub(super) fn resume_insert(&mut self) {
        let Some(resume) = self.resume else {
            return;
        };
        if resume.depth != self.replay.depth() {
            return;
        }
        if self.mode.cursor_past_end() {
            self.resume = None;
            return;
        }
        let complete = self.mode == Mode::Normal
            && self.pending.is_idle()
            && self.count.is_none()
            && self.register.is_none();
        if !resume.ran || !complete {
            return;
        }
        self.resume = None;
        if resume.mode == Mode::Replace {
            self.start_replace(1);
        } else {
            self.start_insert(1, InsertRepeat::Plain);
        }
        if let Some(eol) = resume.eol.filter(|&eol| eol == self.cursor.position()) {
            self.place_cursor(eol.with_col(eol.col + 1), true);
        }
    }

    fn type_key(&mut self, key: Key) {
        match key {
            Key::Char(c) => self.type_char(c),
            Key::Tab | Key::Ctrl('i') => self.type_tab(),
            Key::Enter | Key::Ctrl('m' | 'j') => self.type_newline(),
            Key::Backspace | Key::Ctrl('h') => self.type_backspace(),
            Key::Delete => self.type_delete(),
            Key::Ctrl('w') => self.delete_word_before(),
            Key::Ctrl('u') => self.delete_to_line_start(),
            Key::Left => {
                let pos = self.cursor.position();
                if pos.col > 0 {
                    self.cursor.set(pos.with_col(pos.col - 1), &self.buffer);
                }
            }
            Key::Right => {
                let pos = self.cursor.position();
                if pos.col < self.buffer.line_len(pos.line) {
                    self.cursor.set(pos.with_col(pos.col + 1), &self.buffer);
                }
            }
            Key::Up | Key::Down => {
                let line = self.cursor.line();
                let target = if key == Key::Up {
                    line.checked_sub(1)
                } else {
                    (line < self.buffer.last_line()).then_some(line + 1)
                };
                if let Some(target) = target {
                    let vcol = self.cursor.want_vcol();
                    let col = cursor::col_for_vcol(&self.buffer, target, vcol, true);
                    self.cursor.set_keep_vcol(Position::new(target, col));
                }
            }
            Key::Home => {
                let line = self.cursor.line();
                self.cursor.set(Position::new(line, 0), &self.buffer);
            }
            Key::End => {
                let line = self.cursor.line();
                self.cursor.set(Position::new(line, self.buffer.line_len(line)), &self.buffer);
            }
            _ => {}
        }
    }

    fn type_char(&mut self, c: char) {
        let pos = self.cursor.position();
        self.begin_change(pos);
        let mut encoded = [0; 4];
        let text = c.encode_utf8(&mut encoded);
        let replacing = self.mode == Mode::Replace;
        if replacing && pos.col < self.buffer.line_len(pos.line) {
            let old = self.buffer.char_at(pos);
            self.buffer.replace(
                Range {
                    start: pos,
                    end: pos.with_col(pos.col + 1),
                },
                text,
            );
            if let Some(session) = &mut self.insert {
                session.overwritten.push(old);
            }
        } else {
            self.buffer.insert(pos, text);
            if let Some(session) = self.insert.as_mut().filter(|_| replacing) {
                session.overwritten.push(None);
            }
        }
        if let Some(session) = &mut self.insert {
            session.autoindent_line = None;
        }
        self.cursor.set(pos.with_col(pos.col + 1), &self.buffer);
    }

    fn type_tab(&mut self) {
        if !self.options.expandtab {
            self.type_char('\t');
            return;
        }
        let pos = self.cursor.position();
        let before: String = self.buffer.line_text(pos.line).chars().take(pos.col).collect();
        let width = display_width(&before);
        for _ in 0..TAB_WIDTH - width % TAB_WIDTH {
            self.type_char(' ');
        }
    }

    fn type_newline(&mut self) {
        let pos = self.cursor.position();
        self.begin_change(pos);
        let text = self.buffer.line_text(pos.line);
        let mut head: String = text.chars().take(pos.col).collect();
        let mut rest: String = text.chars().skip(pos.col).collect();
        let mut indent = String::new();
        if self.options.autoindent {
            indent = head.chars().take_while(|&c| is_blank(c)).collect();
            rest = rest.trim_start_matches([' ', '\t']).to_string();
            let unused = self.insert.as_ref().and_then(|s| s.autoindent_line) == Some(pos.line);
            if unused && head.chars().all(is_blank) {
                head.clear();
            }
        }
        self.buffer.set_line(pos.line, &head);
        self.buffer.insert_lines(pos.line + 1, &[format!("{indent}{rest}")]);
        let col = indent.chars().count();
        self.cursor.set(Position::new(pos.line + 1, col), &self.buffer);
        if let Some(session) = &mut self.insert {
            session.autoindent_line = (col > 0).then_some(pos.line + 1);
        }
    }

    fn type_backspace(&mut self) {
        let pos = self.cursor.position();
        if self.mode == Mode::Replace {
            if pos.col == 0 {
                return;
            }
            let back = pos.with_col(pos.col - 1);
            let restore = self.insert.as_mut().and_then(|s| s.overwritten.pop());
            let range = Range { start: back, end: pos };
            match restore {
                Some(Some(old)) => self.buffer.replace(range, &old.to_string()),
                Some(None) => {
                    self.buffer.delete(range);
                }
                None => {}
            }
            self.cursor.set(back, &self.buffer);
            return;
        }
        if pos.col > 0 {
            self.begin_change(pos);
            let start = pos.with_col(pos.col - 1);
            self.buffer.delete(Range { start, end: pos });
            self.cursor.set(start, &self.buffer);
        } else if pos.line > 0 {
            self.begin_change(pos);
            let prev = pos.line - 1;
            let start = Position::new(prev, self.buffer.line_len(prev));
            self.buffer.delete(Range { start, end: pos });
            self.cursor.set(start, &self.buffer);
        }
    }

    fn type_delete(&mut self) {
        let pos = self.cursor.position();
        let len = self.buffer.line_len(pos.line);
        let end = if pos.col < len {
            pos.with_col(pos.col + 1)
        } else if pos.line < self.buffer.last_line() {
            Position::new(pos.line + 1, 0)
        } else {
            return;
        };
        self.begin_change(pos);
        self.buffer.delete(Range { start: pos, end });
    }

    /// `Ctrl-W`: blanks, then one run of keyword or other non-blank chars.
    fn delete_word_before(&mut self) {
        let pos = self.cursor.position();
        if pos.col == 0 {
            self.type_backspace();
            return;
        }
        let chars: Vec<char> = self.buffer.line_text(pos.line).chars().collect();
        let mut start = pos.col.min(chars.len());
        while start > 0 && is_blank(chars[start - 1]) {
            start -= 1;
        }
        if start > 0 {
            let keyword = word::is_keyword_char(chars[start - 1]);
            while start > 0
                && !is_blank(chars[start - 1])
                && word::is_keyword_char(chars[start - 1]) == keyword
            {
                start -= 1;
            }
        }
        self.begin_change(pos);
        let start = pos.with_col(start);
        self.buffer.delete(Range { start, end: pos });
        self.cursor.set(start, &self.buffer);
    }

    /// `Ctrl-U`: back to the indent, or to column 0 from inside it.
    fn delete_to_line_start(&mut self) {
        let pos = self.cursor.position();
        let indent = self
            .buffer
            .first_non_blank(pos.line)
            .unwrap_or_else(|| self.buffer.line_len(pos.line));
        let start = if pos.col > indent { indent } else { 0 };
        if start == pos.col {
            return;
        }
        self.begin_change(pos);
        let start = pos.with_col(start);
        self.buffer.delete(Range { start, end: pos });
        self.cursor.set(start, &self.buffer);
    }

    /// `Esc`: repeat the typed text for a count, drop unused autoindent,
    /// and step the cursor back onto the text.
    fn finish_insert(&mut self) {
        if let Some(session) = &self.insert {
            let (count, repeat, typed) = (session.count, session.repeat, session.typed.clone());
            for _ in 1..count {
                if repeat == InsertRepeat::OpenLine {
                    self.insert_blank_line(true);
                }
                for &key in &typed {
                    self.type_key(key);
                }
            }
        }
        let line = self.cursor.line();
        let unused = self.insert.as_ref().and_then(|s| s.autoindent_line) == Some(line);
        if unused && self.buffer.line_text(line).chars().all(is_blank) {
            self.begin_change(self.cursor.position());
            self.buffer.set_line(line, "");
            self.cursor.set(Position::new(line, 0), &self.buffer);
        }
        self.insert = None;
        self.mode = Mode::Normal;
        let pos = self.cursor.position();
        self.cursor.set(pos.with_col(pos.col.saturating_sub(1)), &self.buffer);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::engine::tests::{engine_with, feed, lines, p};
    use crate::mode::Mode;

    // ── Entering ─────────────────────────────────────────────────────────

    #[test]
    fn insert_append_and_line_variants() {
        let mut e = engine_with("  mid");
        feed(&mut e, "lIa<Esc>");
        assert_eq!(lines(&e), vec!["  amid"]);
        feed(&mut e, "Az<Esc>");
        assert_eq!(lines(&e), vec!["  amidz"]);
        assert_eq!(e.cursor(), p(0, 6));
        feed(&mut e, "0ab<Esc>");
        assert_eq!(lines(&e), vec![" b amidz"]);
        feed(&mut e, "gI#<Esc>");
        assert_eq!(lines(&e), vec!["# b amidz"]);
    }

    #[test]
    fn counted_insert_repeats_text() {
        let mut e = engine_with("");
        feed(&mut e, "3ix<Esc>");
        assert_eq!(lines(&e), vec!["xxx"]);
        assert_eq!(e.cursor(), p(0, 2));
    }

    #[test]
    fn counted_open_line_opens_each_time() {
        let mut e = engine_with("top");
        feed(&mut e, "2oab<Esc>");
        assert_eq!(lines(&e), vec!["top", "ab", "ab"]);
        assert_eq!(e.cursor(), p(2, 1));
    }

    #[test]
    fn open_above_keeps_indent() {
        let mut e = engine_with("\tx");
        feed(&mut e, "Oy<Esc>");
        assert_eq!(lines(&e), vec!["\ty", "\tx"]);
    }

    // ── Typing ───────────────────────────────────────────────────────────

    #[test]
    fn enter_autoindents_and_strips_leading_blanks() {
        let mut e = engine_with("    foo bar");
        feed(&mut e, "fbi<CR><Esc>");
        assert_eq!(lines(&e), vec!["    foo ", "    bar"]);
        assert_eq!(e.cursor(), p(1, 3));
    }

    #[test]
    fn enter_twice_clears_unused_indent() {
        let mut e = engine_with("  a");
        feed(&mut e, "A<CR><CR>b<Esc>");
        assert_eq!(lines(&e), vec!["  a", "", "  b"]);
    }

    #[test]
    fn escape_clears_autoindent_only_line() {
        let mut e = engine_with("  a");
        feed(&mut e, "o<Esc>");
        assert_eq!(lines(&e), vec!["  a", ""]);
        assert_eq!(e.cursor(), p(1, 0));
    }

    #[test]
    fn backspace_joins_lines() {
        let mut e = engine_with("ab\ncd");
        feed(&mut e, "ji<BS><BS>x<Esc>");
        assert_eq!(lines(&e), vec!["axcd"]);
    }

    #[test]
    fn delete_key_joins_at_end() {
        let mut e = engine_with("ab\ncd");
        feed(&mut e, "A<Del><Esc>");
        assert_eq!(lines(&e), vec!["abcd"]);
    }

    #[test]
    fn ctrl_w_and_ctrl_u() {
        let mut e = engine_with("");
        feed(&mut e, "i  foo.bar baz<C-w>");
        assert_eq!(lines(&e), vec!["  foo.bar "]);
        feed(&mut e, "<C-w>");
        assert_eq!(lines(&e), vec!["  foo."]);
        feed(&mut e, "<C-w>");
        assert_eq!(lines(&e), vec!["  foo"]);
        feed(&mut e, "<C-u>");
        assert_eq!(lines(&e), vec!["  "]);
        feed(&mut e, "<C-u>");
        assert_eq!(lines(&e), vec![""]);
    }

    #[test]
    fn tab_expands_to_next_stop() {
        let mut e = engine_with("ab");
        feed(&mut e, ":set et<CR>A<Tab>x<Esc>");
        assert_eq!(lines(&e), vec!["ab      x"]);
        feed(&mut e, ":set noet<CR>A<Tab><Esc>");
        assert_eq!(lines(&e), vec!["ab      x\t"]);
    }

    #[test]
    fn arrows_move_within_insert() {
        let mut e = engine_with("abc\nde");
        feed(&mut e, "A<Left><Left>X<Down>Y<Esc>");
        assert_eq!(lines(&e), vec!["aXbc", "deY"]);
    }

    // ── Ctrl-R and Ctrl-O ────────────────────────────────────────────────

    #[test]
    fn ctrl_r_inserts_register() {
        let mut e = engine_with("abc");
        feed(&mut e, "yiwA <C-r>\"<Esc>");
        assert_eq!(lines(&e), vec!["abc abc"]);
        assert_eq!(e.cursor(), p(0, 6));
    }

    #[test]
    fn ctrl_r_linewise_register_breaks_line() {
        let mut e = engine_with("one\ntwo");
        feed(&mut e, "yyjA <C-r>\"x<Esc>");
        assert_eq!(lines(&e), vec!["one", "two one", "x"]);
    }

    #[test]
    fn ctrl_r_empty_named_register_reports() {
        let mut e = engine_with("abc");
        feed(&mut e, "i<C-r>q");
        assert_eq!(e.snapshot().status, "E353: Nothing in register q");
        assert_eq!(e.mode(), Mode::Insert);
        feed(&mut e, "z<Esc>");
        assert_eq!(lines(&e), vec!["zabc"]);
    }

    #[test]
    fn counted_insert_repeats_register_text() {
        let mut e = engine_with("ab");
        feed(&mut e, "yl2A<C-r>\"<Esc>");
        assert_eq!(lines(&e), vec!["abaa"]);
    }

    #[test]
    fn ctrl_o_runs_one_command() {
        let mut e = engine_with("abc def");
        feed(&mut e, "A<C-o>");
        assert_eq!(e.mode(), Mode::Normal);
        assert_eq!(e.snapshot().status, "-- (insert) --");
        feed(&mut e, "0");
        assert_eq!(e.mode(), Mode::Insert);
        feed(&mut e, "X<Esc>");
        assert_eq!(lines(&e), vec!["Xabc def"]);
        assert_eq!(e.cursor(), p(0, 0));
    }

    #[test]
    fn ctrl_o_at_line_end_resumes_there() {
        let mut e = engine_with("abc");
        feed(&mut e, "A<C-o>zzx<Esc>");
        assert_eq!(lines(&e), vec!["abcx"]);
    }

    #[test]
    fn ctrl_o_command_with_operator() {
        let mut e = engine_with("a\nb");
        feed(&mut e, "ix<C-o>ddy<Esc>");
        assert_eq!(lines(&e), vec!["yb"]);
        assert_eq!(e.mode(), Mode::Normal);
    }

    #[test]
    fn ctrl_o_splits_undo() {
        let mut e = engine_with("ab");
        feed(&mut e, "Ax<C-o>0y<Esc>");
        assert_eq!(lines(&e), vec!["yabx"]);
        feed(&mut e, "u");
        assert_eq!(lines(&e), vec!["abx"]);
        feed(&mut e, "u");
        assert_eq!(lines(&e), vec!["ab"]);
    }

    #[test]
    fn dot_after_ctrl_o_repeats_text_before_it() {
        let mut e = engine_with("ab\ncd");
        feed(&mut e, "ix<C-o>j<Esc>");
        assert_eq!(lines(&e), vec!["xab", "cd"]);
        assert_eq!(e.cursor(), p(1, 0));
        feed(&mut e, ".");
        assert_eq!(lines(&e), vec!["xab", "xcd"]);
    }

    // ── Replace mode ─────────────────────────────────────────────────────

    #[test]
    fn replace_overwrites_then_extends() {
        let mut e = engine_with("abc");
        feed(&mut e, "lRxyz<Esc>");
        assert_eq!(lines(&e), vec!["axyz"]);
        assert_eq!(e.cursor(), p(0, 3));
        assert_eq!(e.mode(), Mode::Normal);
    }

    #[test]
    fn replace_backspace_restores() {
        let mut e = engine_with("abc");
        feed(&mut e, "lRxyz<BS><BS><BS><Esc>");
        assert_eq!(lines(&e), vec!["abc"]);
        assert_eq!(e.cursor(), p(0, 0));
    }
}
