//! Visual and Visual-line mode.
//!
//! The selection is the cursor plus its anchor. Operators act on it and
//! leave Visual mode. Changes are recorded for `.` as the Normal command
//! that covers the same text where one exists (`Vjd` as `2dd`, `v2ld` as
//! `d3l`), and as a reselection otherwise.

use super::normal::{key_motion, target_char};
use super::{Engine, Selection};
use crate::key::Key;
use crate::mode::Mode;
use crate::operator::{Extent, Operator};
use crate::pending::Pending;
use crate::position::{Position, Range};
use crate::register::RegisterKind;
use crate::search::SearchDirection;
use crate::text_object::{self, ObjectKind};

fn digits(n: usize) -> Vec<Key> {
    n.to_string().chars().map(Key::Char).collect()
}

impl Engine {
    pub(super) fn enter_visual(&mut self, mode: Mode) {
        self.count = None;
        self.cursor.set_anchor(self.cursor.position());
        self.mode = mode;
    }

    /// Leave Visual mode, remembering the selection for `gv` and `'<`/`'>`.
    pub(super) fn exit_visual(&mut self) {
        if let Some(anchor) = self.cursor.anchor() {
            let cursor = self.cursor.position();
            self.last_visual = Some(Selection {
                anchor,
                cursor,
                mode: self.mode,
            });
            let range = Range::ordered(anchor, cursor);
            self.marks.set_visual(range.start, range.end);
        }
        self.cursor.clear_anchor();
        self.mode = Mode::Normal;
        self.count = None;
    }

    /// `gv`.
    pub(super) fn reselect_visual(&mut self) {
        let Some(selection) = self.last_visual else {
            self.fail();
            return;
        };
        let anchor = self.buffer.clamp(selection.anchor, true);
        let cursor = self.buffer.clamp(selection.cursor, true);
        self.cursor.set_anchor(anchor);
        self.cursor.set(cursor, &self.buffer);
        self.mode = selection.mode;
    }

    pub(super) fn visual_key(&mut self, pending: Pending, key: Key) {
        match pending {
            Pending::Idle => self.visual_command(key),
            Pending::FindChar { kind, op: None, count } => {
                if let Some(ch) = target_char(key) {
                    self.last_find = Some((kind, ch));
                    let motion = crate::motion::Motion::Find { kind, ch, repeat: false };
                    self.motion_command(motion, count);
                }
            }
            Pending::G { count } => self.visual_g_key(count, key),
            Pending::Scroll { count } => self.scroll_key(count, key),
            Pending::SetMark => {
                let pos = self.cursor.position();
                if let Some(name) = key.char() {
                    self.marks.set(name, pos);
                }
            }
            Pending::GotoMark { exact, op: None } => self.goto_mark_key(exact, None, key),
            Pending::VisualReplace => self.visual_replace_key(key),
            Pending::VisualTextObject { inner, count } => self.visual_object_key(inner, count, key),
            Pending::Register
            | Pending::Operator(_)
            | Pending::OperatorG(_)
            | Pending::TextObject { .. }
            | Pending::FindChar { op: Some(_), .. }
            | Pending::GotoMark { op: Some(_), .. }
            | Pending::Z
            | Pending::MacroRecord
            | Pending::MacroPlay { .. }
            | Pending::ReplaceChar { .. }
            | Pending::AwaitingSearch(_) => {}
        }
    }

    fn visual_command(&mut self, key: Key) {
        let count = self.count.take();
        if let Some(motion) = key_motion(key) {
            self.motion_command(motion, count);
            return;
        }
        if self.scroll_command(key, count) {
            return;
        }
        let n = count.unwrap_or(1);
        match key {
            Key::Escape | Key::Ctrl('c' | '[') => self.exit_visual(),
            Key::Delete => self.visual_operator(Operator::Delete, false),
            Key::Char(c) => self.visual_char(c, count, n),
            _ => {}
        }
    }

    fn visual_char(&mut self, c: char, count: Option<usize>, n: usize) {
        if let Some(kind) = crate::motion::FindKind::from_char(c) {
            self.pending = Pending::FindChar { kind, op: None, count };
            return;
        }
        match c {
            'v' | 'V' => {
                let mode = if c == 'v' { Mode::Visual } else { Mode::VisualLine };
                if self.mode == mode {
                    self.exit_visual();
                } else {
                    self.mode = mode;
                }
            }
            'o' | 'O' => self.cursor.swap_anchor(&self.buffer),
            ';' | ',' => self.repeat_find(c == ',', count, None),
            'g' => self.pending = Pending::G { count },
            'z' => self.pending = Pending::Scroll { count },
            'm' => self.pending = Pending::SetMark,
            '\'' | '`' => {
                self.pending = Pending::GotoMark {
                    exact: c == '`',
                    op: None,
                };
            }
            '"' => {
                self.count = count;
                self.pending = Pending::Register;
            }
            'i' | 'a' => {
                self.pending = Pending::VisualTextObject {
                    inner: c == 'i',
                    count,
                };
            }
            'r' => self.pending = Pending::VisualReplace,
            'd' | 'x' => self.visual_operator(Operator::Delete, false),
            'D' | 'X' => self.visual_operator(Operator::Delete, true),
            'c' | 's' => self.visual_operator(Operator::Change, false),
            'C' | 'S' | 'R' => self.visual_operator(Operator::Change, true),
            'y' => self.visual_operator(Operator::Yank, false),
            'Y' => self.visual_operator(Operator::Yank, true),
            '~' => self.visual_operator(Operator::Toggle, false),
            'u' => self.visual_operator(Operator::Lower, false),
            'U' => self.visual_operator(Operator::Upper, false),
            '>' | '<' => self.visual_shift(c == '>', n),
            'J' => self.visual_join(true),
            'p' | 'P' => self.visual_put(),
            ':' => {
                self.replay.dot_cancel();
                self.exit_visual();
                self.open_ex(None);
                for ch in "'<,'>".chars() {
                    self.cmdline.insert_char(ch);
                }
            }
            'n' | 'N' => self.search_next(c == 'N', n),
            '*' => self.search_word(SearchDirection::Forward, n),
            '#' => self.search_word(SearchDirection::Backward, n),
            'q' if self.replay.recording().is_some() => self.finish_recording(),
            _ => {}
        }
    }

    fn visual_g_key(&mut self, count: Option<usize>, key: Key) {
        let Some(c) = key.char() else {
            return;
        };
        match c {
            'u' => self.visual_operator(Operator::Lower, false),
            'U' => self.visual_operator(Operator::Upper, false),
            '~' => self.visual_operator(Operator::Toggle, false),
            'J' => self.visual_join(false),
            'v' => self.reselect_visual(),
            _ => {
                if let Some(motion) = crate::motion::Motion::from_g_char(c) {
                    self.motion_command(motion, count);
                }
            }
        }
    }

    // -- Extents ----------------------------------------------------------------

    /// What the selection covers. A charwise selection includes the char
    /// under the cursor, and the line break when it ends past the text.
    fn visual_extent(&self, linewise: bool) -> Extent {
        let pos = self.cursor.position();
        let anchor = self.cursor.anchor().unwrap_or(pos);
        let range = Range::ordered(anchor, pos);
        if linewise || self.mode == Mode::VisualLine {
            return Extent::Lines {
                first: range.start.line,
                last: range.end.line,
            };
        }
        let end = range.end;
        let len = self.buffer.line_len(end.line);
        let end = if end.col >= len {
            if end.line < self.buffer.last_line() {
                Position::new(end.line + 1, 0)
            } else {
                Position::new(end.line, len)
            }
        } else {
            end.with_col(end.col + 1)
        };
        Extent::Chars(Range {
            start: range.start,
            end,
        })
    }

    /// Keys that select `extent` again from its start.
    fn reselect_keys(&self, extent: Extent) -> Vec<Key> {
        match extent {
            Extent::Lines { first, last } => {
                let mut keys = vec![Key::Char('V')];
                if last > first {
                    keys.extend(digits(last - first));
                    keys.push(Key::Char('j'));
                }
                keys
            }
            Extent::Chars(range) => {
                let mut keys = vec![Key::Char('v')];
                let newline = range.end.col == 0 && range.end.line > range.start.line;
                let (end_line, end_col) = if newline {
                    (range.end.line - 1, 0)
                } else {
                    (range.end.line, range.end.col.saturating_sub(1))
                };
                if end_line > range.start.line {
                    keys.extend(digits(end_line - range.start.line));
                    keys.push(Key::Char('j'));
                }
                if newline {
                    keys.push(Key::Char('$'));
                } else {
                    keys.push(Key::Char('0'));
                    if end_col > 0 {
                        keys.extend(digits(end_col));
                        keys.push(Key::Char('l'));
                    }
                }
                keys
            }
            Extent::Empty(_) => Vec::new(),
        }
    }

    /// Record a Visual operator for `.`.
    fn record_visual_operator(&mut self, op: Operator, extent: Extent) {
        match extent {
            Extent::Lines { first, last } => {
                let mut keys = op.keys();
                keys.push(Key::Char(op.line_char()));
                self.replay.dot_rewrite(keys, Some(last - first + 1));
            }
            Extent::Chars(range) if range.start.line == range.end.line => {
                let mut keys = op.keys();
                keys.extend(digits((range.end.col - range.start.col).max(1)));
                keys.push(Key::Char('l'));
                self.replay.dot_rewrite(keys, None);
            }
            Extent::Chars(_) | Extent::Empty(_) => {
                let mut keys = self.reselect_keys(extent);
                // Visual mode takes the bare operator key.
                keys.push(Key::Char(op.line_char()));
                self.replay.dot_rewrite(keys, None);
            }
        }
    }

    // -- Operators --------------------------------------------------------------

    fn visual_operator(&mut self, op: Operator, linewise: bool) {
        let extent = self.visual_extent(linewise);
        if op != Operator::Yank {
            self.record_visual_operator(op, extent);
        }
        self.exit_visual();
        let origin = extent.start();
        self.apply_operator(op, extent, origin);
    }

    fn visual_shift(&mut self, right: bool, times: usize) {
        let extent = self.visual_extent(true);
        let (first, last) = extent.line_span();
        let op = if right { Operator::ShiftRight } else { Operator::ShiftLeft };
        if times == 1 {
            self.record_visual_operator(op, extent);
        } else {
            let mut keys = self.reselect_keys(extent);
            keys.extend(digits(times));
            keys.push(Key::Char(op.line_char()));
            self.replay.dot_rewrite(keys, None);
        }
        self.exit_visual();
        self.shift_lines(first, last, right, times, Position::new(first, 0));
    }

    fn visual_join(&mut self, spaces: bool) {
        let (first, last) = self.visual_extent(true).line_span();
        let count = (last - first + 1).max(2);
        let keys = if spaces {
            vec![Key::Char('J')]
        } else {
            vec![Key::Char('g'), Key::Char('J')]
        };
        self.replay.dot_rewrite(keys, Some(count));
        self.exit_visual();
        self.cursor.set(Position::new(first, 0), &self.buffer);
        self.join(count, spaces);
    }

    fn visual_replace_key(&mut self, key: Key) {
        let Some(ch) = target_char(key) else {
            return;
        };
        let extent = self.visual_extent(false);
        let spans: Vec<(usize, usize, usize)> = match extent {
            Extent::Lines { first, last } => (first..=last)
                .map(|line| (line, 0, self.buffer.line_len(line)))
                .collect(),
            Extent::Chars(range) => (range.start.line..=range.end.line)
                .map(|line| {
                    let from = if line == range.start.line { range.start.col } else { 0 };
                    let to = if line == range.end.line {
                        range.end.col
                    } else {
                        self.buffer.line_len(line)
                    };
                    (line, from, to)
                })
                .filter(|&(_, from, to)| from < to)
                .collect(),
            Extent::Empty(_) => Vec::new(),
        };
        let mut keys = match extent {
            Extent::Chars(range) if range.start.line == range.end.line => Vec::new(),
            _ => self.reselect_keys(extent),
        };
        let count = match extent {
            Extent::Chars(range) if range.start.line == range.end.line => {
                Some((range.end.col - range.start.col).max(1))
            }
            _ => None,
        };
        keys.push(Key::Char('r'));
        keys.push(Key::Char(ch));
        self.replay.dot_rewrite(keys, count);
        self.exit_visual();
        let start = extent.start();
        self.begin_change(start);
        for (line, from, to) in spans {
            let range = Range {
                start: Position::new(line, from),
                end: Position::new(line, to),
            };
            self.buffer.replace(range, &ch.to_string().repeat(to - from));
        }
        self.place_cursor(start, false);
    }

    /// Visual `p`: the selection is replaced by the register; the unnamed
    /// register gets the replaced text.
    fn visual_put(&mut self) {
        let Some(reg) = self.put_register() else {
            self.exit_visual();
            return;
        };
        self.replay.dot_cancel();
        let extent = self.visual_extent(false);
        let emptied =
            matches!(extent, Extent::Lines { first: 0, last } if last == self.buffer.last_line());
        self.exit_visual();
        let start = extent.start();
        self.begin_change(start);
        self.apply_operator(Operator::Delete, extent, start);
        match (extent, reg.kind()) {
            (Extent::Lines { first, .. }, _) => {
                let lines: Vec<&str> = reg.lines();
                self.put_lines(&lines, first, false);
                if emptied {
                    let leftover = lines.len();
                    self.buffer.remove_lines(leftover, leftover);
                }
            }
            (_, RegisterKind::Char) => self.put_chars(reg.text(), start, false),
            (_, RegisterKind::Line) => {
                self.buffer.insert(start, "\n");
                self.put_lines(&reg.lines(), start.line + 1, false);
            }
        }
    }

    fn visual_object_key(&mut self, inner: bool, count: Option<usize>, key: Key) {
        let Some(kind) = key.char().and_then(ObjectKind::from_char) else {
            return;
        };
        let pos = self.cursor.position();
        let count = count.unwrap_or(1);
        let Some(object) = text_object::resolve(&self.buffer, pos, kind, inner, count) else {
            self.replay.no_progress();
            return;
        };
        let Range { start, end } = object.range;
        if object.linewise {
            self.mode = Mode::VisualLine;
            self.cursor.set_anchor(Position::new(start.line, 0));
            self.cursor.set(Position::new(end.line, 0), &self.buffer);
            return;
        }
        if start == end {
            return;
        }
        let last = if end.col > 0 {
            end.with_col(end.col - 1)
        } else {
            let line = end.line - 1;
            Position::new(line, self.buffer.line_len(line))
        };
        self.mode = Mode::Visual;
        self.cursor.set_anchor(start);
        self.cursor.set(last, &self.buffer);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::engine::tests::{engine_with, feed, lines, p};
    use crate::mode::Mode;
    use crate::position::Range;

    // ── Selection ────────────────────────────────────────────────────────

    #[test]
    fn selection_is_reported_ordered() {
        let mut e = engine_with("abcdef");
        feed(&mut e, "3lvhh");
        let snap = e.snapshot();
        assert_eq!(snap.mode, Mode::Visual);
        assert_eq!(snap.selection, Some(Range::ordered(p(0, 1), p(0, 3))));
        feed(&mut e, "<Esc>");
        assert_eq!(e.snapshot().selection, None);
        assert_eq!(e.cursor(), p(0, 1));
    }

    #[test]
    fn o_swaps_ends() {
        let mut e = engine_with("abcdef");
        feed(&mut e, "vllo");
        assert_eq!(e.cursor(), p(0, 0));
        feed(&mut e, "hd");
        assert_eq!(lines(&e), vec!["def"]);
    }

    #[test]
    fn v_toggles_between_modes() {
        let mut e = engine_with("ab");
        feed(&mut e, "vV");
        assert_eq!(e.mode(), Mode::VisualLine);
        feed(&mut e, "v");
        assert_eq!(e.mode(), Mode::Visual);
        feed(&mut e, "v");
        assert_eq!(e.mode(), Mode::Normal);
    }

    #[test]
    fn dollar_in_visual_reaches_line_break() {
        let mut e = engine_with("ab\ncd");
        feed(&mut e, "v$d");
        assert_eq!(lines(&e), vec!["cd"]);
    }

    // ── Operators ────────────────────────────────────────────────────────

    #[test]
    fn charwise_delete_across_lines() {
        let mut e = engine_with("abc\ndef");
        feed(&mut e, "lvjd");
        assert_eq!(lines(&e), vec!["af"]);
        assert_eq!(e.cursor(), p(0, 1));
    }

    #[test]
    fn linewise_yank_and_delete() {
        let mut e = engine_with("a\nb\nc");
        feed(&mut e, "Vjy");
        assert_eq!(e.registers().unnamed().text(), "a\nb");
        assert_eq!(e.mode(), Mode::Normal);
        feed(&mut e, "jVd");
        assert_eq!(lines(&e), vec!["a", "c"]);
    }

    #[test]
    fn visual_change() {
        let mut e = engine_with("hello world");
        feed(&mut e, "vecHI<Esc>");
        assert_eq!(lines(&e), vec!["HI world"]);
        assert_eq!(e.mode(), Mode::Normal);
    }

    #[test]
    fn visual_case_and_replace() {
        let mut e = engine_with("abc def");
        feed(&mut e, "veU");
        assert_eq!(lines(&e), vec!["ABC def"]);
        feed(&mut e, "wvlrx");
        assert_eq!(lines(&e), vec!["ABC xxf"]);
        assert_eq!(e.cursor(), p(0, 4));
    }

    #[test]
    fn visual_shift_with_count() {
        let mut e = engine_with("a\nb");
        feed(&mut e, ":set sw=2 et<CR>Vj2>");
        assert_eq!(lines(&e), vec!["    a", "    b"]);
    }

    #[test]
    fn visual_join() {
        let mut e = engine_with("a\nb\nc");
        feed(&mut e, "VjjJ");
        assert_eq!(lines(&e), vec!["a b c"]);
    }

    #[test]
    fn visual_put_replaces_selection() {
        let mut e = engine_with("one two");
        feed(&mut e, "yiwwviwp");
        assert_eq!(lines(&e), vec!["one one"]);
        assert_eq!(e.registers().unnamed().text(), "two");
    }

    #[test]
    fn visual_line_put_over_whole_buffer() {
        let mut e = engine_with("a\nb");
        feed(&mut e, "yyjVp");
        assert_eq!(lines(&e), vec!["a", "a"]);
        feed(&mut e, "ggVGp");
        assert_eq!(lines(&e), vec!["b"]);
    }

    // ── Text objects ─────────────────────────────────────────────────────

    #[test]
    fn text_object_sets_selection() {
        let mut e = engine_with("call(arg one)");
        feed(&mut e, "fgva(");
        assert_eq!(e.snapshot().selection, Some(Range::ordered(p(0, 4), p(0, 12))));
        feed(&mut e, "d");
        assert_eq!(lines(&e), vec!["call"]);
    }

    #[test]
    fn paragraph_object_switches_to_linewise() {
        let mut e = engine_with("a\nb\n\nc");
        feed(&mut e, "vip");
        assert_eq!(e.mode(), Mode::VisualLine);
        feed(&mut e, "d");
        assert_eq!(lines(&e), vec!["", "c"]);
    }

    // ── Reselect, marks, repeat ──────────────────────────────────────────

    #[test]
    fn gv_restores_last_selection() {
        let mut e = engine_with("abcdef");
        feed(&mut e, "lvl<Esc>0gv");
        assert_eq!(e.mode(), Mode::Visual);
        assert_eq!(e.snapshot().selection, Some(Range::ordered(p(0, 1), p(0, 2))));
    }

    #[test]
    fn visual_marks_feed_ex_range() {
        let mut e = engine_with("c\nb\na\nz");
        feed(&mut e, "Vjj:");
        assert_eq!(e.snapshot().cmdline, Some(":'<,'>".to_string()));
        feed(&mut e, "sort<CR>");
        assert_eq!(lines(&e), vec!["a", "b", "c", "z"]);
    }

    #[test]
    fn dot_repeats_linewise_visual_delete() {
        let mut e = engine_with("1\n2\n3\n4\n5");
        feed(&mut e, "Vjd.");
        assert_eq!(lines(&e), vec!["5"]);
    }

    #[test]
    fn dot_repeats_charwise_visual_delete() {
        let mut e = engine_with("abcdefgh");
        feed(&mut e, "vld.");
        assert_eq!(lines(&e), vec!["efgh"]);
    }

    #[test]
    fn dot_repeats_multiline_visual_change() {
        let mut e = engine_with("abc\ndef\nghi\njkl");
        feed(&mut e, "lvjcX<Esc>");
        assert_eq!(lines(&e), vec!["aXf", "ghi", "jkl"]);
        feed(&mut e, "j0.");
        assert_eq!(lines(&e), vec!["aXf", "Xl"]);
    }
}
