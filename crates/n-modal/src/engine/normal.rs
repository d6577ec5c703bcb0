//! Normal mode: counts, commands, and the multi-key states that complete
//! them.

use tracing::info;

use super::Engine;
use super::insert::InsertRepeat;
use crate::key::{self, Key};
use crate::mode::Mode;
use crate::motion::{self, FindKind, Motion, MotionResult, Vcol};
use crate::operator::{self, Extent, Operator};
use crate::pending::{Pending, PendingOp};
use crate::position::Position;
use crate::register::{self, RegisterKind};
use crate::replay::{Frame, merge_counts};
use crate::search::SearchDirection;
use crate::text_object::{self, ObjectKind};

/// The motion a key stands for in Normal, Visual and operator-pending
/// contexts.
pub(super) fn key_motion(key: Key) -> Option<Motion> {
    match key {
        Key::Char(c) => Motion::from_char(c),
        Key::Left => Some(Motion::Left),
        Key::Right => Some(Motion::Right),
        Key::Up | Key::Ctrl('p') => Some(Motion::Up),
        Key::Down | Key::Ctrl('n' | 'j') => Some(Motion::Down),
        Key::Home => Some(Motion::LineStart),
        Key::End => Some(Motion::LineEnd),
        Key::Backspace | Key::Ctrl('h') => Some(Motion::LeftWrap),
        Key::Enter | Key::Ctrl('m') => Some(Motion::NextLineStart),
        _ => None,
    }
}

/// Target char of `f`, `r` and friends.
pub(super) const fn target_char(key: Key) -> Option<char> {
    match key {
        Key::Char(c) => Some(c),
        Key::Tab => Some('\t'),
        _ => None,
    }
}

const fn is_cancel(key: Key) -> bool {
    matches!(key, Key::Escape | Key::Ctrl('c' | '['))
}

impl Engine {
    /// Extend the count with a digit. `0` only counts after another digit.
    pub(super) fn push_count_digit(&mut self, key: Key) -> bool {
        let Some(digit) = key.char().and_then(|c| c.to_digit(10)) else {
            return false;
        };
        if digit == 0 && self.count.is_none() {
            return false;
        }
        let count = self.count.unwrap_or(0);
        self.count = Some(count.saturating_mul(10).saturating_add(digit as usize));
        true
    }

    pub(super) fn modal_key(&mut self, key: Key) {
        let pending = std::mem::take(&mut self.pending);
        if pending == Pending::Register {
            match key.char().filter(|&c| register::is_valid_name(c)) {
                Some(name) => self.register = Some(name),
                None => self.reset_pending(),
            }
            return;
        }
        if self.mode.is_visual() {
            self.visual_key(pending, key);
        } else {
            self.normal_key(pending, key);
        }
        if self.pending.is_idle() && self.mode == Mode::Normal {
            self.count = None;
            self.register = None;
        }
    }

    fn normal_key(&mut self, pending: Pending, key: Key) {
        match pending {
            Pending::Idle => self.normal_command(key),
            Pending::Operator(op) => self.operator_key(op, key),
            Pending::OperatorG(op) => self.operator_g_key(op, key),
            Pending::TextObject { op, inner } => self.operator_object(op, inner, key),
            Pending::FindChar { kind, op, count } => self.find_char_key(kind, op, count, key),
            Pending::G { count } => self.g_key(count, key),
            Pending::Scroll { count } => self.scroll_key(count, key),
            Pending::Z => self.z_key(key),
            Pending::SetMark => self.set_mark_key(key),
            Pending::GotoMark { exact, op } => self.goto_mark_key(exact, op, key),
            Pending::MacroRecord => self.macro_record_key(key),
            Pending::MacroPlay { count } => self.macro_play_key(count, key),
            Pending::ReplaceChar { count } => self.replace_char_key(count, key),
            Pending::Register
            | Pending::VisualReplace
            | Pending::VisualTextObject { .. }
            | Pending::AwaitingSearch(_) => self.reset_pending(),
        }
    }

    fn normal_command(&mut self, key: Key) {
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
            Key::Char(c) => self.normal_char(c, count),
            Key::Ctrl('r') => self.redo(n),
            Key::Ctrl('o') => self.jump_back(n),
            Key::Tab | Key::Ctrl('i') => self.jump_forward(n),
            Key::Ctrl('a') => self.increment(n, true),
            Key::Ctrl('x') => self.increment(n, false),
            Key::Delete => self.delete_chars(n),
            _ => self.reset_pending(),
        }
    }

    fn normal_char(&mut self, c: char, count: Option<usize>) {
        let n = count.unwrap_or(1);
        if let Some(op) = Operator::from_char(c) {
            self.pending = Pending::Operator(PendingOp { op, count });
            return;
        }
        if let Some(kind) = FindKind::from_char(c) {
            self.pending = Pending::FindChar {
                kind,
                op: None,
                count,
            };
            return;
        }
        match c {
            ';' | ',' => self.repeat_find(c == ',', count, None),
            'g' => self.pending = Pending::G { count },
            'z' => self.pending = Pending::Scroll { count },
            'Z' => self.pending = Pending::Z,
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
            'q' => {
                self.replay.dot_cancel();
                if self.replay.recording().is_some() {
                    self.finish_recording();
                } else {
                    self.pending = Pending::MacroRecord;
                }
            }
            '@' => self.pending = Pending::MacroPlay { count: n },
            'r' => self.pending = Pending::ReplaceChar { count: n },
            'x' => self.delete_chars(n),
            'X' => self.delete_chars_before(n),
            's' => self.substitute(n),
            'S' => self.line_operator(Operator::Change, n),
            'Y' => self.line_operator(Operator::Yank, n),
            'D' | 'C' => {
                let op = if c == 'D' { Operator::Delete } else { Operator::Change };
                self.operator_motion(PendingOp { op, count: None }, Motion::LineEnd, count);
            }
            'p' | 'P' => self.put(c == 'p', false, n),
            'J' => self.join(n, true),
            '~' => self.toggle_case_chars(n),
            'u' => self.undo(n),
            '.' => self.repeat_change(count),
            'i' => self.start_insert(n, InsertRepeat::Plain),
            'a' => {
                let pos = self.cursor.position();
                if !self.buffer.is_empty_line(pos.line) {
                    self.cursor.set(pos.with_col(pos.col + 1), &self.buffer);
                }
                self.start_insert(n, InsertRepeat::Plain);
            }
            'I' => {
                let line = self.cursor.line();
                let col = self
                    .buffer
                    .first_non_blank(line)
                    .unwrap_or_else(|| self.buffer.line_len(line));
                self.cursor.set(Position::new(line, col), &self.buffer);
                self.start_insert(n, InsertRepeat::Plain);
            }
            'A' => {
                let line = self.cursor.line();
                self.cursor.set(Position::new(line, self.buffer.line_len(line)), &self.buffer);
                self.start_insert(n, InsertRepeat::Plain);
            }
            'o' | 'O' => self.open_line(c == 'o', n),
            'R' => self.start_replace(n),
            'v' => self.enter_visual(Mode::Visual),
            'V' => self.enter_visual(Mode::VisualLine),
            ':' => {
                self.replay.dot_cancel();
                self.open_ex(count);
            }
            '/' => self.open_search(SearchDirection::Forward, n),
            '?' => self.open_search(SearchDirection::Backward, n),
            'n' | 'N' => self.search_next(c == 'N', n),
            '*' => self.search_word(SearchDirection::Forward, n),
            '#' => self.search_word(SearchDirection::Backward, n),
            _ => self.reset_pending(),
        }
    }

    // -- Motions --------------------------------------------------------------

    /// Run a cursor motion. Returns false if it failed.
    pub(super) fn motion_command(&mut self, motion: Motion, count: Option<usize>) -> bool {
        let ctx = self.motion_context(false, count.is_some());
        let result = motion::resolve(&self.buffer, &self.cursor, motion, count.unwrap_or(1), ctx);
        if !result.moved && motion.fails_in_place() {
            self.replay.no_progress();
            return false;
        }
        if motion.is_jump() && result.moved {
            self.push_jump();
        }
        self.land(&result);
        true
    }

    fn find_char_key(
        &mut self,
        kind: FindKind,
        op: Option<PendingOp>,
        count: Option<usize>,
        key: Key,
    ) {
        let Some(ch) = target_char(key) else {
            self.reset_pending();
            return;
        };
        self.last_find = Some((kind, ch));
        let motion = Motion::Find {
            kind,
            ch,
            repeat: false,
        };
        match op {
            Some(op) => self.operator_motion(op, motion, count),
            None => {
                self.motion_command(motion, count);
            }
        }
    }

    /// `;` and `,`.
    pub(super) fn repeat_find(
        &mut self,
        reverse: bool,
        count: Option<usize>,
        op: Option<PendingOp>,
    ) {
        let Some((kind, ch)) = self.last_find else {
            self.fail();
            return;
        };
        let kind = if reverse { kind.opposite() } else { kind };
        let motion = Motion::Find {
            kind,
            ch,
            repeat: true,
        };
        match op {
            Some(op) => self.operator_motion(op, motion, count),
            None => {
                self.motion_command(motion, count);
            }
        }
    }

    // -- Operators ------------------------------------------------------------

    fn operator_key(&mut self, op: PendingOp, key: Key) {
        if key == Key::Char(op.op.line_char()) {
            let motion_count = self.count.take();
            self.replay.dot_merge_count(motion_count);
            self.line_operator(op.op, merge_counts(op.count, motion_count).unwrap_or(1));
            return;
        }
        if let Some(kind) = key.char().and_then(FindKind::from_char) {
            self.pending = Pending::FindChar {
                kind,
                op: Some(op),
                count: self.count.take(),
            };
            return;
        }
        match key {
            Key::Char('g') => self.pending = Pending::OperatorG(op),
            Key::Char(c @ ('i' | 'a')) => {
                self.pending = Pending::TextObject { op, inner: c == 'i' };
            }
            Key::Char(c @ ('\'' | '`')) => {
                self.pending = Pending::GotoMark {
                    exact: c == '`',
                    op: Some(op),
                };
            }
            Key::Char('/') => self.open_operator_search(op, SearchDirection::Forward),
            Key::Char('?') => self.open_operator_search(op, SearchDirection::Backward),
            Key::Char(c @ (';' | ',')) => {
                let count = self.count.take();
                self.repeat_find(c == ',', count, Some(op));
            }
            Key::Char(c @ ('n' | 'N')) => {
                let count = self.count.take();
                self.operator_search_next(op, c == 'N', count);
            }
            _ if is_cancel(key) => self.reset_pending(),
            _ => match key_motion(key) {
                Some(motion) => {
                    let count = self.count.take();
                    self.operator_motion(op, motion, count);
                }
                None => self.reset_pending(),
            },
        }
    }

    fn operator_g_key(&mut self, op: PendingOp, key: Key) {
        let Some(c) = key.char() else {
            self.reset_pending();
            return;
        };
        if op.op.is_case() && c == op.op.line_char() {
            let motion_count = self.count.take();
            self.replay.dot_merge_count(motion_count);
            self.line_operator(op.op, merge_counts(op.count, motion_count).unwrap_or(1));
            return;
        }
        match Motion::from_g_char(c) {
            Some(motion) => {
                let count = self.count.take();
                self.operator_motion(op, motion, count);
            }
            None => self.reset_pending(),
        }
    }

    /// Apply `op` over `motion`. `motion_count` is the count typed after the
    /// operator.
    pub(super) fn operator_motion(
        &mut self,
        op: PendingOp,
        motion: Motion,
        motion_count: Option<usize>,
    ) {
        self.replay.dot_merge_count(motion_count);
        let count = merge_counts(op.count, motion_count);
        let n = count.unwrap_or(1);
        let from = self.cursor.position();

        if op.op == Operator::Change
            && matches!(motion, Motion::WordStart { .. })
            && self.buffer.is_empty_line(from.line)
        {
            self.apply_operator(op.op, Extent::Empty(from), from);
            return;
        }
        let result = match motion {
            Motion::WordStart { big } if op.op == Operator::Change => {
                self.change_word_motion(from, n, big)
            }
            _ => {
                let ctx = self.motion_context(true, count.is_some());
                motion::resolve(&self.buffer, &self.cursor, motion, n, ctx)
            }
        };
        if !result.moved && motion.fails_in_place() {
            self.fail();
            return;
        }
        let extent = operator::extent(&self.buffer, op.op, from, &result);
        self.apply_operator(op.op, extent, from);
    }

    /// `cw` on a word changes to its end, not up to the next word.
    fn change_word_motion(&self, from: Position, count: usize, big: bool) -> MotionResult {
        let on_text = self.buffer.char_at(from).is_some_and(|c| !c.is_whitespace());
        if on_text {
            return MotionResult {
                pos: motion::change_word_end(&self.buffer, from, count, big),
                inclusive: true,
                linewise: false,
                exclusive: false,
                moved: true,
                vcol: Vcol::Recompute,
            };
        }
        let ctx = self.motion_context(true, true);
        motion::resolve(&self.buffer, &self.cursor, Motion::WordStart { big }, count, ctx)
    }

    /// `dd`, `yy`, `>>`, `S`: `count` lines from the cursor down.
    pub(super) fn line_operator(&mut self, op: Operator, count: usize) {
        let first = self.cursor.line();
        let last = (first + count.max(1) - 1).min(self.buffer.last_line());
        let origin = self.cursor.position();
        self.apply_operator(op, Extent::Lines { first, last }, origin);
    }

    fn operator_object(&mut self, op: PendingOp, inner: bool, key: Key) {
        let Some(kind) = key.char().and_then(ObjectKind::from_char) else {
            self.reset_pending();
            return;
        };
        let motion_count = self.count.take();
        self.replay.dot_merge_count(motion_count);
        let count = merge_counts(op.count, motion_count).unwrap_or(1);
        let from = self.cursor.position();
        match text_object::resolve(&self.buffer, from, kind, inner, count) {
            Some(object) => self.apply_operator(op.op, Extent::from_object(object), from),
            None => self.fail(),
        }
    }

    // -- g, z, Z, marks --------------------------------------------------------

    fn g_key(&mut self, count: Option<usize>, key: Key) {
        let Some(c) = key.char() else {
            self.reset_pending();
            return;
        };
        let n = count.unwrap_or(1);
        if let Some(op) = Operator::from_g_char(c) {
            self.pending = Pending::Operator(PendingOp { op, count });
            return;
        }
        if let Some(motion) = Motion::from_g_char(c) {
            self.motion_command(motion, count);
            return;
        }
        match c {
            'J' => self.join(n, false),
            'p' | 'P' => self.put(c == 'p', true, n),
            'v' => self.reselect_visual(),
            'I' => {
                let line = self.cursor.line();
                self.cursor.set(Position::new(line, 0), &self.buffer);
                self.start_insert(n, InsertRepeat::Plain);
            }
            ';' => self.change_back(n),
            ',' => self.change_forward(n),
            _ => self.reset_pending(),
        }
    }

    /// `ZZ` and `ZQ` go to the host.
    fn z_key(&mut self, key: Key) {
        match key {
            Key::Char(c @ ('Z' | 'Q')) => {
                let command = format!("Z{c}");
                info!(target: "engine.ex", command = %command, "host command");
                self.host_commands.push(command);
            }
            _ => self.reset_pending(),
        }
    }

    fn set_mark_key(&mut self, key: Key) {
        let pos = self.cursor.position();
        if !key.char().is_some_and(|name| self.marks.set(name, pos)) {
            self.reset_pending();
        }
    }

    /// `'x` goes to the mark's line (first non-blank, linewise), `` `x `` to
    /// its exact position.
    pub(super) fn goto_mark_key(&mut self, exact: bool, op: Option<PendingOp>, key: Key) {
        let Some(name) = key.char() else {
            self.reset_pending();
            return;
        };
        let target = match self.marks.get(name) {
            Ok(pos) => self.buffer.clamp(pos, false),
            Err(err) => {
                self.report(&err);
                self.fail();
                return;
            }
        };
        let from = self.cursor.position();
        let result = if exact {
            MotionResult {
                pos: target,
                inclusive: false,
                linewise: false,
                exclusive: false,
                moved: target != from,
                vcol: Vcol::Recompute,
            }
        } else {
            let pos = Position::new(target.line, self.first_non_blank_col(target.line));
            MotionResult {
                pos,
                inclusive: false,
                linewise: true,
                exclusive: false,
                moved: pos != from,
                vcol: Vcol::Recompute,
            }
        };
        match op {
            Some(op) => {
                let extent = operator::extent(&self.buffer, op.op, from, &result);
                self.apply_operator(op.op, extent, from);
            }
            None => {
                self.push_jump();
                self.land(&result);
            }
        }
    }

    // -- Macros and repeat ----------------------------------------------------

    fn macro_record_key(&mut self, key: Key) {
        if !key.char().is_some_and(|name| self.replay.start_recording(name)) {
            self.reset_pending();
        }
    }

    /// The closing `q`: the keys go into the register as key notation.
    pub(super) fn finish_recording(&mut self) {
        if let Some((name, keys)) = self.replay.stop_recording() {
            self.registers.record_macro(name, &key::to_notation(&keys));
        }
    }

    fn macro_play_key(&mut self, count: usize, key: Key) {
        match key.char() {
            Some(name) => self.play_macro(name, count),
            None => self.reset_pending(),
        }
    }

    /// `@x`: run register `x` as typed keys, `count` times. A failed
    /// motion inside stops the rest of the playback.
    fn play_macro(&mut self, name: char, count: usize) {
        self.replay.dot_cancel();
        self.command_tick = None;
        let Some(keys) = self.macro_keys(name) else {
            self.reset_pending();
            return;
        };
        info!(target: "engine.replay", register = %name, keys = keys.len(), count, "play macro");
        self.replay.push_frame(Frame::macro_frame(name));
        'play: for _ in 0..count {
            for &key in &keys {
                self.handle_key(key);
                if self.replay.aborted() {
                    break 'play;
                }
            }
        }
        if self.replay.aborted() {
            self.pending = Pending::Idle;
        }
        self.replay.pop_frame();
    }

    /// Keys stored in the register `@{name}` plays. A linewise register
    /// ends in a newline, which runs as `<CR>` like any other.
    fn macro_keys(&mut self, name: char) -> Option<Vec<Key>> {
        let name = self.replay.macro_register(name)?;
        let reg = self.registers.read((name != '"').then_some(name)).ok()?;
        let mut text = reg.text().to_string();
        if reg.kind() == RegisterKind::Line {
            text.push('\n');
        }
        let keys = key::parse_keys(&text)
            .into_iter()
            .map(|key| if key == Key::Char('\n') { Key::Enter } else { key })
            .collect();
        Some(keys)
    }

    /// `.`: replay the last change. A count replaces the stored one.
    fn repeat_change(&mut self, count: Option<usize>) {
        self.replay.dot_cancel();
        self.command_tick = None;
        let Some(change) = self.replay.last_change().cloned() else {
            return;
        };
        self.replay.push_frame(Frame::dot());
        self.count = count.or(change.count);
        self.register = change.register;
        for &key in &change.keys {
            self.handle_key(key);
        }
        self.replay.pop_frame();
    }

    fn replace_char_key(&mut self, count: usize, key: Key) {
        match key {
            Key::Enter | Key::Ctrl('m' | 'j') => self.replace_with_newline(count),
            _ => match target_char(key) {
                Some(ch) => self.replace_chars(ch, count),
                None => self.reset_pending(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::engine::tests::{engine_with, feed, lines, p};
    use crate::mode::Mode;

    // ── Motions ──────────────────────────────────────────────────────────

    #[test]
    fn hjkl_move_and_keep_column() {
        let mut e = engine_with("abcdef\nab\nabcdef");
        feed(&mut e, "4l");
        assert_eq!(e.cursor(), p(0, 4));
        feed(&mut e, "j");
        assert_eq!(e.cursor(), p(1, 1));
        feed(&mut e, "j");
        assert_eq!(e.cursor(), p(2, 4));
        feed(&mut e, "h");
        assert_eq!(e.cursor(), p(2, 3));
    }

    #[test]
    fn dollar_sticks_to_line_end() {
        let mut e = engine_with("abc\nabcdef\nx");
        feed(&mut e, "$j");
        assert_eq!(e.cursor(), p(1, 5));
        feed(&mut e, "j");
        assert_eq!(e.cursor(), p(2, 0));
    }

    #[test]
    fn word_motions() {
        let mut e = engine_with("foo bar.baz qux");
        feed(&mut e, "w");
        assert_eq!(e.cursor(), p(0, 4));
        feed(&mut e, "w");
        assert_eq!(e.cursor(), p(0, 7));
        feed(&mut e, "W");
        assert_eq!(e.cursor(), p(0, 12));
        feed(&mut e, "b");
        assert_eq!(e.cursor(), p(0, 8));
        feed(&mut e, "e");
        assert_eq!(e.cursor(), p(0, 10));
    }

    #[test]
    fn gg_and_g_with_counts() {
        let mut e = engine_with("a\nb\nc\nd");
        feed(&mut e, "G");
        assert_eq!(e.cursor(), p(3, 0));
        feed(&mut e, "2gg");
        assert_eq!(e.cursor(), p(1, 0));
        feed(&mut e, "3G");
        assert_eq!(e.cursor(), p(2, 0));
        feed(&mut e, "gg");
        assert_eq!(e.cursor(), p(0, 0));
    }

    // ── Find ─────────────────────────────────────────────────────────────

    #[test]
    fn find_and_repeat() {
        let mut e = engine_with("a,b,c,d");
        feed(&mut e, "f,");
        assert_eq!(e.cursor(), p(0, 1));
        feed(&mut e, ";");
        assert_eq!(e.cursor(), p(0, 3));
        feed(&mut e, ",");
        assert_eq!(e.cursor(), p(0, 1));
        feed(&mut e, "2;");
        assert_eq!(e.cursor(), p(0, 5));
    }

    #[test]
    fn till_repeat_skips_adjacent_target() {
        let mut e = engine_with("a,b,c");
        feed(&mut e, "t,");
        assert_eq!(e.cursor(), p(0, 0));
        feed(&mut e, ";");
        assert_eq!(e.cursor(), p(0, 2));
    }

    #[test]
    fn delete_to_char() {
        let mut e = engine_with("one two three");
        feed(&mut e, "dft");
        assert_eq!(lines(&e), vec!["wo three"]);
        feed(&mut e, "dt ");
        assert_eq!(lines(&e), vec![" three"]);
    }

    // ── Operators ────────────────────────────────────────────────────────

    #[test]
    fn dd_with_count_and_cursor_on_first_non_blank() {
        let mut e = engine_with("a\nb\n  c\nd");
        feed(&mut e, "2dd");
        assert_eq!(lines(&e), vec!["  c", "d"]);
        assert_eq!(e.cursor(), p(0, 2));
    }

    #[test]
    fn dd_on_last_line_moves_up() {
        let mut e = engine_with("a\nb");
        feed(&mut e, "jdd");
        assert_eq!(lines(&e), vec!["a"]);
        assert_eq!(e.cursor(), p(0, 0));
    }

    #[test]
    fn capital_d_and_c() {
        let mut e = engine_with("hello world");
        feed(&mut e, "wD");
        assert_eq!(lines(&e), vec!["hello "]);
        assert_eq!(e.cursor(), p(0, 5));
        feed(&mut e, "0Cbye<Esc>");
        assert_eq!(lines(&e), vec!["bye"]);
    }

    #[test]
    fn cw_stops_at_word_end() {
        let mut e = engine_with("foo bar baz");
        feed(&mut e, "cwX<Esc>");
        assert_eq!(lines(&e), vec!["X bar baz"]);
        feed(&mut e, "w2cwY<Esc>");
        assert_eq!(lines(&e), vec!["X Y"]);
    }

    #[test]
    fn cw_on_empty_line_just_inserts() {
        let mut e = engine_with("\nx");
        feed(&mut e, "cwab<Esc>");
        assert_eq!(lines(&e), vec!["ab", "x"]);
    }

    #[test]
    fn yank_and_put_lines() {
        let mut e = engine_with("one\ntwo");
        feed(&mut e, "yyjp");
        assert_eq!(lines(&e), vec!["one", "two", "one"]);
        assert_eq!(e.cursor(), p(2, 0));
        feed(&mut e, "ggP");
        assert_eq!(lines(&e), vec!["one", "one", "two", "one"]);
        assert_eq!(e.cursor(), p(0, 0));
    }

    #[test]
    fn named_register_holds_its_own_text() {
        let mut e = engine_with("alpha beta");
        feed(&mut e, "\"ayiwwdiw\"ap");
        assert_eq!(lines(&e), vec!["alpha alpha"]);
        assert_eq!(e.registers().unnamed().text(), "beta");
    }

    #[test]
    fn put_from_empty_named_register_reports() {
        let mut e = engine_with("abc");
        feed(&mut e, "\"qp");
        assert_eq!(lines(&e), vec!["abc"]);
        assert_eq!(e.snapshot().status, "E353: Nothing in register q");
    }

    #[test]
    fn case_operators() {
        let mut e = engine_with("hello world");
        feed(&mut e, "gUiw");
        assert_eq!(lines(&e), vec!["HELLO world"]);
        feed(&mut e, "g~~");
        assert_eq!(lines(&e), vec!["hello WORLD"]);
        feed(&mut e, "guu");
        assert_eq!(lines(&e), vec!["hello world"]);
        feed(&mut e, "gUgU");
        assert_eq!(lines(&e), vec!["HELLO WORLD"]);
    }

    #[test]
    fn shift_lines() {
        let mut e = engine_with("a\nb");
        feed(&mut e, ">j");
        assert_eq!(lines(&e), vec!["\ta", "\tb"]);
        assert_eq!(e.cursor(), p(0, 1));
        feed(&mut e, "<<");
        assert_eq!(lines(&e), vec!["a", "\tb"]);
    }

    #[test]
    fn escape_cancels_operator() {
        let mut e = engine_with("abc def");
        feed(&mut e, "d<Esc>w");
        assert_eq!(lines(&e), vec!["abc def"]);
        assert_eq!(e.cursor(), p(0, 4));
    }

    // ── Marks ────────────────────────────────────────────────────────────

    #[test]
    fn marks_and_context_mark() {
        let mut e = engine_with("one\n  two\nthree");
        feed(&mut e, "jllmaG'a");
        assert_eq!(e.cursor(), p(1, 2));
        feed(&mut e, "gg`a");
        assert_eq!(e.cursor(), p(1, 2));
        feed(&mut e, "``");
        assert_eq!(e.cursor(), p(0, 0));
    }

    #[test]
    fn missing_mark_reports() {
        let mut e = engine_with("abc");
        feed(&mut e, "'b");
        assert_eq!(e.snapshot().status, "E20: Mark not set");
    }

    #[test]
    fn delete_to_mark_is_linewise() {
        let mut e = engine_with("a\nb\nc\nd");
        feed(&mut e, "majjd'a");
        assert_eq!(lines(&e), vec!["d"]);
    }

    // ── Macros ───────────────────────────────────────────────────────────

    #[test]
    fn macro_records_and_replays() {
        let mut e = engine_with("a\nb\nc\nd");
        feed(&mut e, "qaddq");
        assert_eq!(lines(&e), vec!["b", "c", "d"]);
        feed(&mut e, "2@a");
        assert_eq!(lines(&e), vec!["d"]);
        feed(&mut e, "@@");
        assert_eq!(lines(&e), vec![""]);
    }

    #[test]
    fn recording_shows_in_status() {
        let mut e = engine_with("a");
        feed(&mut e, "qb");
        let snap = e.snapshot();
        assert_eq!(snap.recording, Some('b'));
        assert_eq!(snap.status, "recording @b");
        feed(&mut e, "q");
        assert_eq!(e.snapshot().recording, None);
    }

    #[test]
    fn failing_motion_stops_macro() {
        let mut e = engine_with("x1\nx2\nx3");
        feed(&mut e, "qa0xjq");
        feed(&mut e, "5@a");
        assert_eq!(lines(&e), vec!["1", "2", "3"]);
        assert_eq!(e.mode(), Mode::Normal);
    }

    #[test]
    fn uppercase_register_appends_to_macro() {
        let mut e = engine_with("abcdef");
        feed(&mut e, "qaxqqAxq");
        assert_eq!(lines(&e), vec!["cdef"]);
        feed(&mut e, "@a");
        assert_eq!(lines(&e), vec!["ef"]);
    }

    #[test]
    fn recorded_macro_lands_in_register() {
        let mut e = engine_with("x");
        feed(&mut e, "qaAy<Esc>q");
        assert_eq!(lines(&e), vec!["xy"]);
        feed(&mut e, "\"ap");
        assert_eq!(lines(&e), vec!["xyAy<Esc>"]);
        assert_eq!(e.snapshot().status, "");
    }

    #[test]
    fn yanked_text_plays_as_macro() {
        let mut e = engine_with("lx\nabc");
        feed(&mut e, "\"ay$j@a");
        assert_eq!(lines(&e), vec!["lx", "ac"]);
    }

    #[test]
    fn linewise_register_plays_trailing_enter() {
        let mut e = engine_with("x\nab\ncd");
        feed(&mut e, "\"ayyj@a");
        assert_eq!(lines(&e), vec!["x", "b", "cd"]);
        assert_eq!(e.cursor(), p(2, 0));
    }

    #[test]
    fn empty_register_plays_nothing() {
        let mut e = engine_with("abc");
        feed(&mut e, "@zx");
        assert_eq!(lines(&e), vec!["bc"]);
    }

    // ── Dot repeat ───────────────────────────────────────────────────────

    #[test]
    fn dot_repeats_delete_with_count() {
        let mut e = engine_with("a b c d e f");
        feed(&mut e, "d2w.");
        assert_eq!(lines(&e), vec!["e f"]);
    }

    #[test]
    fn dot_count_overrides() {
        let mut e = engine_with("abcdefgh");
        feed(&mut e, "2x3.");
        assert_eq!(lines(&e), vec!["fgh"]);
    }

    #[test]
    fn dot_repeats_insert() {
        let mut e = engine_with("x");
        feed(&mut e, "Aab<Esc>.");
        assert_eq!(lines(&e), vec!["xabab"]);
    }

    #[test]
    fn dot_ignores_motions_and_yanks() {
        let mut e = engine_with("abcdef");
        feed(&mut e, "xlyl.");
        assert_eq!(lines(&e), vec!["bdef"]);
    }

    #[test]
    fn dot_repeats_change_inner_word() {
        let mut e = engine_with("foo bar");
        feed(&mut e, "ciwX<Esc>w.");
        assert_eq!(lines(&e), vec!["X X"]);
    }

    #[test]
    fn dot_repeats_find_delete() {
        let mut e = engine_with("a-b-c-d");
        feed(&mut e, "df-.");
        assert_eq!(lines(&e), vec!["c-d"]);
    }

    #[test]
    fn dot_uses_recorded_register() {
        let mut e = engine_with("one\ntwo\nthree");
        feed(&mut e, "\"add.");
        assert_eq!(lines(&e), vec!["three"]);
        let text = e.registers().read(Some('a')).map(|r| r.text().to_string());
        assert_eq!(text, Ok("two".to_string()));
    }

    // ── Replace, join, case ──────────────────────────────────────────────

    #[test]
    fn replace_char_with_count() {
        let mut e = engine_with("abcd");
        feed(&mut e, "3rx");
        assert_eq!(lines(&e), vec!["xxxd"]);
        assert_eq!(e.cursor(), p(0, 2));
        feed(&mut e, "5ry");
        assert_eq!(lines(&e), vec!["xxxd"]);
    }

    #[test]
    fn replace_with_enter_splits_line() {
        let mut e = engine_with("ab cd");
        feed(&mut e, "llr<CR>");
        assert_eq!(lines(&e), vec!["ab", "cd"]);
        assert_eq!(e.cursor(), p(1, 0));
    }

    #[test]
    fn join_lines() {
        let mut e = engine_with("a\n  b\n)c\n");
        feed(&mut e, "3J");
        assert_eq!(lines(&e), vec!["a b)c"]);
        assert_eq!(e.cursor(), p(0, 3));
    }

    #[test]
    fn join_without_spaces() {
        let mut e = engine_with("a\n  b");
        feed(&mut e, "gJ");
        assert_eq!(lines(&e), vec!["a  b"]);
    }

    #[test]
    fn tilde_toggles_and_advances() {
        let mut e = engine_with("abC");
        feed(&mut e, "~");
        assert_eq!(lines(&e), vec!["AbC"]);
        assert_eq!(e.cursor(), p(0, 1));
        feed(&mut e, "5~");
        assert_eq!(lines(&e), vec!["ABc"]);
        assert_eq!(e.cursor(), p(0, 2));
    }

    #[test]
    fn zz_goes_to_host() {
        let mut e = engine_with("x");
        feed(&mut e, "ZQ");
        assert_eq!(e.take_host_commands(), vec!["ZQ".to_string()]);
    }
}
