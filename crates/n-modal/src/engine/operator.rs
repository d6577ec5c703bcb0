//! Operators applied to their extent.

use tracing::trace;

use super::Engine;
use super::insert::InsertRepeat;
use crate::cursor::{TAB_WIDTH, display_width};
use crate::operator::{Extent, Operator};
use crate::pending::Pending;
use crate::position::{Position, Range};
use crate::register::RegisterKind;

/// Changes spanning more lines than this are reported (Vim's `report`).
pub(super) const REPORT: usize = 2;

/// Leading whitespace reaching screen column `width`.
pub(super) fn make_indent(width: usize, expandtab: bool) -> String {
    if expandtab {
        " ".repeat(width)
    } else {
        let mut indent = "\t".repeat(width / TAB_WIDTH);
        indent.push_str(&" ".repeat(width % TAB_WIDTH));
        indent
    }
}

impl Engine {
    /// Run `op` over `extent`. `origin` is the cursor when the command
    /// started; undo returns there.
    pub(super) fn apply_operator(&mut self, op: Operator, extent: Extent, origin: Position) {
        let register = self.register.take();
        self.pending = Pending::Idle;
        trace!(target: "engine.key", ?op, ?extent, "operator");
        match op {
            Operator::Yank => self.yank(extent, register, origin),
            Operator::Delete => self.delete(extent, register, origin),
            Operator::Change => self.change(extent, register, origin),
            Operator::ShiftRight | Operator::ShiftLeft => {
                let (first, last) = extent.line_span();
                self.shift_lines(first, last, op == Operator::ShiftRight, 1, origin);
            }
            Operator::Lower | Operator::Upper | Operator::Toggle => {
                self.convert_case(op, extent, origin);
            }
        }
    }

    /// Register contents for an extent; `None` when it covers nothing.
    fn extent_text(&self, extent: Extent) -> Option<(String, RegisterKind)> {
        match extent {
            Extent::Chars(range) if !range.is_empty() => {
                Some((self.buffer.slice_text(range), RegisterKind::Char))
            }
            Extent::Lines { first, last } => {
                let text = (first..=last)
                    .map(|line| self.buffer.line_text(line))
                    .collect::<Vec<_>>()
                    .join("\n");
                Some((text, RegisterKind::Line))
            }
            Extent::Chars(_) | Extent::Empty(_) => None,
        }
    }

    fn yank(&mut self, extent: Extent, register: Option<char>, origin: Position) {
        let Some((text, kind)) = self.extent_text(extent) else {
            return;
        };
        self.registers.write(register, text, kind);
        let (first, last) = extent.line_span();
        let lines = last - first + 1;
        if kind == RegisterKind::Line && lines > REPORT {
            self.set_message(format!("{lines} lines yanked"));
        }
        let pos = match extent {
            Extent::Lines { first, .. } if first != origin.line => Position::new(first, origin.col),
            Extent::Chars(range) => range.start,
            Extent::Lines { .. } | Extent::Empty(_) => origin,
        };
        // A yank leaves the remembered column alone.
        self.cursor.set_keep_vcol(self.buffer.clamp(pos, false));
    }

    fn delete(&mut self, extent: Extent, register: Option<char>, origin: Position) {
        let Some((text, kind)) = self.extent_text(extent) else {
            return;
        };
        self.begin_change(origin);
        self.registers.write(register, text, kind);
        match extent {
            Extent::Chars(range) => {
                self.buffer.delete(range);
                self.report_fewer(range.end.line - range.start.line);
                self.place_cursor(range.start, false);
            }
            Extent::Lines { first, last } => {
                self.buffer.remove_lines(first, last);
                self.report_fewer(last - first + 1);
                let line = first.min(self.buffer.last_line());
                self.place_cursor(Position::new(line, self.first_non_blank_col(line)), false);
            }
            Extent::Empty(_) => {}
        }
    }

    fn change(&mut self, extent: Extent, register: Option<char>, origin: Position) {
        match extent {
            Extent::Chars(range) => {
                if let Some((text, kind)) = self.extent_text(extent) {
                    self.begin_change(origin);
                    self.registers.write(register, text, kind);
                    self.buffer.delete(range);
                    self.report_fewer(range.end.line - range.start.line);
                }
                self.place_cursor(range.start, true);
                self.start_insert(1, InsertRepeat::Plain);
            }
            Extent::Lines { first, last } => {
                let (text, kind) = self
                    .extent_text(extent)
                    .unwrap_or_else(|| (String::new(), RegisterKind::Line));
                self.begin_change(origin);
                self.registers.write(register, text, kind);
                let indent = if self.options.autoindent {
                    self.buffer.indent(first)
                } else {
                    String::new()
                };
                if last > first {
                    self.buffer.remove_lines(first + 1, last);
                }
                self.buffer.set_line(first, &indent);
                self.report_fewer(last - first);
                self.place_cursor(Position::new(first, indent.chars().count()), true);
                self.start_insert(1, InsertRepeat::Plain);
                if !indent.is_empty() {
                    self.mark_autoindent(first);
                }
            }
            Extent::Empty(pos) => {
                self.place_cursor(pos, true);
                self.start_insert(1, InsertRepeat::Plain);
            }
        }
    }

    /// `>` and `<`: move each non-empty line's indent by `times` shift
    /// widths.
    pub(super) fn shift_lines(
        &mut self,
        first: usize,
        last: usize,
        right: bool,
        times: usize,
        origin: Position,
    ) {
        self.begin_change(origin);
        let width = self.options.shift_width() * times;
        for line in first..=last {
            if self.buffer.is_empty_line(line) {
                continue;
            }
            let indent = self.buffer.indent(line);
            let current = display_width(&indent);
            let target = if right {
                current + width
            } else {
                current.saturating_sub(width)
            };
            let range = Range {
                start: Position::new(line, 0),
                end: Position::new(line, indent.chars().count()),
            };
            self.buffer.replace(range, &make_indent(target, self.options.expandtab));
        }
        let lines = last - first + 1;
        if lines > REPORT {
            let plural = if times == 1 { "" } else { "s" };
            let dir = if right { '>' } else { '<' };
            self.set_message(format!("{lines} lines {dir}ed {times} time{plural}"));
        }
        self.place_cursor(Position::new(first, self.first_non_blank_col(first)), false);
    }

    fn convert_case(&mut self, op: Operator, extent: Extent, origin: Position) {
        let (range, cursor) = match extent {
            Extent::Chars(range) if !range.is_empty() => (range, range.start),
            Extent::Lines { first, last } => (
                Range {
                    start: Position::new(first, 0),
                    end: Position::new(last, self.buffer.line_len(last)),
                },
                Position::new(first, 0),
            ),
            Extent::Chars(_) | Extent::Empty(_) => return,
        };
        let text = self.buffer.slice_text(range);
        let converted = op.convert_case(&text);
        if converted != text {
            self.begin_change(origin);
            self.buffer.replace(range, &converted);
        }
        let lines = range.end.line - range.start.line + 1;
        if lines > REPORT {
            self.set_message(format!("{lines} lines changed"));
        }
        self.place_cursor(cursor, false);
    }

    fn report_fewer(&mut self, lines: usize) {
        if lines > REPORT {
            self.set_message(format!("{lines} fewer lines"));
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::engine::tests::{engine_with, feed, lines, p};
    use crate::mode::Mode;

    #[test]
    fn indent_uses_tabs_unless_expandtab() {
        assert_eq!(make_indent(12, false), "\t    ");
        assert_eq!(make_indent(3, true), "   ");
        assert_eq!(make_indent(0, false), "");
    }

    // ── Delete ───────────────────────────────────────────────────────────

    #[test]
    fn big_delete_reports_line_count() {
        let mut e = engine_with("a\nb\nc\nd\ne");
        feed(&mut e, "3dd");
        assert_eq!(lines(&e), vec!["d", "e"]);
        assert_eq!(e.snapshot().status, "3 fewer lines");
    }

    #[test]
    fn small_delete_is_silent() {
        let mut e = engine_with("a\nb\nc");
        feed(&mut e, "2dd");
        assert_eq!(e.snapshot().status, "");
    }

    #[test]
    fn delete_backwards_keeps_start() {
        let mut e = engine_with("one two");
        feed(&mut e, "$db");
        assert_eq!(lines(&e), vec!["one o"]);
        assert_eq!(e.cursor(), p(0, 4));
    }

    #[test]
    fn delete_paragraph() {
        let mut e = engine_with("a\nb\n\nc");
        feed(&mut e, "d}");
        assert_eq!(lines(&e), vec!["", "c"]);
        assert_eq!(e.registers().unnamed().kind(), RegisterKind::Line);
    }

    // ── Yank ─────────────────────────────────────────────────────────────

    #[test]
    fn yank_moves_to_start_and_reports() {
        let mut e = engine_with("a\nb\nc\nd");
        feed(&mut e, "Gy2k");
        assert_eq!(e.cursor(), p(1, 0));
        assert_eq!(e.snapshot().status, "3 lines yanked");
        assert_eq!(e.registers().unnamed().text(), "b\nc\nd");
        assert_eq!(lines(&e), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn yank_word_keeps_buffer() {
        let mut e = engine_with("foo bar");
        feed(&mut e, "wyb");
        assert_eq!(e.cursor(), p(0, 0));
        assert_eq!(e.registers().unnamed().text(), "foo ");
    }

    // ── Change ───────────────────────────────────────────────────────────

    #[test]
    fn cc_keeps_indent() {
        let mut e = engine_with("    old\nnext");
        feed(&mut e, "ccnew<Esc>");
        assert_eq!(lines(&e), vec!["    new", "next"]);
    }

    #[test]
    fn cc_unused_indent_is_removed() {
        let mut e = engine_with("    old");
        feed(&mut e, "cc<Esc>");
        assert_eq!(lines(&e), vec![""]);
        assert_eq!(e.mode(), Mode::Normal);
    }

    #[test]
    fn change_lines_with_count() {
        let mut e = engine_with("a\nb\nc");
        feed(&mut e, "2ccx<Esc>");
        assert_eq!(lines(&e), vec!["x", "c"]);
        assert_eq!(e.registers().unnamed().text(), "a\nb");
    }

    // ── Shift ────────────────────────────────────────────────────────────

    #[test]
    fn shift_with_expandtab_and_report() {
        let mut e = engine_with("a\n\nb");
        feed(&mut e, ":set sw=2 et<CR>");
        feed(&mut e, "3>>");
        assert_eq!(lines(&e), vec!["  a", "", "  b"]);
        assert_eq!(e.snapshot().status, "3 lines >ed 1 time");
        feed(&mut e, "<2j");
        assert_eq!(lines(&e), vec!["a", "", "b"]);
    }

    #[test]
    fn shift_left_mixed_indent() {
        let mut e = engine_with("\t  x");
        feed(&mut e, ":set sw=4<CR><<");
        assert_eq!(lines(&e), vec!["      x"]);
    }

    // ── Case ─────────────────────────────────────────────────────────────

    #[test]
    fn upper_to_end_of_line() {
        let mut e = engine_with("abc def");
        feed(&mut e, "wgU$");
        assert_eq!(lines(&e), vec!["abc DEF"]);
        assert_eq!(e.cursor(), p(0, 4));
    }
}
