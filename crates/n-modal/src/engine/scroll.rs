//! The viewport: which line is at the top, and the commands that move it.
//!
//! The engine renders nothing; it only tracks the first visible line for a
//! viewport of `viewport_lines` rows so that `H`/`M`/`L`, `Ctrl-D` and
//! friends behave as they would on a screen of that size.

use super::Engine;
use crate::cursor::col_for_vcol;
use crate::key::Key;
use crate::position::Position;

impl Engine {
    fn viewport_height(&self) -> usize {
        self.config.viewport_lines.max(1)
    }

    /// Scroll the least amount that brings the cursor line into view.
    pub(super) fn scroll_to_cursor(&mut self) {
        let height = self.viewport_height();
        let line = self.cursor.line();
        if line < self.scroll {
            self.scroll = line;
        } else if line >= self.scroll + height {
            self.scroll = line + 1 - height;
        }
        self.scroll = self.scroll.min(self.buffer.last_line());
    }

    /// Move to `line`, keeping the remembered column.
    fn move_to_line(&mut self, line: usize) {
        let col = col_for_vcol(&self.buffer, line, self.cursor.want_vcol(), false);
        self.cursor.set_keep_vcol(Position::new(line, col));
    }

    fn move_to_line_start(&mut self, line: usize) {
        self.place_cursor(Position::new(line, self.first_non_blank_col(line)), false);
    }

    /// Ctrl-E, Ctrl-Y, Ctrl-D, Ctrl-U, Ctrl-F, Ctrl-B. Returns false for
    /// other keys.
    pub(super) fn scroll_command(&mut self, key: Key, count: Option<usize>) -> bool {
        let n = count.unwrap_or(1);
        let height = self.viewport_height();
        let last = self.buffer.last_line();
        let line = self.cursor.line();
        match key {
            Key::Ctrl('e') => {
                self.scroll = (self.scroll + n).min(last);
                if line < self.scroll {
                    self.move_to_line(self.scroll);
                }
            }
            Key::Ctrl('y') => {
                self.scroll = self.scroll.saturating_sub(n);
                let bottom = self.scroll + height - 1;
                if line > bottom {
                    self.move_to_line(bottom);
                }
            }
            Key::Ctrl(c @ ('d' | 'u')) => {
                if count.is_some() {
                    self.half_page = count;
                }
                let amount = self.half_page.unwrap_or(height / 2).max(1);
                if c == 'd' {
                    if line == last {
                        self.fail();
                        return true;
                    }
                    self.scroll = (self.scroll + amount).min(last.saturating_sub(height - 1));
                    self.move_to_line_start((line + amount).min(last));
                } else {
                    if line == 0 {
                        self.fail();
                        return true;
                    }
                    self.scroll = self.scroll.saturating_sub(amount);
                    self.move_to_line_start(line.saturating_sub(amount));
                }
            }
            Key::Ctrl('f') => {
                if self.scroll >= last {
                    self.fail();
                    return true;
                }
                let page = height.saturating_sub(2).max(1);
                self.scroll = (self.scroll + page * n).min(last);
                self.move_to_line_start(line.max(self.scroll));
            }
            Key::Ctrl('b') => {
                if self.scroll == 0 {
                    self.fail();
                    return true;
                }
                let page = height.saturating_sub(2).max(1);
                self.scroll = self.scroll.saturating_sub(page * n);
                self.move_to_line_start(line.min(self.scroll + height - 1));
            }
            _ => return false,
        }
        true
    }

    /// The key after `z`. A count first moves the cursor to that line.
    pub(super) fn scroll_key(&mut self, count: Option<usize>, key: Key) {
        let (placement, to_line_start) = match key {
            Key::Char('t') => (Placement::Top, false),
            Key::Enter | Key::Ctrl('m') => (Placement::Top, true),
            Key::Char('z') => (Placement::Middle, false),
            Key::Char('.') => (Placement::Middle, true),
            Key::Char('b') => (Placement::Bottom, false),
            Key::Char('-') => (Placement::Bottom, true),
            _ => {
                self.reset_pending();
                return;
            }
        };
        if let Some(n) = count {
            let line = (n - 1).min(self.buffer.last_line());
            self.move_to_line(line);
        }
        let line = self.cursor.line();
        if to_line_start {
            self.move_to_line_start(line);
        }
        let height = self.viewport_height();
        self.scroll = match placement {
            Placement::Top => line,
            Placement::Middle => line.saturating_sub((height - 1) / 2),
            Placement::Bottom => line.saturating_sub(height - 1),
        };
    }
}

/// Where `z` puts the cursor line.
#[derive(Clone, Copy)]
enum Placement {
    Top,
    Middle,
    Bottom,
}
