//! Command-line mode: editing the prompt line and running `:` commands.

use tracing::{debug, info};

use super::operator::REPORT;
use super::{Engine, Prompt};
use crate::command::{self, CmdRange, Command, SortFlags};
use crate::error::{EngineError, EngineResult};
use crate::key::Key;
use crate::mode::Mode;
use crate::pending::Pending;
use crate::position::{Position, Range};

impl Engine {
    pub(super) fn open_prompt(&mut self, prompt: Prompt) {
        self.cmdline.clear();
        self.preview = None;
        self.prompt = prompt;
        self.mode = Mode::CommandLine;
    }

    /// `:`. A count prefills a range over that many lines (`3:` gives
    /// `:4,6` on line 4).
    pub(super) fn open_ex(&mut self, count: Option<usize>) {
        self.replay.dot_cancel();
        self.open_prompt(Prompt::Ex);
        if let Some(n) = count {
            let first = self.cursor.line() + 1;
            let last = (first + n - 1).min(self.buffer.line_count());
            for ch in format!("{first},{last}").chars() {
                self.cmdline.insert_char(ch);
            }
        }
    }

    pub(super) fn cmdline_key(&mut self, key: Key) {
        match key {
            Key::Escape | Key::Ctrl('c' | '[') => {
                self.cancel_prompt();
                return;
            }
            Key::Enter | Key::Ctrl('m' | 'j') => {
                self.confirm_prompt();
                return;
            }
            Key::Backspace | Key::Ctrl('h') => {
                if self.cmdline.is_empty() {
                    self.cancel_prompt();
                    return;
                }
                self.cmdline.backspace();
            }
            Key::Delete => {
                self.cmdline.delete();
            }
            Key::Ctrl('w') => self.cmdline.delete_word(),
            Key::Ctrl('u') => self.cmdline.delete_to_start(),
            Key::Left => self.cmdline.move_left(),
            Key::Right => self.cmdline.move_right(),
            Key::Home | Key::Ctrl('b') => self.cmdline.move_home(),
            Key::End | Key::Ctrl('e') => self.cmdline.move_end(),
            Key::Tab => self.cmdline.insert_char('\t'),
            Key::Char(c) => self.cmdline.insert_char(c),
            Key::Up | Key::Down | Key::Ctrl(_) => {}
        }
        self.preview_search();
    }

    /// Leave the prompt without running it. A search puts the cursor and
    /// the view back, and drops an operator waiting for it.
    fn cancel_prompt(&mut self) {
        self.cmdline.clear();
        self.preview = None;
        self.mode = Mode::Normal;
        if let Prompt::Search { origin, scroll, .. } = self.prompt {
            self.cursor.set_keep_vcol(origin);
            self.scroll = scroll;
        }
        if matches!(self.pending, Pending::AwaitingSearch(_)) {
            debug!(target: "engine.search", "operator search cancelled");
        }
        self.reset_pending();
    }

    fn confirm_prompt(&mut self) {
        let input = self.cmdline.input().to_string();
        self.cmdline.clear();
        self.preview = None;
        self.mode = Mode::Normal;
        match self.prompt {
            Prompt::Ex => self.run_ex(&input),
            Prompt::Search {
                direction,
                count,
                origin,
                scroll,
            } => {
                self.cursor.set_keep_vcol(origin);
                self.scroll = scroll;
                self.search_command(&input, direction, count);
            }
        }
    }

    // -- Ex commands ----------------------------------------------------------

    fn run_ex(&mut self, input: &str) {
        debug!(target: "engine.ex", input, "ex command");
        if let Err(err) = command::parse(input).and_then(|cmd| self.execute(cmd)) {
            self.report(&err);
            self.fail();
        }
    }

    fn execute(&mut self, command: Command) -> EngineResult<()> {
        match command {
            Command::Nop => {}
            Command::Host(text) => {
                info!(target: "engine.ex", command = %text, "host command");
                self.host_commands.push(text);
            }
            Command::Set(args) => {
                let highlighted = self.options.hlsearch;
                let shown = self.options.set(&args)?;
                if self.options.hlsearch && !highlighted {
                    self.search.highlight = true;
                }
                if let Some(text) = shown {
                    self.set_message(text);
                }
            }
            Command::Sort { range, flags } => self.sort(range, flags)?,
            Command::Goto(range) => self.goto_line(range)?,
            Command::NoHighlight => self.search.highlight = false,
        }
        Ok(())
    }

    fn visual_lines(&self) -> Option<(usize, usize)> {
        self.marks.visual().map(|(start, end)| (start.line, end.line))
    }

    /// `:[range]sort`. Without a range the whole buffer is sorted.
    fn sort(&mut self, range: CmdRange, flags: SortFlags) -> EngineResult<()> {
        let last = self.buffer.last_line();
        let (first, end) = range.lines(self.cursor.line(), last, (0, last), self.visual_lines())?;
        let lines: Vec<String> = (first..=end).map(|line| self.buffer.line_text(line)).collect();
        let before = lines.len();
        let sorted = command::sort_lines(lines.clone(), flags);
        if sorted != lines {
            self.begin_change(self.cursor.position());
            let span = Range {
                start: Position::new(first, 0),
                end: Position::new(end, self.buffer.line_len(end)),
            };
            self.buffer.replace(span, &sorted.join("\n"));
        }
        let removed = before - sorted.len();
        if removed > REPORT {
            self.set_message(format!("{removed} fewer lines"));
        }
        self.place_cursor(Position::new(first, self.first_non_blank_col(first)), false);
        Ok(())
    }

    /// `:N`, `:$`, `:.`: a line number past the end goes to the last line.
    fn goto_line(&mut self, range: CmdRange) -> EngineResult<()> {
        let current = self.cursor.line();
        let last = self.buffer.last_line();
        let line = match range.lines(current, last, (current, current), self.visual_lines()) {
            Ok((_, end)) => end,
            Err(EngineError::InvalidRange) => last,
            Err(err) => return Err(err),
        };
        self.push_jump();
        self.place_cursor(Position::new(line, self.first_non_blank_col(line)), false);
        Ok(())
    }
}
