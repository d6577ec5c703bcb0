//! The modal dispatcher.
//!
//! [`Engine`] owns every piece of editor state. Keys enter one at a time
//! through [`Engine::feed_key`] (a logical key name) or
//! [`Engine::handle_key`], and each is fully processed before the next:
//!
//! ```text
//! key ─► hit-enter ─► macro capture ─► mode handler ─► pending / motion / operator
//!                                                              │
//!        history close ◄── end of command ◄── scroll ◄── clamp ┘
//! ```
//!
//! Macros and `.` feed their stored keys back through `handle_key` under a
//! replay frame, so a replayed key behaves exactly like a typed one.

mod cmdline;
mod edit;
mod find;
mod insert;
mod jump;
mod normal;
mod operator;
mod scroll;
mod visual;

use tracing::{debug, warn};

use crate::buffer::Buffer;
use crate::command::CommandLine;
use crate::config::EngineConfig;
use crate::cursor::Cursor;
use crate::error::EngineError;
use crate::history::{History, UndoEntry};
use crate::jumplist::{Dedup, Marks, PositionList};
use crate::key::{self, Key};
use crate::mode::Mode;
use crate::motion::{FindKind, MotionContext, MotionResult, Vcol};
use crate::options::Options;
use crate::pending::Pending;
use crate::position::Position;
use crate::register::RegisterFile;
use crate::replay::Replay;
use crate::search::{Match, SearchDirection, SearchState};
use crate::snapshot::Snapshot;

use insert::{InsertResume, InsertSession};

/// What the command line is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prompt {
    Ex,
    Search {
        direction: SearchDirection,
        count: usize,
        /// Cursor and scroll to go back to on cancel.
        origin: Position,
        scroll: usize,
    },
}

impl Prompt {
    const fn char(self) -> char {
        match self {
            Self::Ex => ':',
            Self::Search { direction, .. } => direction.prompt(),
        }
    }
}

/// The last Visual selection, for `gv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Selection {
    anchor: Position,
    cursor: Position,
    mode: Mode,
}

pub struct Engine {
    config: EngineConfig,
    options: Options,
    buffer: Buffer,
    cursor: Cursor,
    mode: Mode,
    pending: Pending,
    count: Option<usize>,
    register: Option<char>,
    registers: RegisterFile,
    history: History,
    replay: Replay,
    jumps: PositionList,
    changes: PositionList,
    marks: Marks,
    search: SearchState,
    last_find: Option<(FindKind, char)>,
    cmdline: CommandLine,
    prompt: Prompt,
    /// Incremental-search match shown while typing the pattern.
    preview: Option<Match>,
    message: Option<String>,
    hit_enter: bool,
    scroll: usize,
    /// Lines moved by Ctrl-D / Ctrl-U once a count has set it.
    half_page: Option<usize>,
    host_commands: Vec<String>,
    insert: Option<InsertSession>,
    /// Insert mode left for one command with `Ctrl-O`.
    resume: Option<InsertResume>,
    last_visual: Option<Selection>,
    /// Bumped by every buffer mutation.
    tick: u64,
    /// `tick` when the current Normal command started.
    command_tick: Option<u64>,
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        let buffer = Buffer::new();
        let history = History::new(
            UndoEntry {
                rope: buffer.rope().clone(),
                cursor: Position::ZERO,
                scroll: 0,
            },
            config.undo_levels,
        );
        Self {
            options: config.options.clone(),
            buffer,
            cursor: Cursor::new(),
            mode: Mode::Normal,
            pending: Pending::Idle,
            count: None,
            register: None,
            registers: RegisterFile::new(),
            history,
            replay: Replay::new(),
            jumps: PositionList::new(config.jumplist_max, Dedup::AnyLine),
            changes: PositionList::new(config.changelist_max, Dedup::LastLine),
            marks: Marks::default(),
            search: SearchState::default(),
            last_find: None,
            cmdline: CommandLine::new(),
            prompt: Prompt::Ex,
            preview: None,
            message: None,
            hit_enter: false,
            scroll: 0,
            half_page: None,
            host_commands: Vec::new(),
            insert: None,
            resume: None,
            last_visual: None,
            tick: 0,
            command_tick: None,
            config,
        }
    }

    /// Replace the buffer with `text`. Cursor, undo history, jump and change
    /// lists, marks and scroll start over; registers, macros, options and
    /// the last search survive.
    pub fn load_file(&mut self, text: &str) {
        self.buffer = Buffer::from_text(text);
        self.cursor = Cursor::new();
        self.mode = Mode::Normal;
        self.reset_pending();
        self.history = History::new(
            UndoEntry {
                rope: self.buffer.rope().clone(),
                cursor: Position::ZERO,
                scroll: 0,
            },
            self.config.undo_levels,
        );
        self.jumps.clear();
        self.changes.clear();
        self.marks.clear();
        self.cmdline.clear();
        self.preview = None;
        self.message = None;
        self.hit_enter = false;
        self.scroll = 0;
        self.insert = None;
        self.resume = None;
        self.last_visual = None;
        self.command_tick = None;
        debug!(target: "engine.key", lines = self.buffer.line_count(), "file loaded");
    }

    /// Put the cursor somewhere before any keys are fed (clamped).
    pub fn set_cursor(&mut self, pos: Position) {
        let pos = self.buffer.clamp(pos, false);
        self.cursor.set(pos, &self.buffer);
        self.scroll_to_cursor();
    }

    // -- Accessors ------------------------------------------------------------

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub const fn cursor(&self) -> Position {
        self.cursor.position()
    }

    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    #[must_use]
    pub const fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Commands for the host (`:w`, `:q`, `ZZ`), oldest first. Draining.
    pub fn take_host_commands(&mut self) -> Vec<String> {
        std::mem::take(&mut self.host_commands)
    }

    // -- Input ----------------------------------------------------------------

    /// Feed one logical key by name (`"a"`, `"Escape"`, `"Ctrl-r"`). An
    /// unknown name drops any half-typed command.
    pub fn feed_key(&mut self, name: &str) {
        match Key::parse(name) {
            Ok(key) => self.handle_key(key),
            Err(err) => {
                warn!(target: "engine.key", %err, "ignored");
                self.reset_pending();
            }
        }
    }

    /// Feed a key script in Vim notation (`"dw"`, `"ihi<Esc>"`).
    pub fn feed_keys(&mut self, script: &str) {
        for key in key::parse_keys(script) {
            self.handle_key(key);
        }
    }

    pub fn handle_key(&mut self, key: Key) {
        debug!(target: "engine.key", %key, mode = %self.mode, "key");
        if !self.replay.replaying() {
            self.replay.record(key);
        }

        if self.hit_enter {
            self.hit_enter = false;
            self.message = None;
            if matches!(key, Key::Enter | Key::Escape | Key::Char(' ')) {
                return;
            }
        }

        let before = self.mode;
        if let Some(resume) = self.resume.as_mut().filter(|_| !before.cursor_past_end()) {
            resume.ran = true;
        }
        match self.mode {
            Mode::Normal | Mode::Visual | Mode::VisualLine => {
                if self.pending.takes_count() && self.push_count_digit(key) {
                    // Digits are folded into the recorded count, not the keys.
                } else {
                    if self.mode == Mode::Normal
                        && self.pending.is_idle()
                        && key != Key::Char('"')
                    {
                        self.begin_command();
                    }
                    self.replay.dot_push(key);
                    self.modal_key(key);
                }
            }
            Mode::Insert | Mode::Replace => {
                self.replay.dot_push(key);
                self.insert_key(key);
            }
            Mode::CommandLine => {
                self.replay.dot_push(key);
                self.cmdline_key(key);
            }
        }
        if self.mode != before && self.mode != Mode::Normal {
            self.message = None;
        }
        self.after_key();
    }

    fn after_key(&mut self) {
        let past_end = self.mode.cursor_past_end() || self.mode.is_visual();
        self.cursor.clamp(&self.buffer, past_end);
        self.scroll_to_cursor();
        if self.mode == Mode::Normal && self.pending.is_idle() {
            self.finish_command();
        }
        if !self.replay.suppress_snapshot() && !self.mode.cursor_past_end() {
            self.history.close();
        }
        self.resume_insert();
    }

    // -- Commands -------------------------------------------------------------

    fn begin_command(&mut self) {
        if self.command_tick.is_none() {
            self.command_tick = Some(self.tick);
            self.replay.dot_start(self.count, self.register);
        }
    }

    fn finish_command(&mut self) {
        let Some(start) = self.command_tick.take() else {
            self.replay.dot_cancel();
            return;
        };
        let changed = self.tick != start;
        self.replay.dot_finish(changed);
        if changed {
            let pos = self.cursor.position();
            self.changes.push(pos);
            self.marks.set_change(pos);
        }
    }

    /// Open an undo step before the first mutation of a command. `at` is
    /// where undo puts the cursor back.
    fn begin_change(&mut self, at: Position) {
        let buffer = &self.buffer;
        let scroll = self.scroll;
        self.history.begin(|| UndoEntry {
            rope: buffer.rope().clone(),
            cursor: at,
            scroll,
        });
        self.tick += 1;
    }

    fn reset_pending(&mut self) {
        self.pending = Pending::Idle;
        self.count = None;
        self.register = None;
    }

    /// A command could not do anything: drop the rest of it and stop any
    /// replay that depends on it.
    fn fail(&mut self) {
        self.replay.no_progress();
        self.reset_pending();
    }

    fn motion_context(&self, op_pending: bool, count_given: bool) -> MotionContext {
        MotionContext {
            op_pending,
            visual: self.mode.is_visual(),
            count_given,
            viewport_top: self.scroll,
            viewport_height: self.config.viewport_lines,
        }
    }

    /// Move the cursor to a motion's target.
    fn land(&mut self, result: &MotionResult) {
        match result.vcol {
            Vcol::Recompute => self.cursor.set(result.pos, &self.buffer),
            Vcol::Keep => self.cursor.set_keep_vcol(result.pos),
            Vcol::Set(vcol) => {
                self.cursor.set_keep_vcol(result.pos);
                self.cursor.set_want_vcol(vcol);
            }
        }
    }

    /// Clamp `pos` into the buffer and move there.
    fn place_cursor(&mut self, pos: Position, past_end: bool) {
        let pos = self.buffer.clamp(pos, past_end);
        self.cursor.set(pos, &self.buffer);
    }

    fn first_non_blank_col(&self, line: usize) -> usize {
        self.buffer
            .first_non_blank(line)
            .unwrap_or_else(|| self.buffer.last_col(line))
    }

    // -- Messages -------------------------------------------------------------

    fn set_message(&mut self, text: impl Into<String>) {
        let text = text.into();
        // The last cell stays free; a message that reaches it scrolls.
        if !self.replay.replaying() && text.chars().count() >= self.config.columns {
            self.hit_enter = true;
        }
        self.message = Some(text);
    }

    fn report(&mut self, err: &EngineError) {
        debug!(target: "engine.key", %err, "command failed");
        self.set_message(err.to_string());
    }

    fn status(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        let mut status = match self.resume.filter(|_| self.mode == Mode::Normal) {
            Some(resume) => resume.indicator().to_string(),
            None => self.mode.indicator().to_string(),
        };
        if let Some(name) = self.replay.recording() {
            status.push_str(&format!("recording @{name}"));
        }
        status
    }

    // -- Snapshot -------------------------------------------------------------

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            lines: self.buffer.lines(),
            cursor: self.cursor.position(),
            mode: self.mode,
            status: self.status(),
            cmdline: (self.mode == Mode::CommandLine)
                .then(|| format!("{}{}", self.prompt.char(), self.cmdline.input())),
            scroll: self.scroll,
            search_match: self.highlighted_match(),
            selection: if self.mode.is_visual() {
                self.cursor.selection()
            } else {
                None
            },
            recording: self.replay.recording(),
            prompt: self.hit_enter,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
