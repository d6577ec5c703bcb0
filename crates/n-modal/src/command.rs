//! Command-line input and the `:` command set.
//!
//! The same [`CommandLine`] buffer backs the `:` prompt and the `/` and `?`
//! search prompts; the engine remembers which one is open.
//!
//! # Supported commands
//!
//! | Command                     | Action                                  |
//! |-----------------------------|-----------------------------------------|
//! | `:w` `:q` `:q!` `:wq` `:x`  | recorded for the host, not executed     |
//! | `:wa` `:qa` `:qa!` `:wqa` `:xa` | recorded for the host, not executed |
//! | `:set ...`                  | options (see [`crate::options`])        |
//! | `:[range]sort[!] [i][n][u]` | sort lines                              |
//! | `:N`, `:$`                  | go to line                              |
//! | `:noh[lsearch]`             | hide search highlighting                |
//!
//! # Ranges
//!
//! | Range    | Lines                          |
//! |----------|--------------------------------|
//! | (none)   | current line (`:sort`: all)    |
//! | `%`      | every line                     |
//! | `N,M`    | lines N through M (1-indexed)  |
//! | `.`, `$` | current line, last line        |
//! | `'<,'>`  | the last visual selection      |

use std::cmp::Ordering;

use crate::error::{EngineError, EngineResult};

// ---------------------------------------------------------------------------
// Ranges
// ---------------------------------------------------------------------------

/// One line address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Address {
    /// A 0-indexed line (`:0` and `:1` both mean the first line).
    Line(usize),
    /// `.`
    Current,
    /// `$`
    Last,
}

impl Address {
    const fn resolve(self, current: usize, last: usize) -> usize {
        match self {
            Self::Line(line) => line,
            Self::Current => current,
            Self::Last => last,
        }
    }
}

/// An address range prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmdRange {
    /// No range given; the default depends on the command.
    Default,
    /// `%`
    All,
    /// `N` or `N,M`.
    Span(Address, Address),
    /// `'<,'>`
    Visual,
}

impl CmdRange {
    /// Resolve to inclusive 0-indexed lines, swapping a backwards range.
    /// `default` covers [`CmdRange::Default`]; `visual` is the last visual
    /// selection's lines.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidRange`] for lines past the end of the buffer,
    /// and [`EngineError::MarkNotSet`] for `'<,'>` before any selection.
    pub fn lines(
        self,
        current: usize,
        last: usize,
        default: (usize, usize),
        visual: Option<(usize, usize)>,
    ) -> EngineResult<(usize, usize)> {
        let (a, b) = match self {
            Self::Default => default,
            Self::All => (0, last),
            Self::Visual => visual.ok_or(EngineError::MarkNotSet)?,
            Self::Span(a, b) => (a.resolve(current, last), b.resolve(current, last)),
        };
        let (first, end) = if a <= b { (a, b) } else { (b, a) };
        if end > last {
            return Err(EngineError::InvalidRange);
        }
        Ok((first, end))
    }
}

// ---------------------------------------------------------------------------
// Sort flags
// ---------------------------------------------------------------------------

/// Flags for `:sort`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortFlags {
    /// `!`: reverse the order.
    pub reverse: bool,
    /// `i`: ignore case.
    pub ignore_case: bool,
    /// `n`: compare the first decimal number in each line.
    pub numeric: bool,
    /// `u`: keep only the first of equal lines.
    pub unique: bool,
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A parsed `:` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Empty input; does nothing.
    Nop,
    /// File and quit commands, passed to the host as typed.
    Host(String),
    /// `:set` with its argument string.
    Set(String),
    Sort { range: CmdRange, flags: SortFlags },
    /// A bare range: jump to its last line.
    Goto(CmdRange),
    NoHighlight,
}

const HOST_COMMANDS: &[&str] = &[
    "w", "w!", "write", "q", "q!", "quit", "quit!", "wq", "wq!", "x", "x!", "xit", "exit",
    "wa", "wall", "qa", "qa!", "qall", "qall!", "wqa", "wqall", "xa", "xall",
];

/// Parse a command string (without the leading `:`).
///
/// # Errors
///
/// [`EngineError::NotAnEditorCommand`] for anything outside the command set
/// and [`EngineError::InvalidArgument`] for bad `:sort` flags.
pub fn parse(input: &str) -> EngineResult<Command> {
    let trimmed = input.trim_start_matches([' ', ':']).trim_end();
    if trimmed.is_empty() {
        return Ok(Command::Nop);
    }

    let (range, rest) = parse_range(trimmed);
    let rest = rest.trim_start();
    if rest.is_empty() {
        return Ok(Command::Goto(range));
    }

    let name_len = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    let (name, mut args) = rest.split_at(name_len);
    let bang = args.starts_with('!');
    if bang {
        args = &args[1..];
    }
    let args = args.trim();

    let with_bang = if bang { format!("{name}!") } else { name.to_string() };
    if HOST_COMMANDS.contains(&with_bang.as_str()) {
        return Ok(Command::Host(trimmed.to_string()));
    }

    match name {
        "se" | "set" if !bang => Ok(Command::Set(args.to_string())),
        "sor" | "sort" => Ok(Command::Sort {
            range,
            flags: parse_sort_flags(args, bang)?,
        }),
        _ if !bang && args.is_empty() && is_noh(name) => Ok(Command::NoHighlight),
        _ => Err(EngineError::NotAnEditorCommand(trimmed.to_string())),
    }
}

/// `:noh`, `:nohl`, ... `:nohlsearch`.
fn is_noh(name: &str) -> bool {
    name.len() >= 3 && "nohlsearch".starts_with(name)
}

fn parse_sort_flags(args: &str, reverse: bool) -> EngineResult<SortFlags> {
    let mut flags = SortFlags {
        reverse,
        ..SortFlags::default()
    };
    for c in args.chars() {
        match c {
            'i' => flags.ignore_case = true,
            'n' => flags.numeric = true,
            'u' => flags.unique = true,
            ' ' | '\t' => {}
            _ => return Err(EngineError::InvalidArgument(args.to_string())),
        }
    }
    Ok(flags)
}

/// Parse a range prefix. Returns the range and the text after it.
fn parse_range(input: &str) -> (CmdRange, &str) {
    if let Some(rest) = input.strip_prefix('%') {
        return (CmdRange::All, rest);
    }
    if let Some(rest) = input.strip_prefix("'<,'>") {
        return (CmdRange::Visual, rest);
    }
    let Some((first, rest)) = parse_address(input) else {
        return (CmdRange::Default, input);
    };
    if let Some((second, rest)) = rest.strip_prefix(',').and_then(parse_address) {
        return (CmdRange::Span(first, second), rest);
    }
    (CmdRange::Span(first, first), rest)
}

fn parse_address(input: &str) -> Option<(Address, &str)> {
    if let Some(rest) = input.strip_prefix('$') {
        return Some((Address::Last, rest));
    }
    if let Some(rest) = input.strip_prefix('.') {
        return Some((Address::Current, rest));
    }
    let (num, rest) = parse_line_number(input)?;
    Some((Address::Line(num.saturating_sub(1)), rest))
}

/// Parse a decimal number from the start of `input`.
fn parse_line_number(input: &str) -> Option<(usize, &str)> {
    let end = input
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(input.len());
    if end == 0 {
        return None;
    }
    let num: usize = input[..end].parse().ok()?;
    Some((num, &input[end..]))
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// First decimal number in a line, with one leading `-`.
fn leading_number(line: &str) -> Option<i64> {
    let start = line.find(|c: char| c.is_ascii_digit())?;
    let digits: String = line[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    let value: i64 = digits.parse().unwrap_or(i64::MAX);
    if line[..start].ends_with('-') {
        Some(-value)
    } else {
        Some(value)
    }
}

fn compare(a: &str, b: &str, flags: SortFlags) -> Ordering {
    if flags.numeric {
        // Lines without a number sort first, in their original order.
        leading_number(a).cmp(&leading_number(b))
    } else if flags.ignore_case {
        a.to_lowercase().cmp(&b.to_lowercase())
    } else {
        a.cmp(b)
    }
}

/// Sort lines as `:sort` does: stable, then reversed for `!`, then equal
/// neighbors dropped for `u`.
#[must_use]
pub fn sort_lines(lines: Vec<String>, flags: SortFlags) -> Vec<String> {
    let mut lines = lines;
    lines.sort_by(|a, b| compare(a, b, flags));
    if flags.reverse {
        lines.reverse();
    }
    if flags.unique {
        lines.dedup_by(|next, kept| compare(kept, next, flags) == Ordering::Equal);
    }
    lines
}

// ---------------------------------------------------------------------------
// CommandLine
// ---------------------------------------------------------------------------

/// The text typed at the bottom-line prompt, with a cursor. The prompt char
/// itself is not stored.
#[derive(Debug, Clone, Default)]
pub struct CommandLine {
    input: String,
    /// Char offset into `input`.
    cursor: usize,
}

impl CommandLine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            input: String::new(),
            cursor: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn insert_char(&mut self, ch: char) {
        let byte_idx = self.char_to_byte(self.cursor);
        self.input.insert(byte_idx, ch);
        self.cursor += 1;
    }

    /// Delete the char before the cursor. Returns `false` at the start.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let byte_idx = self.char_to_byte(self.cursor);
        self.input.remove(byte_idx);
        true
    }

    /// Delete the char under the cursor.
    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.input.chars().count() {
            return false;
        }
        let byte_idx = self.char_to_byte(self.cursor);
        self.input.remove(byte_idx);
        true
    }

    /// Ctrl-W: delete the word before the cursor.
    pub fn delete_word(&mut self) {
        let chars: Vec<char> = self.input.chars().collect();
        let mut start = self.cursor;
        while start > 0 && chars[start - 1] == ' ' {
            start -= 1;
        }
        let word = start > 0 && crate::word::is_keyword_char(chars[start - 1]);
        while start > 0
            && chars[start - 1] != ' '
            && crate::word::is_keyword_char(chars[start - 1]) == word
        {
            start -= 1;
        }
        let from = self.char_to_byte(start);
        let to = self.char_to_byte(self.cursor);
        self.input.replace_range(from..to, "");
        self.cursor = start;
    }

    /// Ctrl-U: delete everything before the cursor.
    pub fn delete_to_start(&mut self) {
        let to = self.char_to_byte(self.cursor);
        self.input.replace_range(..to, "");
        self.cursor = 0;
    }

    pub const fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.input.chars().count() {
            self.cursor += 1;
        }
    }

    pub const fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    /// Parse the input as a `:` command.
    ///
    /// # Errors
    ///
    /// See [`parse`].
    pub fn parse(&self) -> EngineResult<Command> {
        parse(&self.input)
    }

    fn char_to_byte(&self, char_idx: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_idx)
            .map_or(self.input.len(), |(byte_idx, _)| byte_idx)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
