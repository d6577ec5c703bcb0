//! What a presentation layer or the replay harness sees after each key.

use serde::Serialize;

use crate::mode::Mode;
use crate::position::{Position, Range};
use crate::search::Match;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub lines: Vec<String>,
    pub cursor: Position,
    pub mode: Mode,
    /// Message line: the last message, else the mode indicator.
    pub status: String,
    /// Prompt char and typed text while in command-line mode (`:set`, `/foo`).
    pub cmdline: Option<String>,
    /// First visible line.
    pub scroll: usize,
    /// The highlighted match at or after the cursor.
    pub search_match: Option<Match>,
    /// Anchor-to-cursor span in Visual modes, ordered.
    pub selection: Option<Range>,
    /// Register a macro is being recorded into.
    pub recording: Option<char>,
    /// A hit-enter prompt is waiting for a key.
    pub prompt: bool,
}
