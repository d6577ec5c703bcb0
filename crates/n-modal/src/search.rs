//! Pattern search for `/`, `?`, `n`, `N`, `*`, `#`.
//!
//! Patterns are written in Vim's default `magic` syntax and translated onto
//! the `regex` crate before compiling:
//!
//! | Vim          | regex        |
//! |--------------|--------------|
//! | `\<` `\>`    | `\b`         |
//! | `\(` `\)`    | `(` `)`      |
//! | `\|`         | `\|` (alternation) |
//! | `\+` `\?` `\=` | `+` `?` `?` |
//! | `\{n,m}`     | `{n,m}`      |
//! | `( ) \| + ? { }` | literals |
//! | `\c` / `\C`  | ignore / match case |
//!
//! Matching runs line by line; a match never spans a line break.

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::debug;

use crate::buffer::Buffer;
use crate::error::{EngineError, EngineResult};
use crate::position::Position;
use crate::word::is_keyword_char;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub enum SearchDirection {
    #[default]
    Forward,
    Backward,
}

impl SearchDirection {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    /// The command-line prompt char.
    #[must_use]
    pub const fn prompt(self) -> char {
        match self {
            Self::Forward => '/',
            Self::Backward => '?',
        }
    }
}

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

/// A match: start position and length in chars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Match {
    pub start: Position,
    pub len: usize,
}

/// A found match and whether the scan wrapped around the buffer edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Found {
    pub found: Match,
    pub wrapped: bool,
}

/// Remembered search for `n` / `N` and highlighting.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub pattern: Option<String>,
    pub direction: SearchDirection,
    /// `hlsearch` highlighting is showing (cleared by `:noh`).
    pub highlight: bool,
}

/// Case handling for [`compile`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CaseOptions {
    pub ignorecase: bool,
    pub smartcase: bool,
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

/// Translate a magic Vim pattern into `regex` syntax. Returns the regex
/// source and the case override from `\c` / `\C`, if any.
#[must_use]
pub fn translate_pattern(pattern: &str) -> (String, Option<bool>) {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut ignore_case = None;
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let Some(next) = chars.next() else {
                    out.push_str(r"\\");
                    break;
                };
                match next {
                    '<' | '>' => out.push_str(r"\b"),
                    '(' | ')' | '|' | '+' | '?' => out.push(next),
                    '=' => out.push('?'),
                    '{' => {
                        out.push('{');
                        let lazy = chars.peek() == Some(&'-');
                        if lazy {
                            chars.next();
                        }
                        let mut body = String::new();
                        while let Some(&b) = chars.peek() {
                            chars.next();
                            if b == '}' {
                                break;
                            }
                            if b != '\\' {
                                body.push(b);
                            }
                        }
                        if body.is_empty() {
                            // `\{}` is `*`.
                            out.pop();
                            out.push('*');
                        } else {
                            if body.starts_with(',') {
                                body.insert(0, '0');
                            }
                            out.push_str(&body);
                            out.push('}');
                        }
                        if lazy {
                            out.push('?');
                        }
                    }
                    'c' => ignore_case = Some(true),
                    'C' => ignore_case = Some(false),
                    's' | 'S' | 'd' | 'D' | 'w' | 'W' | 'n' | 't' => {
                        out.push('\\');
                        out.push(next);
                    }
                    'a' => out.push_str("[A-Za-z]"),
                    'A' => out.push_str("[^A-Za-z]"),
                    'l' => out.push_str("[a-z]"),
                    'u' => out.push_str("[A-Z]"),
                    'x' => out.push_str("[0-9A-Fa-f]"),
                    'e' => out.push_str(r"\x1b"),
                    other => out.push_str(&regex::escape(&other.to_string())),
                }
            }
            '(' | ')' | '|' | '+' | '?' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    (out, ignore_case)
}

/// Compile a Vim pattern with the case options in effect.
///
/// # Errors
///
/// [`EngineError::PatternNotFound`] when the translated pattern does not
/// compile; a malformed pattern behaves like one that matches nothing.
pub fn compile(pattern: &str, case: CaseOptions) -> EngineResult<Regex> {
    let (source, case_override) = translate_pattern(pattern);
    let ignore = case_override.unwrap_or_else(|| {
        case.ignorecase && !(case.smartcase && pattern.chars().any(char::is_uppercase))
    });
    RegexBuilder::new(&source)
        .case_insensitive(ignore)
        .build()
        .map_err(|err| {
            debug!(target: "engine.search", pattern, %err, "pattern does not compile");
            EngineError::PatternNotFound(pattern.to_string())
        })
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Every match on one line, in order.
fn line_matches(buf: &Buffer, re: &Regex, line: usize) -> Vec<Match> {
    let text = buf.line_text(line);
    re.find_iter(&text)
        .map(|m| Match {
            start: Position::new(line, text[..m.start()].chars().count()),
            len: m.as_str().chars().count(),
        })
        .collect()
}

/// First match starting after `from`, wrapping to the top when `wrap`.
#[must_use]
pub fn find_forward(buf: &Buffer, re: &Regex, from: Position, wrap: bool) -> Option<Found> {
    let after = line_matches(buf, re, from.line)
        .into_iter()
        .find(|m| m.start.col > from.col);
    if let Some(found) = after {
        return Some(Found { found, wrapped: false });
    }
    for line in from.line + 1..buf.line_count() {
        if let Some(&found) = line_matches(buf, re, line).first() {
            return Some(Found { found, wrapped: false });
        }
    }
    if !wrap {
        return None;
    }
    (0..=from.line).find_map(|line| {
        line_matches(buf, re, line)
            .first()
            .map(|&found| Found { found, wrapped: true })
    })
}

/// Last match starting before `from`, wrapping to the bottom when `wrap`.
#[must_use]
pub fn find_backward(buf: &Buffer, re: &Regex, from: Position, wrap: bool) -> Option<Found> {
    let before = line_matches(buf, re, from.line)
        .into_iter()
        .rev()
        .find(|m| m.start.col < from.col);
    if let Some(found) = before {
        return Some(Found { found, wrapped: false });
    }
    for line in (0..from.line).rev() {
        if let Some(&found) = line_matches(buf, re, line).last() {
            return Some(Found { found, wrapped: false });
        }
    }
    if !wrap {
        return None;
    }
    (from.line..buf.line_count()).rev().find_map(|line| {
        line_matches(buf, re, line)
            .last()
            .map(|&found| Found { found, wrapped: true })
    })
}

#[must_use]
pub fn find(
    buf: &Buffer,
    re: &Regex,
    from: Position,
    dir: SearchDirection,
    wrap: bool,
) -> Option<Found> {
    match dir {
        SearchDirection::Forward => find_forward(buf, re, from, wrap),
        SearchDirection::Backward => find_backward(buf, re, from, wrap),
    }
}

/// The first match starting at or after `from` (the highlighted match).
#[must_use]
pub fn match_at_or_after(buf: &Buffer, re: &Regex, from: Position) -> Option<Match> {
    (from.line..buf.line_count()).find_map(|line| {
        line_matches(buf, re, line)
            .into_iter()
            .find(|m| line > from.line || m.start.col >= from.col)
    })
}

/// `*` / `#`: the keyword under or after the cursor on its line, as a
/// whole-word pattern. Falls back to the non-blank run when no keyword
/// follows. Returns the pattern and the word's start.
///
/// # Errors
///
/// [`EngineError::NoStringUnderCursor`] when nothing but blanks follows.
pub fn word_pattern(buf: &Buffer, pos: Position) -> EngineResult<(String, Position)> {
    let text: Vec<char> = buf.line_text(pos.line).chars().collect();
    let from = pos.col.min(text.len());

    if let Some(hit) = (from..text.len()).find(|&c| is_keyword_char(text[c])) {
        let mut start = hit;
        while start > 0 && is_keyword_char(text[start - 1]) {
            start -= 1;
        }
        let mut end = hit;
        while end < text.len() && is_keyword_char(text[end]) {
            end += 1;
        }
        let word: String = text[start..end].iter().collect();
        return Ok((format!(r"\<{word}\>"), pos.with_col(start)));
    }

    let start = (from..text.len())
        .find(|&c| !text[c].is_whitespace())
        .ok_or(EngineError::NoStringUnderCursor)?;
    let mut end = start;
    while end < text.len() && !text[end].is_whitespace() {
        end += 1;
    }
    let word: String = text[start..end].iter().collect();
    Ok((escape_magic(&word), pos.with_col(start)))
}

/// Escape chars that are special in a magic pattern.
fn escape_magic(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '.' | '*' | '[' | ']' | '^' | '$' | '~' | '/') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
