//! Logical key names.
//!
//! The engine never sees raw input events. A host hands it canonical names:
//!
//! | Name                              | Key                  |
//! |-----------------------------------|----------------------|
//! | any single char (`"a"`, `" "`)    | [`Key::Char`]        |
//! | `Escape`, `Enter`, `Backspace`    | named keys           |
//! | `Delete`, `Tab`                   | named keys           |
//! | `ArrowLeft` .. `ArrowDown`        | arrows               |
//! | `Ctrl-r` (also `C-r`)             | [`Key::Ctrl`]        |
//!
//! Key scripts (tests, the replay harness) use Vim's angle-bracket notation,
//! parsed by [`parse_keys`]: `ciwhi<Esc>`, `<C-r>`, `<CR>`, `<lt>`.

use std::fmt;

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    /// Control chord; the letter is stored lowercase.
    Ctrl(char),
    Escape,
    Enter,
    Backspace,
    Delete,
    Tab,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

impl Key {
    /// Parse a canonical logical key name.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownKey`] for names outside the vocabulary.
    pub fn parse(name: &str) -> EngineResult<Self> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(Self::Char(c));
        }
        let key = match name {
            "Escape" | "Esc" => Self::Escape,
            "Enter" | "Return" => Self::Enter,
            "Backspace" => Self::Backspace,
            "Delete" => Self::Delete,
            "Tab" => Self::Tab,
            "ArrowLeft" | "Left" => Self::Left,
            "ArrowRight" | "Right" => Self::Right,
            "ArrowUp" | "Up" => Self::Up,
            "ArrowDown" | "Down" => Self::Down,
            "Home" => Self::Home,
            "End" => Self::End,
            "Space" => Self::Char(' '),
            _ => {
                return ctrl_letter(name)
                    .map(Self::Ctrl)
                    .ok_or_else(|| EngineError::UnknownKey(name.to_string()));
            }
        };
        Ok(key)
    }

    /// The printable char, if this is one.
    #[inline]
    #[must_use]
    pub const fn char(self) -> Option<char> {
        match self {
            Self::Char(c) => Some(c),
            _ => None,
        }
    }

    /// True for `0`-`9`.
    #[inline]
    #[must_use]
    pub const fn is_digit(self) -> bool {
        matches!(self, Self::Char('0'..='9'))
    }
}

/// `Ctrl-x`, `C-x`, `Control-x` → `x`.
fn ctrl_letter(name: &str) -> Option<char> {
    let rest = name
        .strip_prefix("Ctrl-")
        .or_else(|| name.strip_prefix("Control-"))
        .or_else(|| name.strip_prefix("C-"))
        .or_else(|| name.strip_prefix("c-"))?;
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() || "[]\\^_@".contains(c) => {
            Some(c.to_ascii_lowercase())
        }
        _ => None,
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(c) => write!(f, "{c}"),
            Self::Ctrl(c) => write!(f, "Ctrl-{c}"),
            Self::Escape => f.write_str("Escape"),
            Self::Enter => f.write_str("Enter"),
            Self::Backspace => f.write_str("Backspace"),
            Self::Delete => f.write_str("Delete"),
            Self::Tab => f.write_str("Tab"),
            Self::Left => f.write_str("ArrowLeft"),
            Self::Right => f.write_str("ArrowRight"),
            Self::Up => f.write_str("ArrowUp"),
            Self::Down => f.write_str("ArrowDown"),
            Self::Home => f.write_str("Home"),
            Self::End => f.write_str("End"),
        }
    }
}

// ---------------------------------------------------------------------------
// Key scripts
// ---------------------------------------------------------------------------

/// Parse a key script in Vim notation into keys.
///
/// Plain chars stand for themselves; `<...>` groups name special keys
/// (`<Esc>`, `<CR>`, `<BS>`, `<Del>`, `<Tab>`, `<Space>`, `<lt>`, `<C-x>`,
/// `<Left>`..). A `<` that does not start a known group is a literal `<`,
/// as with Vim's `feedkeys()`.
#[must_use]
pub fn parse_keys(script: &str) -> Vec<Key> {
    let mut keys = Vec::with_capacity(script.len());
    let mut rest = script;
    while let Some(c) = rest.chars().next() {
        if c == '<' {
            if let Some((key, close)) = rest
                .find('>')
                .and_then(|close| notation(&rest[1..close]).map(|key| (key, close)))
            {
                keys.push(key);
                rest = &rest[close + 1..];
                continue;
            }
        }
        keys.push(Key::Char(c));
        rest = &rest[c.len_utf8()..];
    }
    keys
}

/// Write keys back in the notation [`parse_keys`] reads. This is how a
/// recorded macro is stored as register text.
#[must_use]
pub fn to_notation(keys: &[Key]) -> String {
    let mut out = String::with_capacity(keys.len());
    for key in keys {
        match key {
            Key::Char('<') => out.push_str("<lt>"),
            Key::Char(c) => out.push(*c),
            Key::Ctrl(c) => {
                out.push_str("<C-");
                out.push(*c);
                out.push('>');
            }
            Key::Escape => out.push_str("<Esc>"),
            Key::Enter => out.push_str("<CR>"),
            Key::Backspace => out.push_str("<BS>"),
            Key::Delete => out.push_str("<Del>"),
            Key::Tab => out.push_str("<Tab>"),
            Key::Left => out.push_str("<Left>"),
            Key::Right => out.push_str("<Right>"),
            Key::Up => out.push_str("<Up>"),
            Key::Down => out.push_str("<Down>"),
            Key::Home => out.push_str("<Home>"),
            Key::End => out.push_str("<End>"),
        }
    }
    out
}

fn notation(inner: &str) -> Option<Key> {
    let key = match inner.to_ascii_lowercase().as_str() {
        "esc" => Key::Escape,
        "cr" | "enter" | "return" => Key::Enter,
        "bs" => Key::Backspace,
        "del" => Key::Delete,
        "tab" => Key::Tab,
        "space" => Key::Char(' '),
        "lt" => Key::Char('<'),
        "gt" => Key::Char('>'),
        "bar" => Key::Char('|'),
        "bslash" => Key::Char('\\'),
        "left" => Key::Left,
        "right" => Key::Right,
        "up" => Key::Up,
        "down" => Key::Down,
        "home" => Key::Home,
        "end" => Key::End,
        _ => return ctrl_letter(inner).map(Key::Ctrl),
    };
    Some(key)
}
