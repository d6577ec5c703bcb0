//! Editing modes.
//!
//! The engine is always in exactly one [`Mode`]:
//!
//! | Mode        | Cursor limit        | Entered by                    |
//! |-------------|---------------------|-------------------------------|
//! | Normal      | `0..len-1`          | start, Escape                 |
//! | Insert      | `0..len`            | `i a I A o O s S c C`         |
//! | Visual      | `0..len-1` (`len` after `$`) | `v`                  |
//! | VisualLine  | `0..len-1`          | `V`                           |
//! | Replace     | `0..len`            | `R`                           |
//! | CommandLine | (command line)      | `:`, `/`, `?`                 |

use std::fmt;

use serde::Serialize;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Mode {
    #[default]
    Normal,
    Insert,
    Visual,
    VisualLine,
    Replace,
    CommandLine,
}

impl Mode {
    /// Vim's `showmode` text; empty for Normal and CommandLine.
    #[must_use]
    pub const fn indicator(self) -> &'static str {
        match self {
            Self::Normal | Self::CommandLine => "",
            Self::Insert => "-- INSERT --",
            Self::Visual => "-- VISUAL --",
            Self::VisualLine => "-- VISUAL LINE --",
            Self::Replace => "-- REPLACE --",
        }
    }

    /// True if the cursor may rest one past the last char.
    #[inline]
    #[must_use]
    pub const fn cursor_past_end(self) -> bool {
        matches!(self, Self::Insert | Self::Replace)
    }

    #[inline]
    #[must_use]
    pub const fn is_visual(self) -> bool {
        matches!(self, Self::Visual | Self::VisualLine)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
            Self::Visual => "VISUAL",
            Self::VisualLine => "VISUAL LINE",
            Self::Replace => "REPLACE",
            Self::CommandLine => "COMMAND",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_normal() {
        assert_eq!(Mode::default(), Mode::Normal);
    }

    #[test]
    fn past_end_only_while_typing() {
        assert!(Mode::Insert.cursor_past_end());
        assert!(Mode::Replace.cursor_past_end());
        assert!(!Mode::Normal.cursor_past_end());
        assert!(!Mode::Visual.cursor_past_end());
    }

    #[test]
    fn indicators() {
        assert_eq!(Mode::Insert.indicator(), "-- INSERT --");
        assert_eq!(Mode::VisualLine.indicator(), "-- VISUAL LINE --");
        assert_eq!(Mode::Normal.indicator(), "");
        assert_eq!(Mode::VisualLine.to_string(), "VISUAL LINE");
        assert!(Mode::VisualLine.is_visual());
    }
}
