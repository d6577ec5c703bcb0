//! Editor options and the `:set` command.
//!
//! | Syntax           | Effect                          |
//! |------------------|---------------------------------|
//! | `:set option`    | enable boolean / show numeric   |
//! | `:set nooption`  | disable boolean                 |
//! | `:set option!`   | toggle boolean                  |
//! | `:set option?`   | show current value              |
//! | `:set option=N`  | assign numeric value            |
//! | `:set`           | show options that differ from the defaults |
//! | `:set all`       | show all options                |
//!
//! | Full name    | Abbrev | Type    | Default |
//! |--------------|--------|---------|---------|
//! | `hlsearch`   | `hls`  | bool    | true    |
//! | `incsearch`  | `is`   | bool    | false   |
//! | `ignorecase` | `ic`   | bool    | false   |
//! | `smartcase`  | `scs`  | bool    | false   |
//! | `wrapscan`   | `ws`   | bool    | true    |
//! | `expandtab`  | `et`   | bool    | false   |
//! | `autoindent` | `ai`   | bool    | true    |
//! | `number`     | `nu`   | bool    | false   |
//! | `shiftwidth` | `sw`   | integer | 8       |

use serde::Deserialize;

use crate::cursor::TAB_WIDTH;
use crate::error::{EngineError, EngineResult};
use crate::search::CaseOptions;

/// A parsed `:set` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    On(String),
    Off(String),
    Toggle(String),
    Query(String),
    Assign(String, String),
    ShowChanged,
    ShowAll,
}

/// Parse the whole `:set` argument string.
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    let trimmed = args.trim();
    if trimmed.is_empty() {
        return vec![SetDirective::ShowChanged];
    }
    trimmed.split_whitespace().map(parse_set_arg).collect()
}

/// Parse one `:set` argument.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if arg == "all" {
        return SetDirective::ShowAll;
    }
    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }
    if let Some(name) = arg.strip_suffix('?') {
        return SetDirective::Query(name.to_string());
    }
    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_string());
    }
    // `number` starts with "no"; only strip it when the rest is a boolean.
    if let Some(name) = arg.strip_prefix("no") {
        if bool_name(name).is_some() {
            return SetDirective::Off(name.to_string());
        }
    }
    if numeric_name(arg).is_some() {
        return SetDirective::Query(arg.to_string());
    }
    SetDirective::On(arg.to_string())
}

const BOOL_OPTIONS: &[(&str, &str)] = &[
    ("hlsearch", "hls"),
    ("incsearch", "is"),
    ("ignorecase", "ic"),
    ("smartcase", "scs"),
    ("wrapscan", "ws"),
    ("expandtab", "et"),
    ("autoindent", "ai"),
    ("number", "nu"),
];

/// Full name of a boolean option, from its name or abbreviation.
fn bool_name(name: &str) -> Option<&'static str> {
    BOOL_OPTIONS
        .iter()
        .find(|(full, abbrev)| name == *full || name == *abbrev)
        .map(|(full, _)| *full)
}

fn numeric_name(name: &str) -> Option<&'static str> {
    matches!(name, "shiftwidth" | "sw").then_some("shiftwidth")
}

/// Format a boolean option the way `:set` shows it.
#[must_use]
pub fn format_bool(name: &str, value: bool) -> String {
    if value {
        name.to_string()
    } else {
        format!("no{name}")
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Option values. Also the `[options]` table of the engine config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Options {
    pub hlsearch: bool,
    pub incsearch: bool,
    pub ignorecase: bool,
    pub smartcase: bool,
    pub wrapscan: bool,
    pub expandtab: bool,
    pub autoindent: bool,
    pub number: bool,
    pub shiftwidth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            hlsearch: true,
            incsearch: false,
            ignorecase: false,
            smartcase: false,
            wrapscan: true,
            expandtab: false,
            autoindent: true,
            number: false,
            shiftwidth: TAB_WIDTH,
        }
    }
}

impl Options {
    fn bool_mut(&mut self, full: &str) -> Option<&mut bool> {
        let slot = match full {
            "hlsearch" => &mut self.hlsearch,
            "incsearch" => &mut self.incsearch,
            "ignorecase" => &mut self.ignorecase,
            "smartcase" => &mut self.smartcase,
            "wrapscan" => &mut self.wrapscan,
            "expandtab" => &mut self.expandtab,
            "autoindent" => &mut self.autoindent,
            "number" => &mut self.number,
            _ => return None,
        };
        Some(slot)
    }

    fn bool_value(&self, full: &str) -> bool {
        match full {
            "hlsearch" => self.hlsearch,
            "incsearch" => self.incsearch,
            "ignorecase" => self.ignorecase,
            "smartcase" => self.smartcase,
            "wrapscan" => self.wrapscan,
            "expandtab" => self.expandtab,
            "autoindent" => self.autoindent,
            "number" => self.number,
            _ => false,
        }
    }

    /// Columns one `>` shifts by; 0 means a tab stop.
    #[must_use]
    pub const fn shift_width(&self) -> usize {
        if self.shiftwidth == 0 {
            TAB_WIDTH
        } else {
            self.shiftwidth
        }
    }

    #[must_use]
    pub const fn case(&self) -> CaseOptions {
        CaseOptions {
            ignorecase: self.ignorecase,
            smartcase: self.smartcase,
        }
    }

    /// Every option as `:set all` lists it.
    fn describe(&self) -> Vec<String> {
        let mut out: Vec<String> = BOOL_OPTIONS
            .iter()
            .map(|(full, _)| format_bool(full, self.bool_value(full)))
            .collect();
        out.push(format!("shiftwidth={}", self.shiftwidth));
        out
    }

    /// Run a `:set` command line. Returns the text to show, if any.
    ///
    /// # Errors
    ///
    /// Stops at the first bad argument: [`EngineError::UnknownOption`],
    /// [`EngineError::NumberRequired`] or [`EngineError::InvalidArgument`].
    pub fn set(&mut self, args: &str) -> EngineResult<Option<String>> {
        let mut shown = Vec::new();
        for directive in parse_set(args) {
            if let Some(text) = self.apply(directive)? {
                shown.push(text);
            }
        }
        Ok((!shown.is_empty()).then(|| shown.join("  ")))
    }

    fn apply(&mut self, directive: SetDirective) -> EngineResult<Option<String>> {
        match directive {
            SetDirective::ShowAll => Ok(Some(self.describe().join("  "))),
            SetDirective::ShowChanged => {
                let defaults = Self::default().describe();
                let changed: Vec<String> = self
                    .describe()
                    .into_iter()
                    .filter(|item| !defaults.contains(item))
                    .collect();
                Ok((!changed.is_empty()).then(|| changed.join("  ")))
            }
            SetDirective::On(name) => {
                let full = bool_name(&name).ok_or(EngineError::UnknownOption(name))?;
                self.write_bool(full, |_| true);
                Ok(None)
            }
            SetDirective::Off(name) => {
                let full = bool_name(&name).ok_or(EngineError::UnknownOption(name))?;
                self.write_bool(full, |_| false);
                Ok(None)
            }
            SetDirective::Toggle(name) => match bool_name(&name) {
                Some(full) => {
                    self.write_bool(full, |v| !v);
                    Ok(None)
                }
                None if numeric_name(&name).is_some() => {
                    Err(EngineError::InvalidArgument(format!("{name}!")))
                }
                None => Err(EngineError::UnknownOption(name)),
            },
            SetDirective::Query(name) => {
                if let Some(full) = bool_name(&name) {
                    Ok(Some(format_bool(full, self.bool_value(full))))
                } else if numeric_name(&name).is_some() {
                    Ok(Some(format!("shiftwidth={}", self.shiftwidth)))
                } else {
                    Err(EngineError::UnknownOption(name))
                }
            }
            SetDirective::Assign(name, value) => {
                if numeric_name(&name).is_some() {
                    self.shiftwidth = value
                        .parse()
                        .map_err(|_| EngineError::NumberRequired(format!("{name}={value}")))?;
                    Ok(None)
                } else if bool_name(&name).is_some() {
                    Err(EngineError::InvalidArgument(format!("{name}={value}")))
                } else {
                    Err(EngineError::UnknownOption(name))
                }
            }
        }
    }

    fn write_bool(&mut self, full: &str, f: impl FnOnce(bool) -> bool) {
        if let Some(slot) = self.bool_mut(full) {
            *slot = f(*slot);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
