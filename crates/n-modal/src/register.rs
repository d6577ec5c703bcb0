//! Registers: storage for yanked and deleted text.
//!
//! Every yank, delete and change writes the unnamed register. Selecting a
//! register with `"x` additionally writes (or, for `"X`, appends to) named
//! register `x`. Puts read the selected register, else the unnamed one.
//!
//! Text is stored without a trailing newline. A linewise register holds its
//! lines joined by `\n`; the [`RegisterKind`] tells put whether to splice
//! inline or open whole lines.

use crate::error::{EngineError, EngineResult};

/// How the text was captured; decides how put inserts it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegisterKind {
    /// Spliced inline at the cursor.
    #[default]
    Char,
    /// Whole lines, put above or below the cursor line.
    Line,
}

/// One register slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Register {
    text: String,
    kind: RegisterKind,
}

impl Register {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            text: String::new(),
            kind: RegisterKind::Char,
        }
    }

    pub fn set(&mut self, text: String, kind: RegisterKind) {
        self.text = text;
        self.kind = kind;
    }

    /// Append for uppercase names. Appending lines to anything (or anything
    /// to lines) yields lines.
    pub fn append(&mut self, text: &str, kind: RegisterKind) {
        if self.text.is_empty() {
            self.set(text.to_string(), kind);
            return;
        }
        if kind == RegisterKind::Line || self.kind == RegisterKind::Line {
            self.text.push('\n');
            self.kind = RegisterKind::Line;
        }
        self.text.push_str(text);
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn kind(&self) -> RegisterKind {
        self.kind
    }

    /// The stored lines of a linewise register.
    #[must_use]
    pub fn lines(&self) -> Vec<&str> {
        self.text.split('\n').collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.kind == RegisterKind::Char
    }
}

// ---------------------------------------------------------------------------
// Register file
// ---------------------------------------------------------------------------

/// Unnamed register plus `a`–`z`.
#[derive(Debug, Clone)]
pub struct RegisterFile {
    unnamed: Register,
    named: [Register; 26],
}

/// Slot index for a named register, case-insensitive.
fn slot(name: char) -> Option<usize> {
    name.is_ascii_alphabetic()
        .then(|| usize::from(name.to_ascii_lowercase() as u8 - b'a'))
}

/// True for names `"x` accepts: `a`–`z`, `A`–`Z` and `"` (the unnamed one).
#[must_use]
pub const fn is_valid_name(name: char) -> bool {
    name.is_ascii_alphabetic() || name == '"'
}

impl RegisterFile {
    #[must_use]
    pub fn new() -> Self {
        Self {
            unnamed: Register::new(),
            named: std::array::from_fn(|_| Register::new()),
        }
    }

    /// Store text from a yank, delete or change.
    ///
    /// - `None` or `"` → unnamed only
    /// - `a`–`z` → overwrite named, copy to unnamed
    /// - `A`–`Z` → append to named, copy the result to unnamed
    pub fn write(&mut self, name: Option<char>, text: String, kind: RegisterKind) {
        match name.and_then(|n| slot(n).map(|idx| (n, idx))) {
            Some((n, idx)) if n.is_ascii_uppercase() => {
                self.named[idx].append(&text, kind);
                self.unnamed = self.named[idx].clone();
            }
            Some((_, idx)) => {
                self.named[idx].set(text.clone(), kind);
                self.unnamed.set(text, kind);
            }
            None => self.unnamed.set(text, kind),
        }
    }

    /// Store a recorded macro in named register `name` (`A`-`Z` append).
    /// The unnamed register is left alone.
    pub fn record_macro(&mut self, name: char, text: &str) {
        let Some(idx) = slot(name) else {
            return;
        };
        if name.is_ascii_uppercase() {
            self.named[idx].append(text, RegisterKind::Char);
        } else {
            self.named[idx].set(text.to_string(), RegisterKind::Char);
        }
    }

    /// The register a put reads.
    ///
    /// # Errors
    ///
    /// [`EngineError::EmptyRegister`] when an explicitly named register has
    /// never been written. An empty unnamed register is returned as is.
    pub fn read(&self, name: Option<char>) -> EngineResult<&Register> {
        match name.and_then(|n| slot(n).map(|idx| (n, idx))) {
            Some((n, idx)) => {
                let reg = &self.named[idx];
                if reg.is_empty() {
                    Err(EngineError::EmptyRegister(n.to_ascii_lowercase()))
                } else {
                    Ok(reg)
                }
            }
            None => Ok(&self.unnamed),
        }
    }

    #[must_use]
    pub const fn unnamed(&self) -> &Register {
        &self.unnamed
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Register ------------------------------------------------------------

    #[test]
    fn new_register_is_empty_char() {
        let reg = Register::new();
        assert!(reg.is_empty());
        assert_eq!(reg.kind(), RegisterKind::Char);
    }

    #[test]
    fn empty_line_register_is_not_empty() {
        let mut reg = Register::new();
        reg.set(String::new(), RegisterKind::Line);
        assert!(!reg.is_empty());
        assert_eq!(reg.lines(), vec![""]);
    }

    #[test]
    fn append_char_to_char() {
        let mut reg = Register::new();
        reg.set("foo".into(), RegisterKind::Char);
        reg.append("bar", RegisterKind::Char);
        assert_eq!(reg.text(), "foobar");
        assert_eq!(reg.kind(), RegisterKind::Char);
    }

    #[test]
    fn append_line_upgrades_kind() {
        let mut reg = Register::new();
        reg.set("first".into(), RegisterKind::Char);
        reg.append("second", RegisterKind::Line);
        assert_eq!(reg.text(), "first\nsecond");
        assert_eq!(reg.kind(), RegisterKind::Line);
        assert_eq!(reg.lines(), vec!["first", "second"]);
    }

    #[test]
    fn append_to_empty_takes_kind() {
        let mut reg = Register::new();
        reg.append("line", RegisterKind::Line);
        assert_eq!(reg.text(), "line");
        assert_eq!(reg.kind(), RegisterKind::Line);
    }

    // -- RegisterFile --------------------------------------------------------

    #[test]
    fn unnamed_write() {
        let mut rf = RegisterFile::new();
        rf.write(None, "hello".into(), RegisterKind::Char);
        assert_eq!(rf.read(None).map(Register::text), Ok("hello"));
    }

    #[test]
    fn named_write_also_fills_unnamed() {
        let mut rf = RegisterFile::new();
        rf.write(Some('a'), "world".into(), RegisterKind::Line);
        assert_eq!(rf.read(Some('a')).map(Register::text), Ok("world"));
        assert_eq!(rf.unnamed().text(), "world");
        assert_eq!(rf.unnamed().kind(), RegisterKind::Line);
    }

    #[test]
    fn uppercase_appends() {
        let mut rf = RegisterFile::new();
        rf.write(Some('a'), "hello".into(), RegisterKind::Char);
        rf.write(Some('A'), " world".into(), RegisterKind::Char);
        assert_eq!(rf.read(Some('a')).map(Register::text), Ok("hello world"));
        assert_eq!(rf.unnamed().text(), "hello world");
    }

    #[test]
    fn quote_name_is_unnamed() {
        let mut rf = RegisterFile::new();
        rf.write(Some('"'), "x".into(), RegisterKind::Char);
        assert_eq!(rf.read(Some('"')).map(Register::text), Ok("x"));
        assert!(rf.read(Some('x')).is_err());
    }

    #[test]
    fn empty_named_register_is_an_error() {
        let rf = RegisterFile::new();
        assert_eq!(rf.read(Some('q')), Err(EngineError::EmptyRegister('q')));
        assert_eq!(rf.read(Some('Q')), Err(EngineError::EmptyRegister('q')));
        assert!(rf.read(None).is_ok_and(Register::is_empty));
    }

    #[test]
    fn recorded_macro_skips_unnamed() {
        let mut rf = RegisterFile::new();
        rf.write(None, "kept".into(), RegisterKind::Line);
        rf.record_macro('q', "dd");
        rf.record_macro('Q', "j");
        assert_eq!(rf.read(Some('q')).map(Register::text), Ok("ddj"));
        assert_eq!(rf.read(Some('q')).map(Register::kind), Ok(RegisterKind::Char));
        assert_eq!(rf.unnamed().text(), "kept");
    }

    #[test]
    fn named_registers_are_isolated() {
        let mut rf = RegisterFile::new();
        for (i, ch) in ('a'..='z').enumerate() {
            rf.write(Some(ch), format!("reg_{i}"), RegisterKind::Char);
        }
        for (i, ch) in ('a'..='z').enumerate() {
            assert_eq!(rf.read(Some(ch)).map(Register::text), Ok(format!("reg_{i}").as_str()));
        }
        assert_eq!(rf.unnamed().text(), "reg_25");
    }
}
