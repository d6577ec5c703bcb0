//! Engine errors.
//!
//! Every variant's `Display` text is what Vim puts in the message line, so the
//! dispatcher can turn any error into status text with `to_string()`. Nothing
//! here escapes [`Engine::feed_key`](crate::engine::Engine::feed_key).

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("unknown key name: {0}")]
    UnknownKey(String),

    #[error("E35: No previous regular expression")]
    NoPreviousPattern,

    #[error("E486: Pattern not found: {0}")]
    PatternNotFound(String),

    #[error("E384: Search hit TOP without match for: {0}")]
    HitTop(String),

    #[error("E385: Search hit BOTTOM without match for: {0}")]
    HitBottom(String),

    #[error("E348: No string under cursor")]
    NoStringUnderCursor,

    #[error("E353: Nothing in register {0}")]
    EmptyRegister(char),

    #[error("E20: Mark not set")]
    MarkNotSet,

    #[error("E492: Not an editor command: {0}")]
    NotAnEditorCommand(String),

    #[error("E518: Unknown option: {0}")]
    UnknownOption(String),

    #[error("E521: Number required after =: {0}")]
    NumberRequired(String),

    #[error("E474: Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("E16: Invalid range")]
    InvalidRange,

    #[error("E662: At start of changelist")]
    ChangeListStart,

    #[error("E663: At end of changelist")]
    ChangeListEnd,

    #[error("E664: changelist is empty")]
    ChangeListEmpty,

    #[error("invalid engine config: {0}")]
    Config(String),
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.message().to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
