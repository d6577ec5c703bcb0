//! Engine configuration.
//!
//! Every field has a default, so an empty file (or no file) is valid:
//!
//! ```toml
//! undo_levels = 100
//! jumplist_max = 100
//! changelist_max = 100
//! viewport_lines = 24
//! columns = 80
//!
//! [options]
//! shiftwidth = 4
//! expandtab = true
//! ```

use serde::Deserialize;
use tracing::info;

use crate::error::EngineResult;
use crate::options::Options;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Undoable changes kept; older ones are dropped.
    pub undo_levels: usize,
    pub jumplist_max: usize,
    pub changelist_max: usize,
    /// Text lines visible at once (`H`, `M`, `L`, `Ctrl-D`, scrolling).
    pub viewport_lines: usize,
    /// Width of the message line; longer messages need hit-enter.
    pub columns: usize,
    /// Initial `:set` values.
    pub options: Options,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            undo_levels: 100,
            jumplist_max: 100,
            changelist_max: 100,
            viewport_lines: 24,
            columns: 80,
            options: Options::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a TOML config.
    ///
    /// # Errors
    ///
    /// [`EngineError::Config`](crate::error::EngineError::Config) for
    /// malformed TOML or mistyped values.
    pub fn from_toml(text: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(text)?;
        info!(
            target: "engine.config",
            undo_levels = config.undo_levels,
            viewport_lines = config.viewport_lines,
            columns = config.columns,
            "config loaded"
        );
        Ok(config)
    }
}
