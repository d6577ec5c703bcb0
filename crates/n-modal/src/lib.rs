//! # n-modal: Headless Vim modal-editing engine
//!
//! Feed it keys, read back a [`Snapshot`]. Nothing here draws, reads files
//! or talks to a terminal; hosts (a UI, the `n-replay` harness, tests) own
//! all of that.
//!
//! - **[`engine`]**: `Engine`, key dispatch across modes and pending state
//! - **[`buffer`]**: `Buffer` wrapping a rope, line-oriented editing
//! - **[`position`]**: `Position` (line, col) and `Range` types, 0-indexed
//! - **[`cursor`]**: cursor with sticky column and Visual anchor
//! - **[`motion`]**: motion resolution (`w`, `}`, `f`, `%`, ...)
//! - **[`text_object`]**: `iw`, `a(`, `i"`, `ip`, ...
//! - **[`operator`]**: operators and the text they cover
//! - **[`search`]**: Vim patterns on top of `regex`
//! - **[`command`]**: the `:` command line and its commands
//! - **[`history`]**, **[`register`]**, **[`replay`]**, **[`jumplist`]**: undo, registers,
//!   macros and `.`, jumps, changes and marks
//! - **[`options`]**, **[`config`]**: `:set` options and the TOML engine config
//!
//! ```
//! use n_modal::Engine;
//!
//! let mut engine = Engine::new();
//! engine.load_file("word1 word2");
//! engine.feed_keys("dw");
//! assert_eq!(engine.snapshot().lines, vec!["word2"]);
//! ```

pub mod buffer;
pub mod command;
pub mod config;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod history;
pub mod jumplist;
pub mod key;
pub mod mode;
pub mod motion;
pub mod operator;
pub mod options;
pub mod pending;
pub mod position;
pub mod register;
pub mod replay;
pub mod search;
pub mod snapshot;
pub mod text_object;
pub mod word;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use key::Key;
pub use mode::Mode;
pub use position::{Position, Range};
pub use snapshot::Snapshot;
