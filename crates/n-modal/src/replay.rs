//! Macros, dot-repeat and the replay frame stack.
//!
//! Both `@x` and `.` feed stored keys back through
//! [`Engine::handle_key`](crate::engine::Engine::handle_key). Each replay
//! pushes a [`Frame`]; the flags of the frames on the stack decide whether
//! intermediate undo snapshots are taken and whether a motion that goes
//! nowhere stops the replay.
//!
//! A finished recording is handed to the caller, which stores it in the
//! named register as key notation; `@x` plays whatever that register holds.
//!
//! ```text
//! qa dd q        register a = "dd"
//! 2@a            frame { macro a, suppress, abort } × 2 iterations
//! .              frame { dot,     suppress        }
//! ```

use tracing::trace;

use crate::key::Key;

// ---------------------------------------------------------------------------
// Frames
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Macro(char),
    Dot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    /// Only the first mutation under this frame snapshots for undo.
    pub suppress_snapshot: bool,
    /// A failed motion aborts the rest of this replay.
    pub abort_on_no_progress: bool,
}

impl Frame {
    #[must_use]
    pub const fn macro_frame(name: char) -> Self {
        Self {
            kind: FrameKind::Macro(name),
            suppress_snapshot: true,
            abort_on_no_progress: true,
        }
    }

    #[must_use]
    pub const fn dot() -> Self {
        Self {
            kind: FrameKind::Dot,
            suppress_snapshot: true,
            abort_on_no_progress: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Dot-repeat
// ---------------------------------------------------------------------------

/// The last complete change: its keys with count digits and the register
/// prefix stripped, plus the effective count and register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotChange {
    pub keys: Vec<Key>,
    pub count: Option<usize>,
    pub register: Option<char>,
}

/// Multiply two optional counts; `None` only when neither was typed.
#[must_use]
pub const fn merge_counts(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (None, None) => None,
        (Some(x), None) => Some(x),
        (None, Some(y)) => Some(y),
        (Some(x), Some(y)) => Some(x.saturating_mul(y)),
    }
}

// ---------------------------------------------------------------------------
// Replay state
// ---------------------------------------------------------------------------

/// The recording in progress, the dot record and the frame stack.
#[derive(Debug, Clone)]
pub struct Replay {
    recording: Option<(char, Vec<Key>)>,
    last_played: Option<char>,

    frames: Vec<Frame>,
    aborted: bool,

    /// Keys of the command being typed, while one is being recorded.
    dot_keys: Vec<Key>,
    dot_count: Option<usize>,
    dot_register: Option<char>,
    dot_active: bool,
    last_change: Option<DotChange>,
}

/// Registers `q` records into and `@` plays from.
const fn is_macro_register(name: char) -> bool {
    name.is_ascii_alphabetic() || name == '"'
}

impl Replay {
    #[must_use]
    pub fn new() -> Self {
        Self {
            recording: None,
            last_played: None,
            frames: Vec::new(),
            aborted: false,
            dot_keys: Vec::new(),
            dot_count: None,
            dot_register: None,
            dot_active: false,
            last_change: None,
        }
    }

    // -- Recording -----------------------------------------------------------

    /// `q{name}`. Uppercase names append to the register when stored.
    pub fn start_recording(&mut self, name: char) -> bool {
        if !name.is_ascii_alphabetic() {
            return false;
        }
        self.recording = Some((name, Vec::new()));
        trace!(target: "engine.replay", register = %name, "recording");
        true
    }

    /// Record a key typed by the user. Replayed keys never reach here.
    pub fn record(&mut self, key: Key) {
        if let Some((_, keys)) = &mut self.recording {
            keys.push(key);
        }
    }

    /// The final `q`: the register name as typed and the keys, minus
    /// that `q`.
    pub fn stop_recording(&mut self) -> Option<(char, Vec<Key>)> {
        let (name, mut keys) = self.recording.take()?;
        if keys.last() == Some(&Key::Char('q')) {
            keys.pop();
        }
        trace!(target: "engine.replay", register = %name, keys = keys.len(), "recorded");
        Some((name, keys))
    }

    /// Register being recorded into, lowercase.
    #[must_use]
    pub fn recording(&self) -> Option<char> {
        self.recording.as_ref().map(|(name, _)| name.to_ascii_lowercase())
    }

    /// The register `@{name}` plays; `@` means the last one played.
    /// Remembers it for the next `@@`.
    pub fn macro_register(&mut self, name: char) -> Option<char> {
        let name = if name == '@' { self.last_played? } else { name };
        if !is_macro_register(name) {
            return None;
        }
        let name = name.to_ascii_lowercase();
        self.last_played = Some(name);
        Some(name)
    }

    // -- Frames --------------------------------------------------------------

    pub fn push_frame(&mut self, frame: Frame) {
        trace!(target: "engine.replay", kind = ?frame.kind, depth = self.frames.len() + 1, "enter");
        self.frames.push(frame);
    }

    /// Pop a frame. Leaving the outermost frame clears the abort flag.
    pub fn pop_frame(&mut self) {
        self.frames.pop();
        if self.frames.is_empty() {
            self.aborted = false;
        }
    }

    /// Nesting of replays in progress.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn replaying(&self) -> bool {
        !self.frames.is_empty()
    }

    #[must_use]
    pub fn suppress_snapshot(&self) -> bool {
        self.frames.iter().any(|f| f.suppress_snapshot)
    }

    fn in_dot(&self) -> bool {
        self.frames.iter().any(|f| f.kind == FrameKind::Dot)
    }

    /// A motion went nowhere. Returns true if that aborts the replay.
    pub fn no_progress(&mut self) -> bool {
        if self.frames.iter().any(|f| f.abort_on_no_progress) {
            if !self.aborted {
                trace!(target: "engine.replay", "aborted: motion made no progress");
            }
            self.aborted = true;
        }
        self.aborted
    }

    #[must_use]
    pub const fn aborted(&self) -> bool {
        self.aborted
    }

    // -- Dot-repeat ------------------------------------------------------------

    /// A new command starts. Ignored while replaying `.` itself.
    pub fn dot_start(&mut self, count: Option<usize>, register: Option<char>) {
        if self.in_dot() {
            return;
        }
        self.dot_active = true;
        self.dot_keys.clear();
        self.dot_count = count;
        self.dot_register = register;
    }

    pub fn dot_push(&mut self, key: Key) {
        if self.dot_active && !self.in_dot() {
            self.dot_keys.push(key);
        }
    }

    /// Swap the last recorded key, so an insert left with `Ctrl-O` repeats
    /// as one ended with `Esc`.
    pub fn dot_replace_last(&mut self, key: Key) {
        let recording = self.dot_active && !self.in_dot();
        if let Some(last) = self.dot_keys.last_mut().filter(|_| recording) {
            *last = key;
        }
    }

    /// Fold a count typed mid-command (`d3w`) into the recorded count.
    pub fn dot_merge_count(&mut self, count: Option<usize>) {
        if self.dot_active && !self.in_dot() {
            self.dot_count = merge_counts(self.dot_count, count);
        }
    }

    /// Replace the recorded keys, for Visual changes recorded as their
    /// Normal-mode equivalent.
    pub fn dot_rewrite(&mut self, keys: Vec<Key>, count: Option<usize>) {
        if self.dot_active && !self.in_dot() {
            self.dot_keys = keys;
            self.dot_count = count;
        }
    }

    /// The command ended. It becomes the last change if it changed the text.
    pub fn dot_finish(&mut self, changed: bool) {
        if !self.dot_active || self.in_dot() {
            return;
        }
        self.dot_active = false;
        if changed && !self.dot_keys.is_empty() {
            self.last_change = Some(DotChange {
                keys: std::mem::take(&mut self.dot_keys),
                count: self.dot_count,
                register: self.dot_register,
            });
        }
        self.dot_keys.clear();
    }

    /// Drop the command being recorded (undo, redo, `.` itself).
    pub fn dot_cancel(&mut self) {
        if !self.in_dot() {
            self.dot_active = false;
            self.dot_keys.clear();
        }
    }

    #[must_use]
    pub const fn dot_active(&self) -> bool {
        self.dot_active
    }

    #[must_use]
    pub const fn last_change(&self) -> Option<&DotChange> {
        self.last_change.as_ref()
    }
}

impl Default for Replay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::parse_keys;

    // -- Macros ----------------------------------------------------------------

    #[test]
    fn recording_drops_the_final_q() {
        let mut replay = Replay::new();
        assert!(replay.start_recording('a'));
        for key in parse_keys("ddq") {
            replay.record(key);
        }
        assert_eq!(replay.stop_recording(), Some(('a', parse_keys("dd"))));
        assert_eq!(replay.recording(), None);
        assert_eq!(replay.stop_recording(), None);
    }

    #[test]
    fn uppercase_name_is_kept_for_appending() {
        let mut replay = Replay::new();
        replay.start_recording('A');
        assert_eq!(replay.recording(), Some('a'));
        replay.record(Key::Char('j'));
        assert_eq!(replay.stop_recording(), Some(('A', parse_keys("j"))));
    }

    #[test]
    fn at_at_replays_the_last_register() {
        let mut replay = Replay::new();
        assert_eq!(replay.macro_register('@'), None);
        assert_eq!(replay.macro_register('B'), Some('b'));
        assert_eq!(replay.macro_register('@'), Some('b'));
        assert_eq!(replay.macro_register('"'), Some('"'));
        assert_eq!(replay.macro_register('1'), None);
        assert_eq!(replay.macro_register('@'), Some('"'));
    }

    #[test]
    fn invalid_register_is_rejected() {
        let mut replay = Replay::new();
        assert!(!replay.start_recording('1'));
        assert_eq!(replay.recording(), None);
    }

    // -- Frames ----------------------------------------------------------------

    #[test]
    fn abort_needs_an_aborting_frame() {
        let mut replay = Replay::new();
        assert!(!replay.no_progress());
        replay.push_frame(Frame::dot());
        assert!(!replay.no_progress());
        replay.push_frame(Frame::macro_frame('a'));
        assert!(replay.no_progress());
        replay.pop_frame();
        assert!(replay.aborted());
        replay.pop_frame();
        assert!(!replay.aborted());
        assert!(!replay.replaying());
    }

    // -- Dot-repeat ------------------------------------------------------------

    #[test]
    fn change_becomes_last_change() {
        let mut replay = Replay::new();
        replay.dot_start(Some(2), None);
        replay.dot_push(Key::Char('d'));
        replay.dot_merge_count(Some(3));
        replay.dot_push(Key::Char('w'));
        replay.dot_finish(true);
        assert_eq!(
            replay.last_change(),
            Some(&DotChange {
                keys: parse_keys("dw"),
                count: Some(6),
                register: None,
            })
        );
    }

    #[test]
    fn non_change_keeps_previous() {
        let mut replay = Replay::new();
        replay.dot_start(None, None);
        replay.dot_push(Key::Char('x'));
        replay.dot_finish(true);
        replay.dot_start(None, None);
        replay.dot_push(Key::Char('y'));
        replay.dot_push(Key::Char('y'));
        replay.dot_finish(false);
        assert_eq!(replay.last_change().map(|c| c.keys.clone()), Some(parse_keys("x")));
    }

    #[test]
    fn dot_replay_is_not_recorded() {
        let mut replay = Replay::new();
        replay.dot_start(None, None);
        replay.dot_push(Key::Char('x'));
        replay.dot_finish(true);

        replay.push_frame(Frame::dot());
        replay.dot_start(Some(5), None);
        replay.dot_push(Key::Char('~'));
        replay.dot_finish(true);
        replay.pop_frame();

        assert_eq!(
            replay.last_change(),
            Some(&DotChange {
                keys: parse_keys("x"),
                count: None,
                register: None,
            })
        );
    }

    #[test]
    fn replace_last_swaps_the_final_key() {
        let mut replay = Replay::new();
        replay.dot_start(None, None);
        for key in parse_keys("ix<C-o>") {
            replay.dot_push(key);
        }
        replay.dot_replace_last(Key::Escape);
        replay.dot_finish(true);
        assert_eq!(replay.last_change().map(|c| c.keys.clone()), Some(parse_keys("ix<Esc>")));
    }

    #[test]
    fn merge_counts_multiplies() {
        assert_eq!(merge_counts(None, None), None);
        assert_eq!(merge_counts(Some(2), None), Some(2));
        assert_eq!(merge_counts(None, Some(3)), Some(3));
        assert_eq!(merge_counts(Some(2), Some(3)), Some(6));
    }
}
