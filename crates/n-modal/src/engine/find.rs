//! `/`, `?`, `n`, `N`, `*`, `#`, and operators waiting on a search.

use regex::Regex;
use tracing::debug;

use super::{Engine, Prompt};
use crate::error::{EngineError, EngineResult};
use crate::mode::Mode;
use crate::motion::{MotionResult, Vcol};
use crate::operator;
use crate::pending::{OperatorSearch, Pending, PendingOp};
use crate::position::Position;
use crate::replay::merge_counts;
use crate::search::{self, CaseOptions, Found, Match, SearchDirection};

const WRAPPED_TO_TOP: &str = "search hit BOTTOM, continuing at TOP";
const WRAPPED_TO_BOTTOM: &str = "search hit TOP, continuing at BOTTOM";

impl Engine {
    /// `/` and `?`.
    pub(super) fn open_search(&mut self, direction: SearchDirection, count: usize) {
        self.replay.dot_cancel();
        let prompt = Prompt::Search {
            direction,
            count,
            origin: self.cursor.position(),
            scroll: self.scroll,
        };
        self.open_prompt(prompt);
    }

    /// `d/`, `c?` and friends: the operator waits in
    /// [`Pending::AwaitingSearch`] until the prompt closes.
    pub(super) fn open_operator_search(&mut self, op: PendingOp, direction: SearchDirection) {
        let motion_count = self.count.take();
        self.replay.dot_merge_count(motion_count);
        let origin = self.cursor.position();
        let prompt = Prompt::Search {
            direction,
            count: 1,
            origin,
            scroll: self.scroll,
        };
        self.open_prompt(prompt);
        self.pending = Pending::AwaitingSearch(OperatorSearch {
            op,
            motion_count,
            register: self.register,
            origin,
            direction,
        });
    }

    /// A confirmed `/` or `?` prompt. An empty pattern repeats the last one.
    pub(super) fn search_command(&mut self, input: &str, direction: SearchDirection, count: usize) {
        let waiting = match self.pending {
            Pending::AwaitingSearch(search) => Some(search),
            _ => None,
        };
        self.pending = Pending::Idle;
        let pattern = if input.is_empty() {
            match self.search.pattern.clone() {
                Some(pattern) => pattern,
                None => {
                    self.report(&EngineError::NoPreviousPattern);
                    self.fail();
                    return;
                }
            }
        } else {
            input.to_string()
        };
        debug!(target: "engine.search", pattern = %pattern, ?direction, count, "search");
        self.search.pattern = Some(pattern.clone());
        self.search.direction = direction;
        self.search.highlight = true;
        match waiting {
            Some(search) => self.operator_search(search, &pattern),
            None => {
                let from = self.cursor.position();
                let found = self
                    .compile_search(&pattern)
                    .and_then(|re| self.find_match(&re, &pattern, direction, from, count));
                self.finish_search(found, &pattern, direction);
            }
        }
    }

    /// `n` / `N`: the last search again, `N` the other way.
    pub(super) fn search_next(&mut self, reverse: bool, count: usize) {
        let Some(pattern) = self.search.pattern.clone() else {
            self.report(&EngineError::NoPreviousPattern);
            self.fail();
            return;
        };
        let direction = if reverse {
            self.search.direction.opposite()
        } else {
            self.search.direction
        };
        self.search.highlight = true;
        let from = self.cursor.position();
        let found = self
            .compile_search(&pattern)
            .and_then(|re| self.find_match(&re, &pattern, direction, from, count));
        self.finish_search(found, &pattern, direction);
    }

    /// `*` / `#`: the word under the cursor as a whole word. `smartcase`
    /// does not apply.
    pub(super) fn search_word(&mut self, direction: SearchDirection, count: usize) {
        let (pattern, start) = match search::word_pattern(&self.buffer, self.cursor.position()) {
            Ok(found) => found,
            Err(err) => {
                self.report(&err);
                self.fail();
                return;
            }
        };
        self.search.pattern = Some(pattern.clone());
        self.search.direction = direction;
        self.search.highlight = true;
        let case = CaseOptions {
            ignorecase: self.options.ignorecase,
            smartcase: false,
        };
        let found = search::compile(&pattern, case)
            .and_then(|re| self.find_match(&re, &pattern, direction, start, count));
        self.finish_search(found, &pattern, direction);
    }

    /// `dn`, `cN`: the next match is an exclusive motion.
    pub(super) fn operator_search_next(
        &mut self,
        op: PendingOp,
        reverse: bool,
        motion_count: Option<usize>,
    ) {
        let Some(pattern) = self.search.pattern.clone() else {
            self.report(&EngineError::NoPreviousPattern);
            self.fail();
            return;
        };
        let direction = if reverse {
            self.search.direction.opposite()
        } else {
            self.search.direction
        };
        self.replay.dot_merge_count(motion_count);
        let search = OperatorSearch {
            op,
            motion_count,
            register: self.register,
            origin: self.cursor.position(),
            direction,
        };
        self.search.highlight = true;
        self.operator_search(search, &pattern);
    }

    fn operator_search(&mut self, search: OperatorSearch, pattern: &str) {
        let count = merge_counts(search.op.count, search.motion_count).unwrap_or(1);
        self.register = search.register;
        let found = self
            .compile_search(pattern)
            .and_then(|re| self.find_match(&re, pattern, search.direction, search.origin, count));
        match found {
            Ok(found) => {
                if found.wrapped {
                    self.set_message(wrap_message(search.direction));
                }
                let to = found.found.start;
                let result = MotionResult {
                    pos: to,
                    inclusive: false,
                    linewise: false,
                    exclusive: false,
                    moved: to != search.origin,
                    vcol: Vcol::Recompute,
                };
                let extent = operator::extent(&self.buffer, search.op.op, search.origin, &result);
                self.apply_operator(search.op.op, extent, search.origin);
            }
            Err(err) => {
                self.report(&err);
                self.fail();
            }
        }
    }

    // -- Matching -------------------------------------------------------------

    fn compile_search(&self, pattern: &str) -> EngineResult<Regex> {
        search::compile(pattern, self.options.case())
    }

    /// The `count`th match from `from`. Without `wrapscan` the error names
    /// the buffer edge the scan stopped at.
    fn find_match(
        &self,
        re: &Regex,
        pattern: &str,
        direction: SearchDirection,
        from: Position,
        count: usize,
    ) -> EngineResult<Found> {
        let wrap = self.options.wrapscan;
        let mut pos = from;
        let mut wrapped = false;
        let mut last = None;
        for _ in 0..count.max(1) {
            let Some(found) = search::find(&self.buffer, re, pos, direction, wrap) else {
                return Err(match (wrap, direction) {
                    (true, _) => EngineError::PatternNotFound(pattern.to_string()),
                    (false, SearchDirection::Forward) => {
                        EngineError::HitBottom(pattern.to_string())
                    }
                    (false, SearchDirection::Backward) => EngineError::HitTop(pattern.to_string()),
                });
            };
            wrapped |= found.wrapped;
            pos = found.found.start;
            last = Some(found.found);
        }
        last.map(|found| Found { found, wrapped })
            .ok_or_else(|| EngineError::PatternNotFound(pattern.to_string()))
    }

    /// Move to a found match and echo the search, or report the failure.
    fn finish_search(
        &mut self,
        found: EngineResult<Found>,
        pattern: &str,
        direction: SearchDirection,
    ) {
        match found {
            Ok(found) => {
                self.push_jump();
                self.cursor.set(found.found.start, &self.buffer);
                if found.wrapped {
                    self.set_message(wrap_message(direction));
                } else {
                    // Echoed, never a hit-enter prompt.
                    self.message = Some(format!("{}{pattern}", direction.prompt()));
                }
            }
            Err(err) => {
                self.report(&err);
                self.fail();
            }
        }
    }

    /// With `incsearch`, show the match for the pattern typed so far.
    pub(super) fn preview_search(&mut self) {
        let Prompt::Search {
            direction,
            count,
            origin,
            scroll,
        } = self.prompt
        else {
            return;
        };
        if self.mode != Mode::CommandLine || !self.options.incsearch {
            return;
        }
        self.cursor.set_keep_vcol(origin);
        self.scroll = scroll;
        self.preview = None;
        let pattern = self.cmdline.input().to_string();
        if pattern.is_empty() {
            return;
        }
        let found = self
            .compile_search(&pattern)
            .and_then(|re| self.find_match(&re, &pattern, direction, origin, count));
        if let Ok(found) = found {
            self.preview = Some(found.found);
            self.cursor.set_keep_vcol(found.found.start);
        }
    }

    /// The match a presentation layer would highlight.
    pub(super) fn highlighted_match(&self) -> Option<Match> {
        if self.mode == Mode::CommandLine && self.preview.is_some() {
            return self.preview;
        }
        if !self.options.hlsearch || !self.search.highlight {
            return None;
        }
        let pattern = self.search.pattern.as_deref()?;
        let re = self.compile_search(pattern).ok()?;
        search::match_at_or_after(&self.buffer, &re, self.cursor.position())
    }
}

const fn wrap_message(direction: SearchDirection) -> &'static str {
    match direction {
        SearchDirection::Forward => WRAPPED_TO_TOP,
        SearchDirection::Backward => WRAPPED_TO_BOTTOM,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::config::EngineConfig;
    use crate::engine::Engine;
    use crate::engine::tests::{engine_with, feed, lines, p};
    use crate::mode::Mode;
    use crate::search::Match;

    // ── Prompt ───────────────────────────────────────────────────────────

    #[test]
    fn slash_finds_next_match() {
        let mut e = engine_with("foo bar\nbaz bar");
        feed(&mut e, "/bar<CR>");
        assert_eq!(e.cursor(), p(0, 4));
        assert_eq!(e.snapshot().status, "/bar");
        feed(&mut e, "n");
        assert_eq!(e.cursor(), p(1, 4));
        feed(&mut e, "N");
        assert_eq!(e.cursor(), p(0, 4));
        assert_eq!(e.snapshot().status, "?bar");
    }

    #[test]
    fn question_searches_backward_and_wraps() {
        let mut e = engine_with("one\ntwo\none");
        feed(&mut e, "?one<CR>");
        assert_eq!(e.cursor(), p(2, 0));
        assert_eq!(e.snapshot().status, "search hit TOP, continuing at BOTTOM");
        feed(&mut e, "n");
        assert_eq!(e.cursor(), p(0, 0));
    }

    #[test]
    fn forward_wrap_message() {
        let mut e = engine_with("x\nab\nx");
        feed(&mut e, "G/x<CR>");
        assert_eq!(e.cursor(), p(0, 0));
        assert_eq!(e.snapshot().status, "search hit BOTTOM, continuing at TOP");
    }

    #[test]
    fn count_skips_matches() {
        let mut e = engine_with("a a a a");
        feed(&mut e, "3/a<CR>");
        assert_eq!(e.cursor(), p(0, 6));
    }

    #[test]
    fn empty_pattern_reuses_last() {
        let mut e = engine_with("ab ab ab");
        feed(&mut e, "/b<CR>/<CR>");
        assert_eq!(e.cursor(), p(0, 4));
    }

    #[test]
    fn missing_pattern_reports_e486() {
        let mut e = engine_with("abc");
        feed(&mut e, "l/zzz<CR>");
        assert_eq!(e.snapshot().status, "E486: Pattern not found: zzz");
        assert_eq!(e.cursor(), p(0, 1));
    }

    #[test]
    fn nowrapscan_stops_at_edges() {
        let mut e = engine_with("x\ny");
        feed(&mut e, ":set nows<CR>j/x<CR>");
        assert_eq!(e.snapshot().status, "E385: Search hit BOTTOM without match for: x");
        assert_eq!(e.cursor(), p(1, 0));
        feed(&mut e, "gg?y<CR>");
        assert_eq!(e.snapshot().status, "E384: Search hit TOP without match for: y");
    }

    #[test]
    fn n_without_pattern_reports_e35() {
        let mut e = engine_with("abc");
        feed(&mut e, "n");
        assert_eq!(e.snapshot().status, "E35: No previous regular expression");
    }

    #[test]
    fn escape_restores_cursor() {
        let mut e = engine_with("abc\nxyz");
        feed(&mut e, ":set is<CR>/xy");
        assert_eq!(e.cursor(), p(1, 0));
        assert_eq!(e.snapshot().search_match, Some(Match { start: p(1, 0), len: 2 }));
        feed(&mut e, "<Esc>");
        assert_eq!(e.cursor(), p(0, 0));
        assert_eq!(e.mode(), Mode::Normal);
    }

    #[test]
    fn long_not_found_message_prompts() {
        let mut config = EngineConfig::default();
        config.columns = 20;
        let mut e = Engine::with_config(config);
        e.load_file("abc");
        feed(&mut e, "/nothing-here<CR>");
        assert!(e.snapshot().prompt);
        feed(&mut e, "<Space>");
        assert!(!e.snapshot().prompt);
        assert_eq!(e.cursor(), p(0, 0));
    }

    #[test]
    fn ignorecase_and_smartcase() {
        let mut e = engine_with("Foo foo");
        feed(&mut e, ":set ic scs<CR>/foo<CR>");
        assert_eq!(e.cursor(), p(0, 4));
        feed(&mut e, "/Foo<CR>");
        assert_eq!(e.cursor(), p(0, 0));
    }

    // ── Star ─────────────────────────────────────────────────────────────

    #[test]
    fn star_and_hash_match_whole_words() {
        let mut e = engine_with("foo food foo");
        feed(&mut e, "*");
        assert_eq!(e.cursor(), p(0, 9));
        assert_eq!(e.snapshot().status, "/\\<foo\\>");
        feed(&mut e, "#");
        assert_eq!(e.cursor(), p(0, 0));
    }

    #[test]
    fn star_on_blank_line_fails() {
        let mut e = engine_with("   \nfoo");
        feed(&mut e, "*");
        assert_eq!(e.snapshot().status, "E348: No string under cursor");
    }

    // ── Highlight ────────────────────────────────────────────────────────

    #[test]
    fn highlight_follows_cursor_until_noh() {
        let mut e = engine_with("ab ab");
        feed(&mut e, "/ab<CR>");
        assert_eq!(e.snapshot().search_match, Some(Match { start: p(0, 3), len: 2 }));
        feed(&mut e, ":noh<CR>");
        assert_eq!(e.snapshot().search_match, None);
        feed(&mut e, "n");
        assert_eq!(e.snapshot().search_match, Some(Match { start: p(0, 0), len: 2 }));
    }

    // ── Operators ────────────────────────────────────────────────────────

    #[test]
    fn delete_to_search_match() {
        let mut e = engine_with("one two three");
        feed(&mut e, "d/thr<CR>");
        assert_eq!(lines(&e), vec!["three"]);
        assert_eq!(e.mode(), Mode::Normal);
    }

    #[test]
    fn operator_search_not_found_cancels() {
        let mut e = engine_with("one two");
        feed(&mut e, "d/zzz<CR>");
        assert_eq!(lines(&e), vec!["one two"]);
        feed(&mut e, "w");
        assert_eq!(e.cursor(), p(0, 4));
    }

    #[test]
    fn operator_search_cancel_clears_pending() {
        let mut e = engine_with("one two");
        feed(&mut e, "c/two<Esc>w");
        assert_eq!(lines(&e), vec!["one two"]);
        assert_eq!(e.mode(), Mode::Normal);
        assert_eq!(e.cursor(), p(0, 4));
    }

    #[test]
    fn backward_operator_search_and_dot() {
        let mut e = engine_with("a x b x c");
        feed(&mut e, "$d?x<CR>");
        assert_eq!(lines(&e), vec!["a x b c"]);
        feed(&mut e, "$.");
        assert_eq!(lines(&e), vec!["a c"]);
    }

    #[test]
    fn dn_deletes_to_next_match() {
        let mut e = engine_with("ab cd ab");
        feed(&mut e, "/ab<CR>0dn");
        assert_eq!(lines(&e), vec!["ab"]);
    }
}
