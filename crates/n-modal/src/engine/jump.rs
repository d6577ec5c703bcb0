//! Jump list (`Ctrl-O`, `Ctrl-I`) and change list (`g;`, `g,`) navigation.

use tracing::trace;

use super::Engine;
use crate::error::EngineError;
use crate::position::Position;

impl Engine {
    /// Remember the cursor before a jump: the jump list and the `''` mark.
    pub(super) fn push_jump(&mut self) {
        let pos = self.cursor.position();
        self.marks.set_context(pos);
        self.jumps.push(pos);
    }

    pub(super) fn jump_back(&mut self, count: usize) {
        let live = self.cursor.position();
        match self.jumps.back(live, count) {
            Some(pos) => self.jump_to(pos),
            None => self.fail(),
        }
    }

    pub(super) fn jump_forward(&mut self, count: usize) {
        match self.jumps.forward(count) {
            Some(pos) => self.jump_to(pos),
            None => self.fail(),
        }
    }

    pub(super) fn change_back(&mut self, count: usize) {
        if self.changes.is_empty() {
            self.report(&EngineError::ChangeListEmpty);
            self.fail();
            return;
        }
        let live = self.cursor.position();
        match self.changes.back(live, count) {
            Some(pos) => self.jump_to(pos),
            None => {
                self.report(&EngineError::ChangeListStart);
                self.fail();
            }
        }
    }

    pub(super) fn change_forward(&mut self, count: usize) {
        if self.changes.is_empty() {
            self.report(&EngineError::ChangeListEmpty);
            self.fail();
            return;
        }
        match self.changes.forward(count) {
            Some(pos) => self.jump_to(pos),
            None => {
                self.report(&EngineError::ChangeListEnd);
                self.fail();
            }
        }
    }

    /// Entries can point past text deleted since they were recorded.
    fn jump_to(&mut self, pos: Position) {
        trace!(target: "engine.key", %pos, "list jump");
        self.place_cursor(pos, false);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::engine::tests::{engine_with, feed, p};

    #[test]
    fn ctrl_o_and_tab_walk_jumps() {
        let mut e = engine_with("a\nb\nc\nd");
        feed(&mut e, "Ggg");
        assert_eq!(e.cursor(), p(0, 0));
        feed(&mut e, "<C-o>");
        assert_eq!(e.cursor(), p(3, 0));
        feed(&mut e, "<C-o>");
        assert_eq!(e.cursor(), p(0, 0));
        feed(&mut e, "<Tab>");
        assert_eq!(e.cursor(), p(3, 0));
        feed(&mut e, "<C-i>");
        assert_eq!(e.cursor(), p(0, 0));
    }

    #[test]
    fn ctrl_o_with_no_jumps_stays() {
        let mut e = engine_with("a\nb");
        feed(&mut e, "j<C-o>");
        assert_eq!(e.cursor(), p(1, 0));
    }

    #[test]
    fn backtick_backtick_returns_before_jump() {
        let mut e = engine_with("abc\nx\ny");
        feed(&mut e, "llG``");
        assert_eq!(e.cursor(), p(0, 2));
    }

    #[test]
    fn change_list_walks_edits() {
        let mut e = engine_with("a\nb\nc\nd");
        feed(&mut e, "xGx");
        feed(&mut e, "g;");
        assert_eq!(e.cursor(), p(3, 0));
        feed(&mut e, "g;");
        assert_eq!(e.cursor(), p(0, 0));
        feed(&mut e, "g,");
        assert_eq!(e.cursor(), p(3, 0));
    }

    #[test]
    fn change_list_errors() {
        let mut e = engine_with("a\nb");
        feed(&mut e, "g;");
        assert_eq!(e.snapshot().status, "E664: changelist is empty");
        feed(&mut e, "xg;g;g;");
        assert_eq!(e.snapshot().status, "E662: At start of changelist");
        feed(&mut e, "g,g,g,");
        assert_eq!(e.snapshot().status, "E663: At end of changelist");
    }
}
