//! Multi-key command state.
//!
//! Vim's Normal-mode grammar is `["x] [count] command [count] [argument]`.
//! Between keys the dispatcher holds exactly one [`Pending`] value saying
//! what the next key completes; counts and the selected register live
//! beside it in the engine.
//!
//! | After      | Pending               | Waits for                        |
//! |------------|-----------------------|----------------------------------|
//! | `"`        | `Register`            | register name                    |
//! | `d`        | `Operator`            | motion, `i`/`a`, `d`, `g`, count |
//! | `dg`       | `OperatorG`           | `g`, `e`, `_`, or a case key     |
//! | `di`       | `TextObject`          | object key                       |
//! | `f`, `df`  | `FindChar`            | target char                      |
//! | `g`        | `G`                   | second key                       |
//! | `z`        | `Scroll`              | `z`, `t`, `b`                    |
//! | `Z`        | `Z`                   | `Z`, `Q`                         |
//! | `m`        | `SetMark`             | mark name                        |
//! | `'`, `` ` ``| `GotoMark`           | mark name                        |
//! | `q`        | `MacroRecord`         | register name                    |
//! | `@`        | `MacroPlay`           | register name or `@`             |
//! | `r`        | `ReplaceChar`         | replacement char                 |
//! | Visual `r` | `VisualReplace`       | replacement char                 |
//! | Visual `i` | `VisualTextObject`    | object key                       |
//! | `d/`       | `AwaitingSearch`      | the search to confirm            |

use crate::motion::FindKind;
use crate::operator::Operator;
use crate::position::Position;
use crate::search::SearchDirection;

/// An operator waiting for its motion, with the count typed before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingOp {
    pub op: Operator,
    pub count: Option<usize>,
}

/// An operator waiting for a `/` or `?` search to confirm. Consumed once,
/// whether the search succeeds, fails or is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorSearch {
    pub op: PendingOp,
    /// The count typed between the operator and `/`.
    pub motion_count: Option<usize>,
    pub register: Option<char>,
    pub origin: Position,
    pub direction: SearchDirection,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Pending {
    #[default]
    Idle,
    Register,
    Operator(PendingOp),
    OperatorG(PendingOp),
    TextObject { op: PendingOp, inner: bool },
    /// `count` is the motion's own count (`d2fx`).
    FindChar {
        kind: FindKind,
        op: Option<PendingOp>,
        count: Option<usize>,
    },
    G { count: Option<usize> },
    Scroll { count: Option<usize> },
    Z,
    SetMark,
    GotoMark { exact: bool, op: Option<PendingOp> },
    MacroRecord,
    MacroPlay { count: usize },
    ReplaceChar { count: usize },
    VisualReplace,
    VisualTextObject { inner: bool, count: Option<usize> },
    AwaitingSearch(OperatorSearch),
}

impl Pending {
    #[must_use]
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }

    /// The operator this state belongs to, if any.
    #[must_use]
    pub const fn operator(self) -> Option<PendingOp> {
        match self {
            Self::Operator(op) | Self::OperatorG(op) | Self::TextObject { op, .. } => Some(op),
            Self::FindChar { op, .. } | Self::GotoMark { op, .. } => op,
            Self::AwaitingSearch(search) => Some(search.op),
            _ => None,
        }
    }

    /// States in which digits extend the count instead of completing the
    /// command.
    #[must_use]
    pub const fn takes_count(self) -> bool {
        matches!(self, Self::Idle | Self::Operator(_))
    }
}
