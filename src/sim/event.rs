/// Events emitted during a simulation step.
/// The session turns these into status messages; tests assert on them.

use crate::domain::input::MoveDir;
use crate::domain::rules::Rule;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Moved { dir: MoveDir },
    Blocked { dir: MoveDir },
    Won,
    Lost,
    RuleEnforced(Rule),
    RuleRevoked(Rule),
    Undone,
    UndoUnderflow,
}
