/// Undo history: a stack of full-state snapshots.
///
/// ## Snapshot
///
/// A snapshot is a value copy of everything a tick can mutate: the actor
/// arena, the Is handles, the player handle, the rule set and the running
/// flag. Actors are plain `Copy` data addressed by index, so a snapshot
/// never aliases the live state or another snapshot.
///
/// ## Policy
///
///   - Captured *before* a move, pushed only if the move went through and
///     did not win the game. A losing move is pushed, so it can be undone.
///   - Undo restores the whole state (not an inverse action).
///   - Undo on an empty stack is `HistoryError::Underflow`; the live state
///     is left untouched.
///   - The stack is unbounded.

use thiserror::Error;

use crate::domain::actor::{Actor, ActorId};
use crate::domain::rules::Rule;
use crate::sim::world::GameState;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    #[error("nothing to undo")]
    Underflow,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub actors: Vec<Option<Actor>>,
    pub is_tiles: Vec<ActorId>,
    pub player: Option<ActorId>,
    pub rules: Vec<Rule>,
    pub running: bool,
}

/// Capture a full snapshot from the current state.
pub fn capture_snapshot(s: &GameState) -> Snapshot {
    Snapshot {
        actors: s.actors.clone(),
        is_tiles: s.is_tiles.clone(),
        player: s.player,
        rules: s.rules.clone(),
        running: s.running,
    }
}

/// Overwrite the mutable parts of `s` with the snapshot.
pub fn restore_snapshot(s: &mut GameState, snap: Snapshot) {
    s.actors = snap.actors;
    s.is_tiles = snap.is_tiles;
    s.player = snap.player;
    s.rules = snap.rules;
    s.running = snap.running;
}

#[derive(Clone, Debug, Default)]
pub struct History {
    stack: Vec<Snapshot>,
}

impl History {
    pub fn new() -> Self {
        History { stack: Vec::new() }
    }

    pub fn push(&mut self, snap: Snapshot) {
        self.stack.push(snap);
    }

    pub fn pop(&mut self) -> Result<Snapshot, HistoryError> {
        self.stack.pop().ok_or(HistoryError::Underflow)
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }

    /// Pop the latest snapshot into `s`.
    pub fn undo(&mut self, s: &mut GameState) -> Result<(), HistoryError> {
        let snap = self.pop()?;
        restore_snapshot(s, snap);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actor::Noun;
    use crate::domain::input::MoveDir;
    use crate::sim::level::state_from_rows;

    fn state() -> GameState {
        let mut s = state_from_rows(&[
            "MIY.",
            "1...",
        ]).unwrap();
        s.update_rules();
        s
    }

    #[test]
    fn snapshot_is_independent_of_live_state() {
        let mut s = state();
        let snap = capture_snapshot(&s);
        s.move_player(MoveDir::Right);
        s.rules.clear();
        s.running = false;
        let meepo = s.ids_of(Noun::Meepo)[0];
        s.remove(meepo);

        assert_eq!(snap.rules.len(), 1);
        assert!(snap.running);
        let a = snap.actors[meepo.0].unwrap();
        assert_eq!((a.x, a.y), (0, 1));
    }

    #[test]
    fn restoring_does_not_link_state_to_history() {
        let mut s = state();
        let mut h = History::new();
        h.push(capture_snapshot(&s));
        h.push(capture_snapshot(&s));
        h.undo(&mut s).unwrap();
        s.move_player(MoveDir::Right);
        let snap = h.pop().unwrap();
        let meepo = s.player.unwrap();
        assert_eq!(snap.actors[meepo.0].unwrap().x, 0);
        assert_eq!(s.actor(meepo).unwrap().x, 1);
    }

    #[test]
    fn undo_restores_everything() {
        let mut s = state();
        let mut h = History::new();
        let before = capture_snapshot(&s);
        h.push(before.clone());
        s.move_player(MoveDir::Down);
        s.running = false;
        s.player = None;
        h.undo(&mut s).unwrap();
        assert_eq!(capture_snapshot(&s), before);
        assert!(h.is_empty());
    }

    #[test]
    fn underflow_leaves_state_alone() {
        let mut s = state();
        let mut h = History::new();
        let before = capture_snapshot(&s);
        assert_eq!(h.undo(&mut s), Err(HistoryError::Underflow));
        assert_eq!(capture_snapshot(&s), before);
        assert_eq!(HistoryError::Underflow.to_string(), "nothing to undo");
    }
}
