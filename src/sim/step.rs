/// The step function: advances a level by one tick.
///
/// Processing order:
///   1. Undo (if requested, replaces the rest of the input)
///   2. Player move through the push resolver
///   3. Win / lose check on the player's cell
///   4. History push (pre-move snapshot, unless the move won)
///   5. Rule scan, reconcile, enforce / revoke
///
/// Rules are re-derived every tick, including ticks with no input, so the
/// board is always the single source of truth.

use tracing::debug;

use crate::domain::input::Controls;
use super::event::GameEvent;
use super::history::{capture_snapshot, History};
use super::world::{GameState, Outcome};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(state: &mut GameState, history: &mut History, input: Controls) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();

    if input.undo {
        resolve_undo(state, history, &mut events);
    } else {
        resolve_player_move(state, history, input, &mut events);
    }

    resolve_rules(state, &mut events);
    events
}

// ══════════════════════════════════════════════════════════════
// Undo
// ══════════════════════════════════════════════════════════════

fn resolve_undo(state: &mut GameState, history: &mut History, events: &mut Vec<GameEvent>) {
    match history.undo(state) {
        Ok(()) => {
            debug!(depth = history.len(), "undo");
            events.push(GameEvent::Undone);
        }
        Err(e) => {
            debug!(error = %e, "undo ignored");
            events.push(GameEvent::UndoUnderflow);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Player movement
// ══════════════════════════════════════════════════════════════

fn resolve_player_move(
    state: &mut GameState,
    history: &mut History,
    input: Controls,
    events: &mut Vec<GameEvent>,
) {
    if !state.running || state.player.is_none() {
        return;
    }
    let Some(dir) = input.direction() else { return };

    let saved = capture_snapshot(state);
    if !state.move_player(dir) {
        debug!(?dir, "move blocked");
        events.push(GameEvent::Blocked { dir });
        return;
    }
    debug!(?dir, "player moved");
    events.push(GameEvent::Moved { dir });

    match state.check_outcome() {
        Outcome::Won => events.push(GameEvent::Won),
        Outcome::Lost => {
            events.push(GameEvent::Lost);
            history.push(saved);
        }
        Outcome::Continue => history.push(saved),
    }
}

// ══════════════════════════════════════════════════════════════
// Rules
// ══════════════════════════════════════════════════════════════

fn resolve_rules(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let changes = state.update_rules();
    events.extend(changes.revoked.into_iter().map(GameEvent::RuleRevoked));
    events.extend(changes.enforced.into_iter().map(GameEvent::RuleEnforced));
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
