/// Keyboard input.
///
/// Every key press becomes one `Action`. Actions are queued and the game
/// loop consumes one simulation action per tick, so a quick double tap
/// moves twice instead of being merged into one tick. Meta actions (quit,
/// restart) are handled by the loop as soon as they arrive.
///
/// Key map:
///   Arrows / WASD        move
///   Ctrl-Z, U, Backspace undo
///   R                    restart level
///   Esc, Q, Ctrl-C       quit

use std::collections::VecDeque;
use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::input::{Controls, MoveDir};

/// Held keys auto-repeat; don't let a long hold build up a backlog.
const MAX_PENDING: usize = 4;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Move(MoveDir),
    Undo,
    Restart,
    Quit,
}

impl Action {
    /// Simulation input for this action; `None` for meta actions.
    pub fn controls(self) -> Option<Controls> {
        match self {
            Action::Move(dir) => Some(Controls::moving(dir)),
            Action::Undo => Some(Controls::undo()),
            Action::Restart | Action::Quit => None,
        }
    }
}

pub fn action_for(key: &KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('z') | KeyCode::Char('Z') => Some(Action::Undo),
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Action::Quit),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Action::Move(MoveDir::Left)),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Action::Move(MoveDir::Right)),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Action::Move(MoveDir::Up)),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Action::Move(MoveDir::Down)),
        KeyCode::Backspace | KeyCode::Char('u') | KeyCode::Char('U') => Some(Action::Undo),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Action::Restart),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(Action::Quit),
        _ => None,
    }
}

pub struct InputState {
    /// Simulation actions waiting for a tick.
    pending: VecDeque<Action>,
    /// Meta actions seen during the most recent drain.
    meta: Vec<Action>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            pending: VecDeque::with_capacity(MAX_PENDING),
            meta: Vec::with_capacity(4),
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.meta.clear();
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.feed(&key);
            }
        }
    }

    pub fn feed(&mut self, key: &KeyEvent) {
        let Some(action) = action_for(key) else { return };
        match action {
            Action::Quit | Action::Restart => self.meta.push(action),
            _ if self.pending.len() < MAX_PENDING => self.pending.push_back(action),
            _ => {}
        }
    }

    pub fn quit_pressed(&self) -> bool {
        self.meta.contains(&Action::Quit)
    }

    pub fn restart_pressed(&self) -> bool {
        self.meta.contains(&Action::Restart)
    }

    /// Input for the next tick: the oldest queued action, or idle.
    pub fn next_controls(&mut self) -> Controls {
        self.pending
            .pop_front()
            .and_then(Action::controls)
            .unwrap_or_default()
    }

    /// Drop queued moves (after a restart or level change).
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn key_map() {
        assert_eq!(action_for(&key(KeyCode::Left)), Some(Action::Move(MoveDir::Left)));
        assert_eq!(action_for(&key(KeyCode::Char('w'))), Some(Action::Move(MoveDir::Up)));
        assert_eq!(action_for(&key(KeyCode::Char('S'))), Some(Action::Move(MoveDir::Down)));
        assert_eq!(action_for(&ctrl('z')), Some(Action::Undo));
        assert_eq!(action_for(&key(KeyCode::Backspace)), Some(Action::Undo));
        assert_eq!(action_for(&ctrl('c')), Some(Action::Quit));
        assert_eq!(action_for(&key(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(action_for(&key(KeyCode::Char('r'))), Some(Action::Restart));
        assert_eq!(action_for(&ctrl('s')), None);
        assert_eq!(action_for(&key(KeyCode::Char('z'))), None);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut k = key(KeyCode::Left);
        k.kind = KeyEventKind::Release;
        assert_eq!(action_for(&k), None);
    }

    #[test]
    fn one_action_per_tick_in_order() {
        let mut input = InputState::new();
        input.feed(&key(KeyCode::Right));
        input.feed(&ctrl('z'));
        assert_eq!(input.next_controls(), Controls::moving(MoveDir::Right));
        assert_eq!(input.next_controls(), Controls::undo());
        assert_eq!(input.next_controls(), Controls::default());
    }

    #[test]
    fn backlog_is_capped() {
        let mut input = InputState::new();
        for _ in 0..10 {
            input.feed(&key(KeyCode::Down));
        }
        let moves = (0..10)
            .filter(|_| input.next_controls() != Controls::default())
            .count();
        assert_eq!(moves, MAX_PENDING);
    }

    #[test]
    fn meta_keys_skip_the_queue() {
        let mut input = InputState::new();
        input.feed(&key(KeyCode::Char('q')));
        input.feed(&key(KeyCode::Char('r')));
        assert!(input.quit_pressed());
        assert!(input.restart_pressed());
        assert_eq!(input.next_controls(), Controls::default());
    }
}
