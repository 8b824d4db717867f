/// Play session: the level list, the level in play and its undo history.
///
/// The session owns everything above a single tick: loading and restarting
/// levels, advancing after a win, and turning step events into the status
/// line. Timers count ticks, not wall time.

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::input::Controls;
use super::event::GameEvent;
use super::history::History;
use super::level::{LevelDef, MapError, SymbolTable};
use super::step;
use super::world::GameState;

/// Ticks the "cleared" banner stays up before the next level loads.
pub const ADVANCE_DELAY_TICKS: u32 = 40;
const MESSAGE_TICKS: u32 = 40;
const NO_PLAYER_HINT: &str = "Nothing is You. Ctrl-Z to undo, R to restart";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no levels to play")]
    NoLevels,
    #[error("level {index} ({name}): {source}")]
    Map {
        index: usize,
        name: String,
        #[source]
        source: MapError,
    },
}

pub struct Session {
    levels: Vec<LevelDef>,
    table: SymbolTable,
    pub level_index: usize,
    pub state: GameState,
    pub history: History,
    pub moves: u32,
    pub message: String,
    pub message_timer: u32,
    /// Ticks left before the next level loads; `Some` only after a win.
    pub advance_timer: Option<u32>,
    /// Every level has been cleared.
    pub finished: bool,
}

impl Session {
    /// Load level `start` (clamped to the list).
    pub fn new(levels: Vec<LevelDef>, start: usize, table: SymbolTable) -> Result<Self, SessionError> {
        if levels.is_empty() {
            return Err(SessionError::NoLevels);
        }
        let index = start.min(levels.len() - 1);
        let state = build_level(&levels, index, &table)?;
        let mut session = Session {
            levels,
            table,
            level_index: index,
            state,
            history: History::new(),
            moves: 0,
            message: String::new(),
            message_timer: 0,
            advance_timer: None,
            finished: false,
        };
        session.announce_level();
        Ok(session)
    }

    pub fn level_name(&self) -> &str {
        &self.levels[self.level_index].name
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn set_message(&mut self, text: &str, ticks: u32) {
        self.message = text.to_string();
        self.message_timer = ticks;
    }

    /// One simulation tick.
    pub fn tick(&mut self, input: Controls) -> Result<Vec<GameEvent>, SessionError> {
        let mut events = vec![];

        if let Some(left) = self.advance_timer {
            if left <= 1 {
                self.advance()?;
            } else {
                self.advance_timer = Some(left - 1);
            }
        } else if !self.finished {
            events = step::step(&mut self.state, &mut self.history, input);
            self.absorb(&events);
        }

        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
            }
        }
        if self.state.running && self.state.player.is_none() && self.message.is_empty() {
            self.set_message(NO_PLAYER_HINT, 0);
        }
        Ok(events)
    }

    /// Reload the current level from its map.
    pub fn restart(&mut self) -> Result<(), SessionError> {
        self.load(self.level_index)?;
        self.set_message("Level restarted", MESSAGE_TICKS);
        Ok(())
    }

    fn advance(&mut self) -> Result<(), SessionError> {
        self.advance_timer = None;
        if self.level_index + 1 < self.levels.len() {
            self.load(self.level_index + 1)?;
            self.announce_level();
        } else {
            info!("all levels cleared");
            self.finished = true;
            self.set_message("All levels cleared! Press Q to quit", 0);
        }
        Ok(())
    }

    fn load(&mut self, index: usize) -> Result<(), SessionError> {
        self.state = build_level(&self.levels, index, &self.table)?;
        self.level_index = index;
        self.history.clear();
        self.moves = 0;
        self.advance_timer = None;
        self.finished = false;
        Ok(())
    }

    fn announce_level(&mut self) {
        let text = format!("Level {}: {}", self.level_index + 1, self.level_name());
        info!(level = self.level_index, name = %self.level_name(), "level loaded");
        self.set_message(&text, MESSAGE_TICKS);
    }

    fn absorb(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::Moved { .. } => self.moves += 1,
                GameEvent::Won => {
                    self.advance_timer = Some(ADVANCE_DELAY_TICKS);
                    self.set_message("Level cleared!", ADVANCE_DELAY_TICKS);
                }
                GameEvent::Lost => {
                    self.set_message("Destroyed! Ctrl-Z to undo, R to restart", 0);
                }
                GameEvent::RuleEnforced(rule) => {
                    let text = format!("{rule}");
                    self.set_message(&text, MESSAGE_TICKS);
                }
                GameEvent::RuleRevoked(rule) => {
                    let text = format!("{rule}: broken");
                    self.set_message(&text, MESSAGE_TICKS);
                }
                GameEvent::Undone => {
                    self.moves = self.moves.saturating_sub(1);
                    if self.message_timer == 0 {
                        self.message.clear();
                    }
                }
                GameEvent::UndoUnderflow => self.set_message("Nothing to undo", MESSAGE_TICKS / 2),
                GameEvent::Blocked { dir } => debug!(?dir, "blocked"),
            }
        }
    }
}

fn build_level(levels: &[LevelDef], index: usize, table: &SymbolTable) -> Result<GameState, SessionError> {
    let def = &levels[index];
    let mut state = def.build(table).map_err(|source| SessionError::Map {
        index,
        name: def.name.clone(),
        source,
    })?;
    state.update_rules();
    Ok(state)
}
