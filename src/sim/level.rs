/// Level loader.
///
/// ## Sources (priority order):
///   1. `maps_dir/` directory (individual `.txt` files, sorted by filename)
///   2. Built-in embedded levels
///
/// ## Level file format (`.txt`):
///   Optional line 1: `# Level Name`
///   Remaining lines: map rows, one character per cell.
///   Short rows are padded with empty cells.
///
/// ## Symbol legend (default table):
///   '1' = Meepo   '2' = Wall    '3' = Rock    '4' = Flag    '5' = Bush
///   'M' = "Meepo" 'W' = "Wall"  'R' = "Rock"  'F' = "Flag"  'B' = "Bush"
///   'Y' = "You"   'P' = "Push"  'S' = "Stop"  'V' = "Victory"  'L' = "Lose"
///   'I' = "is"    '.' / ' ' = Empty
///
/// Any other symbol is a load error: skipping it would shift the row.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::GameConfig;
use crate::domain::actor::{Actor, Noun, Property};
use crate::domain::grid::Grid;
use crate::sim::world::GameState;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("map has no rows")]
    Empty,
    #[error("unknown map symbol {symbol:?} at row {row}, column {col}")]
    UnknownSymbol { symbol: char, row: usize, col: usize },
    #[error("row {row} is {found} cells wide, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },
}

/// What a map symbol turns into.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Spawn {
    Empty,
    Character(Noun),
    Subject(Noun),
    Attribute(Property),
    Is,
}

impl Spawn {
    fn actor(self, x: usize, y: usize) -> Option<Actor> {
        match self {
            Spawn::Empty => None,
            Spawn::Character(n) => Some(Actor::character(x, y, n)),
            Spawn::Subject(n) => Some(Actor::subject(x, y, n)),
            Spawn::Attribute(p) => Some(Actor::attribute(x, y, p)),
            Spawn::Is => Some(Actor::is(x, y)),
        }
    }
}

/// Symbol → spawn lookup.
#[derive(Clone, Debug)]
pub struct SymbolTable {
    spawns: HashMap<char, Spawn>,
}

impl SymbolTable {
    pub fn get(&self, symbol: char) -> Option<Spawn> {
        self.spawns.get(&symbol).copied()
    }

    pub fn insert(&mut self, symbol: char, spawn: Spawn) {
        self.spawns.insert(symbol, spawn);
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        let mut spawns = HashMap::new();
        spawns.insert('.', Spawn::Empty);
        spawns.insert(' ', Spawn::Empty);
        spawns.insert('I', Spawn::Is);
        let nouns = [
            ('1', 'M', Noun::Meepo),
            ('2', 'W', Noun::Wall),
            ('3', 'R', Noun::Rock),
            ('4', 'F', Noun::Flag),
            ('5', 'B', Noun::Bush),
        ];
        for (digit, letter, noun) in nouns {
            spawns.insert(digit, Spawn::Character(noun));
            spawns.insert(letter, Spawn::Subject(noun));
        }
        let properties = [
            ('Y', Property::You),
            ('P', Property::Push),
            ('S', Property::Stop),
            ('V', Property::Victory),
            ('L', Property::Lose),
        ];
        for (letter, property) in properties {
            spawns.insert(letter, Spawn::Attribute(property));
        }
        SymbolTable { spawns }
    }
}

/// Runtime level data (owned strings, loaded from file or embedded).
#[derive(Clone, Debug)]
pub struct LevelDef {
    pub name: String,
    pub rows: Vec<String>,
}

impl LevelDef {
    pub fn build(&self, table: &SymbolTable) -> Result<GameState, MapError> {
        build_state(&symbol_grid(&self.rows), table)
    }
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Turn a symbol grid into a fresh game state (rules not yet scanned).
/// Actors are spawned in row-major order, which fixes the Is scan order.
pub fn build_state(grid: &[Vec<char>], table: &SymbolTable) -> Result<GameState, MapError> {
    let height = grid.len();
    let width = grid.first().map(Vec::len).ok_or(MapError::Empty)?;
    if width == 0 {
        return Err(MapError::Empty);
    }

    let mut state = GameState::new(Grid::new(width, height));
    for (y, row) in grid.iter().enumerate() {
        if row.len() != width {
            return Err(MapError::RaggedRow { row: y, expected: width, found: row.len() });
        }
        for (x, &symbol) in row.iter().enumerate() {
            let spawn = table
                .get(symbol)
                .ok_or(MapError::UnknownSymbol { symbol, row: y, col: x })?;
            if let Some(actor) = spawn.actor(x, y) {
                state.spawn(actor);
            }
        }
    }
    Ok(state)
}

pub fn symbol_grid(rows: &[String]) -> Vec<Vec<char>> {
    rows.iter().map(|r| r.chars().collect()).collect()
}

/// Build from literal rows with the default table.
pub fn state_from_rows(rows: &[&str]) -> Result<GameState, MapError> {
    let grid: Vec<Vec<char>> = rows.iter().map(|r| r.chars().collect()).collect();
    build_state(&grid, &SymbolTable::default())
}

/// All levels: the maps directory if it holds any `.txt` levels, else the
/// built-in set.
pub fn load_levels(config: &GameConfig) -> Vec<LevelDef> {
    let dir = &config.maps_dir;
    if dir.is_dir() {
        let mut levels = load_from_directory(dir);
        if !levels.is_empty() {
            levels.sort_by(|a, b| a.0.cmp(&b.0));
            info!(count = levels.len(), dir = %dir.display(), "levels loaded from directory");
            return levels.into_iter().map(|(_, def)| def).collect();
        }
    }
    embedded_levels()
}

// ══════════════════════════════════════════════════════════════
// Single-level file parsing
// ══════════════════════════════════════════════════════════════

/// Parse a single level from text content.
pub fn parse_level_file(content: &str) -> Option<LevelDef> {
    let mut name = String::new();
    let mut rows: Vec<String> = vec![];

    for line in content.lines() {
        let line = line.trim_end_matches('\r');
        if rows.is_empty() && name.is_empty() && line.starts_with('#') {
            name = line[1..].trim().to_string();
        } else {
            rows.push(line.to_string());
        }
    }

    while rows.last().is_some_and(|r| r.trim().is_empty()) {
        rows.pop();
    }
    while rows.first().is_some_and(|r| r.trim().is_empty()) {
        rows.remove(0);
    }

    if rows.is_empty() {
        return None;
    }

    let max_width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    for row in &mut rows {
        let len = row.chars().count();
        if len < max_width {
            row.extend(std::iter::repeat('.').take(max_width - len));
        }
    }

    if name.is_empty() {
        name = "Unnamed Level".to_string();
    }

    Some(LevelDef { name, rows })
}

// ══════════════════════════════════════════════════════════════
// Directory loading (individual .txt files)
// ══════════════════════════════════════════════════════════════

fn load_from_directory(dir: &Path) -> Vec<(String, LevelDef)> {
    let mut results = vec![];

    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot read maps directory");
            return results;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().is_some_and(|e| e == "txt") {
            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    if let Some(def) = parse_level_file(&content) {
                        let filename = path.file_name()
                            .unwrap_or_default()
                            .to_string_lossy()
                            .to_string();
                        results.push((filename, def));
                    }
                }
                Err(e) => warn!(path = %path.display(), error = %e, "cannot read level"),
            }
        }
    }

    results
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

pub fn embedded_levels() -> Vec<LevelDef> {
    vec![
        make_embedded("Meepo Is You", &[
            "...............",
            ".MIY.....FIV...",
            "...............",
            "..22222222222..",
            "..2.........2..",
            "..2..1....4.2..",
            "..2.........2..",
            "..22222222222..",
            "...............",
            ".WIS...........",
            "...............",
        ]),
        make_embedded("Break The Wall", &[
            "...............",
            ".MIY...........",
            "...............",
            "..222222222....",
            "..2.......2....",
            "..2.1.WIS.2..4.",
            "..2.......2....",
            "..222222222....",
            "...............",
            ".FIV...........",
            "...............",
        ]),
        make_embedded("Mind The Rocks", &[
            "...............",
            ".MIY.....RIL...",
            "...............",
            ".1....3....4...",
            "......3........",
            "......3........",
            "......3........",
            "...............",
            ".FIV....BIS..5.",
            "...............",
        ]),
        make_embedded("Be The Rock", &[
            "...............",
            ".MIY.....RIY...",
            "...............",
            ".1.....3.......",
            "...............",
            "..55555........",
            "..5...5....4...",
            "..5.4.5........",
            "..55555........",
            "...............",
            ".FIV.BIS.......",
            "...............",
        ]),
    ]
}

fn make_embedded(name: &str, map: &[&str]) -> LevelDef {
    LevelDef {
        name: name.to_string(),
        rows: map.iter().map(|s| s.to_string()).collect(),
    }
}
