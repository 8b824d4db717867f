/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The renderer only reads the sprite list and rule texts; it never looks
/// inside the simulation.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::actor::{Facing, IsLight, Noun, Property, Visual};
use crate::sim::session::Session;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Tile art ──

/// Terminal columns per map cell.
pub const CELL_W: usize = 4;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
const MAP_COL: usize = 1;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const SUBJECT_BG: Color = Color::Rgb { r: 120, g: 40, b: 110 };
const ATTRIBUTE_BG: Color = Color::Rgb { r: 150, g: 80, b: 20 };

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Tile {
    pub text: [char; CELL_W],
    pub fg: Color,
    pub bg: Color,
}

fn glyphs(s: &str) -> [char; CELL_W] {
    let mut out = [' '; CELL_W];
    for (slot, ch) in out.iter_mut().zip(s.chars()) {
        *slot = ch;
    }
    out
}

fn meepo_face(facing: Facing, stride: bool) -> [char; CELL_W] {
    let eye = if stride { 'o' } else { 'O' };
    match facing {
        Facing::Left => ['<', eye, eye, ' '],
        Facing::Right => [' ', eye, eye, '>'],
        Facing::Up => [' ', '^', '^', ' '],
        Facing::Down => [' ', eye, eye, ' '],
    }
}

pub fn noun_label(noun: Noun) -> &'static str {
    match noun {
        Noun::Meepo => "MEEP",
        Noun::Wall => "WALL",
        Noun::Rock => "ROCK",
        Noun::Flag => "FLAG",
        Noun::Bush => "BUSH",
    }
}

pub fn property_label(property: Property) -> &'static str {
    match property {
        Property::You => "YOU",
        Property::Push => "PUSH",
        Property::Stop => "STOP",
        Property::Victory => "WIN!",
        Property::Lose => "LOSE",
    }
}

/// Art for one sprite.
pub fn tile_for(visual: Visual) -> Tile {
    match visual {
        Visual::Character { noun, facing, stride, player } => {
            let (text, fg) = match noun {
                Noun::Meepo => (meepo_face(facing, stride), Color::White),
                Noun::Wall => (glyphs("████"), Color::DarkGrey),
                Noun::Rock => (glyphs(" () "), Color::Rgb { r: 170, g: 120, b: 70 }),
                Noun::Flag => (glyphs(" |> "), Color::Yellow),
                Noun::Bush => (glyphs(" ** "), Color::Green),
            };
            let fg = if player { Color::Cyan } else { fg };
            Tile { text, fg, bg: Cell::BASE_BG }
        }
        Visual::Subject(noun) => Tile { text: glyphs(noun_label(noun)), fg: Color::White, bg: SUBJECT_BG },
        Visual::Attribute(p) => Tile { text: glyphs(property_label(p)), fg: Color::White, bg: ATTRIBUTE_BG },
        Visual::Is(light) => {
            let bg = match light {
                IsLight::Off => Color::Rgb { r: 60, g: 60, b: 60 },
                IsLight::Half => Color::Rgb { r: 140, g: 140, b: 140 },
                IsLight::Full => Color::White,
            };
            Tile { text: glyphs(" IS "), fg: Color::Black, bg }
        }
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, session: &Session) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.front.clear();
        self.compose_game(session);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, session: &Session) {
        let state = &session.state;

        // ── HUD row ──
        let hud = format!(
            " Level {}/{}: {}   Moves: {}   Undo: {} ",
            session.level_index + 1,
            session.level_count(),
            session.level_name(),
            session.moves,
            session.history.len(),
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Map ──
        let map_w = state.grid.width * CELL_W;
        let map_h = state.grid.height;
        for y in 0..map_h {
            for x in 0..map_w {
                self.front.set(MAP_COL + x, MAP_ROW + y, Cell::new('·', Color::Rgb { r: 45, g: 45, b: 60 }, Cell::BASE_BG));
            }
        }
        for sprite in state.sprites() {
            let tile = tile_for(sprite.visual);
            let col = MAP_COL + sprite.x * CELL_W;
            let row = MAP_ROW + sprite.y;
            for (i, ch) in tile.text.iter().enumerate() {
                self.front.set(col + i, row, Cell::new(*ch, tile.fg, tile.bg));
            }
        }

        // ── Active rules ──
        let rules_row = MAP_ROW + map_h + 1;
        let rules = if state.rules.is_empty() {
            " Rules: (none)".to_string()
        } else {
            format!(" Rules: {}", state.rule_texts().join("  "))
        };
        self.front.put_str(0, rules_row, &rules, Color::Grey, Color::Reset);

        // ── Message bar ──
        let msg_row = rules_row + 2;
        if !session.message.is_empty() {
            let msg = format!(" ◈ {} ", session.message);
            self.front.fill_row(msg_row, MSG_BG);
            self.front.put_str(0, msg_row, &msg, Color::Black, MSG_BG);
        }

        // ── Help bar ──
        let help_row = msg_row + 2;
        let help = " Arrows/WASD:Move  Ctrl-Z/U:Undo  R:Restart  Q/Esc:Quit";
        self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
    }
}
