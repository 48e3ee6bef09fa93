/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Each board cell is two terminal columns wide so blocks look square.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::board::{COLS, ROWS};
use crate::domain::shape::{Color as BlockColor, Shape};
use crate::sim::hooks::RenderSurface;
use crate::sim::session::Phase;
use crate::sim::snapshot::RenderSnapshot;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells.
    ///
    /// Using the same RGB for `Clear(ClearType::All)` and every cell keeps
    /// the inter-row gap on VTE terminals the same color as the cells.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
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
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
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

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    /// Paint one board-sized block (two columns) at terminal (x, y).
    fn put_block(&mut self, x: usize, y: usize, color: BlockColor) {
        let (fill, edge) = block_colors(color);
        self.set(x, y, Cell::new('▐', edge, fill));
        self.set(x + 1, y, Cell::new('▌', edge, fill));
    }
}

// ── Palette ──

/// Fill and edge tones for a block color.
fn block_colors(c: BlockColor) -> (Color, Color) {
    match c {
        BlockColor::Cyan   => (Color::Rgb { r: 0, g: 200, b: 220 },  Color::Rgb { r: 0, g: 150, b: 170 }),
        BlockColor::Blue   => (Color::Rgb { r: 40, g: 80, b: 230 },  Color::Rgb { r: 25, g: 55, b: 180 }),
        BlockColor::Orange => (Color::Rgb { r: 240, g: 150, b: 30 }, Color::Rgb { r: 190, g: 110, b: 20 }),
        BlockColor::Yellow => (Color::Rgb { r: 235, g: 220, b: 40 }, Color::Rgb { r: 185, g: 170, b: 25 }),
        BlockColor::Green  => (Color::Rgb { r: 60, g: 210, b: 80 },  Color::Rgb { r: 40, g: 160, b: 55 }),
        BlockColor::Purple => (Color::Rgb { r: 170, g: 60, b: 220 }, Color::Rgb { r: 125, g: 40, b: 170 }),
        BlockColor::Red    => (Color::Rgb { r: 230, g: 50, b: 50 },  Color::Rgb { r: 180, g: 30, b: 30 }),
    }
}

const FRAME: Color = Color::Rgb { r: 110, g: 110, b: 150 };
const GRID_DOT: Color = Color::Rgb { r: 50, g: 50, b: 70 };
const LABEL: Color = Color::Rgb { r: 150, g: 150, b: 180 };
const VALUE: Color = Color::White;
const HINT: Color = Color::Rgb { r: 90, g: 90, b: 120 };
const OVERLAY_BG: Color = Color::Rgb { r: 40, g: 40, b: 55 };

// ── Layout ──

/// Terminal columns per board cell.
const CELL_W: usize = 2;

/// Board frame origin (top-left corner of the border).
const BOARD_X: usize = 2;
const BOARD_Y: usize = 1;

/// Side panel column.
const PANEL_X: usize = BOARD_X + COLS * CELL_W + 2 + 3;

/// Side panel rows: title, three counters, next preview, key help.
const PANEL_Y: usize = BOARD_Y + 1;
const TITLE_H: usize = 2;
const COUNTER_H: usize = 3;
/// Label plus the two rows every spawn-orientation shape fits in.
const NEXT_H: usize = 4;
const HELP: [&str; 6] = [
    "←/→  move",
    "↑ x  rotate",
    "↓    soft drop",
    "spc  hard drop",
    "p    pause",
    "q    quit",
];
const PANEL_BOTTOM: usize = PANEL_Y + TITLE_H + 3 * COUNTER_H + NEXT_H + HELP.len();

/// Smallest terminal the layout fits in.
const MIN_W: usize = PANEL_X + 16;
const BOARD_BOTTOM: usize = BOARD_Y + ROWS + 2;
const MIN_H: usize = if PANEL_BOTTOM > BOARD_BOTTOM { PANEL_BOTTOM } else { BOARD_BOTTOM };

/// Terminal position of board cell (gx, gy).
fn board_origin(gx: usize, gy: usize) -> (usize, usize) {
    (BOARD_X + 1 + gx * CELL_W, BOARD_Y + 1 + gy)
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    show_next: bool,
    /// True once the terminal agreed to report key Release events.
    pub keyboard_enhanced: bool,
}

impl Renderer {
    pub fn new(show_next: bool) -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            show_next,
            keyboard_enhanced: false,
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

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.keyboard_enhanced = true;
        }

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.keyboard_enhanced {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the terminal
        // default and show seams between rows.
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
}

impl RenderSurface for Renderer {
    fn present(&mut self, snap: &RenderSnapshot) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let resized = tw as usize != self.term_w || th as usize != self.term_h;
        if resized {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
        }

        // Phase change or resize → clear for a clean transition
        if resized || self.last_phase != Some(snap.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(snap.phase);
        }

        compose(&mut self.front, snap, self.show_next);
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }
}

// ── Compose: build front buffer content ──

fn compose(buf: &mut FrameBuffer, snap: &RenderSnapshot, show_next: bool) {
    buf.clear();

    if buf.width < MIN_W || buf.height < MIN_H {
        buf.put_str(0, 0, "Terminal too small", VALUE, Color::Reset);
        buf.put_str(0, 1, &format!("need {}x{}", MIN_W, MIN_H), HINT, Color::Reset);
        return;
    }

    compose_frame(buf);
    compose_board(buf, snap);
    compose_panel(buf, snap, show_next);

    match snap.phase {
        Phase::Paused => compose_pause_overlay(buf),
        Phase::GameOver => compose_game_over(buf, snap),
        Phase::Running => {}
    }
}

fn compose_frame(buf: &mut FrameBuffer) {
    let inner = COLS * CELL_W;
    let top = format!("╔{}╗", "═".repeat(inner));
    let bottom = format!("╚{}╝", "═".repeat(inner));
    buf.put_str(BOARD_X, BOARD_Y, &top, FRAME, Color::Reset);
    for row in 0..ROWS {
        buf.put_str(BOARD_X, BOARD_Y + 1 + row, "║", FRAME, Color::Reset);
        buf.put_str(BOARD_X + 1 + inner, BOARD_Y + 1 + row, "║", FRAME, Color::Reset);
    }
    buf.put_str(BOARD_X, BOARD_Y + 1 + ROWS, &bottom, FRAME, Color::Reset);
}

fn compose_board(buf: &mut FrameBuffer, snap: &RenderSnapshot) {
    for (gy, row) in snap.grid.iter().enumerate() {
        for (gx, cell) in row.iter().enumerate() {
            let (x, y) = board_origin(gx, gy);
            match cell {
                Some(color) => buf.put_block(x, y, *color),
                None => buf.put_str(x, y, " ·", GRID_DOT, Color::Reset),
            }
        }
    }

    // Falling piece; rows above the board are not drawn.
    for &(cx, cy) in &snap.active {
        if cx < 0 || cy < 0 || cx as usize >= COLS || cy as usize >= ROWS {
            continue;
        }
        let (x, y) = board_origin(cx as usize, cy as usize);
        buf.put_block(x, y, snap.active_color);
    }
}

fn compose_panel(buf: &mut FrameBuffer, snap: &RenderSnapshot, show_next: bool) {
    let x = PANEL_X;
    let mut y = PANEL_Y;

    buf.put_str(x, y, "BLOCKFALL", VALUE, Color::Reset);
    y += TITLE_H;

    for (label, value) in [("SCORE", snap.score), ("LINES", snap.lines), ("LEVEL", snap.level)] {
        buf.put_str(x, y, label, LABEL, Color::Reset);
        buf.put_str(x, y + 1, &value.to_string(), VALUE, Color::Reset);
        y += COUNTER_H;
    }

    if show_next {
        buf.put_str(x, y, "NEXT", LABEL, Color::Reset);
        compose_preview(buf, x, y + 1, snap.next_shape, snap.next_color);
        y += NEXT_H;
    }

    for (i, line) in HELP.iter().enumerate() {
        buf.put_str(x, y + i, line, HINT, Color::Reset);
    }
}

fn compose_preview(buf: &mut FrameBuffer, x: usize, y: usize, shape: Shape, color: BlockColor) {
    for (dx, dy) in shape.filled() {
        buf.put_block(x + dx as usize * CELL_W, y + dy as usize, color);
    }
}

/// Centered box over the board with the given lines.
fn compose_board_box(buf: &mut FrameBuffer, lines: &[(&str, Color)]) {
    let inner = COLS * CELL_W;
    let box_w = inner - 2;
    let box_h = lines.len() + 2;
    let box_x = BOARD_X + 2;
    let box_y = BOARD_Y + 1 + (ROWS - box_h) / 2;

    for y in box_y..box_y + box_h {
        for x in box_x..box_x + box_w {
            buf.set(x, y, Cell::new(' ', VALUE, OVERLAY_BG));
        }
    }
    for (i, (text, fg)) in lines.iter().enumerate() {
        let len = text.chars().count();
        let tx = box_x + box_w.saturating_sub(len) / 2;
        buf.put_str(tx, box_y + 1 + i, text, *fg, OVERLAY_BG);
    }
}

fn compose_pause_overlay(buf: &mut FrameBuffer) {
    compose_board_box(buf, &[
        ("PAUSED", Color::Rgb { r: 255, g: 220, b: 50 }),
        ("", VALUE),
        ("p  resume", HINT),
    ]);
}

fn compose_game_over(buf: &mut FrameBuffer, snap: &RenderSnapshot) {
    let score = format!("Score {}", snap.score);
    compose_board_box(buf, &[
        ("GAME OVER", Color::Rgb { r: 255, g: 60, b: 60 }),
        ("", VALUE),
        (score.as_str(), VALUE),
        ("", VALUE),
        ("enter / q", HINT),
    ]);
}
