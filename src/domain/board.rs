/// The playfield: a fixed ROWS x COLS grid of locked colors.
///
/// Row 0 is the top. Cells above the board (negative rows) are never
/// stored; they exist only while a freshly spawned piece overhangs the top.

use super::shape::{Color, Shape};

pub const ROWS: usize = 20;
pub const COLS: usize = 10;

pub type Grid = [[Option<Color>; COLS]; ROWS];

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    grid: Grid,
}

impl Board {
    pub fn new() -> Self {
        Board { grid: [[None; COLS]; ROWS] }
    }

    /// Locked color at (x, y). Out of bounds reads as empty.
    #[cfg(test)]
    pub fn cell(&self, x: i32, y: i32) -> Option<Color> {
        if Self::in_bounds(x, y) {
            self.grid[y as usize][x as usize]
        } else {
            None
        }
    }

    #[inline]
    pub fn set(&mut self, x: i32, y: i32, color: Option<Color>) {
        if Self::in_bounds(x, y) {
            self.grid[y as usize][x as usize] = color;
        }
    }

    pub fn rows(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    fn in_bounds(x: i32, y: i32) -> bool {
        x >= 0 && x < COLS as i32 && y >= 0 && y < ROWS as i32
    }

    /// Can `shape` sit with its top-left corner at (ox, oy)?
    ///
    /// Columns must stay inside the board and rows must stay above the
    /// floor. Rows above the top are allowed (spawn overhang).
    pub fn is_valid_placement(&self, shape: &Shape, ox: i32, oy: i32) -> bool {
        for (dx, dy) in shape.filled() {
            let x = ox + dx;
            let y = oy + dy;
            if x < 0 || x >= COLS as i32 || y >= ROWS as i32 {
                return false;
            }
            if y >= 0 && self.grid[y as usize][x as usize].is_some() {
                return false;
            }
        }
        true
    }

    /// Write `color` into every listed cell that lies on the board.
    pub fn lock<I>(&mut self, cells: I, color: Color)
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        for (x, y) in cells {
            if y >= 0 {
                self.set(x, y, Some(color));
            }
        }
    }

    /// Remove every full row, shifting the rest down. Returns rows removed.
    pub fn clear_full_rows(&mut self) -> usize {
        let mut write = ROWS;
        for read in (0..ROWS).rev() {
            let full = self.grid[read].iter().all(|c| c.is_some());
            if !full {
                write -= 1;
                if write != read {
                    self.grid[write] = self.grid[read];
                }
            }
        }
        let cleared = write;
        for row in &mut self.grid[..cleared] {
            *row = [None; COLS];
        }
        cleared
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

/// Build a board from a diagram of the bottom rows.
/// Legend: '#' = locked (red), anything else = empty.
#[cfg(test)]
pub fn board_from(rows: &[&str]) -> Board {
    let mut board = Board::new();
    let top = ROWS - rows.len();
    for (i, row) in rows.iter().enumerate() {
        for (x, ch) in row.chars().enumerate() {
            if ch == '#' {
                board.set(x as i32, (top + i) as i32, Some(Color::Red));
            }
        }
    }
    board
}
