/// The falling piece: kind, rotation index and board-relative origin.
///
/// Occupied cells are always derived from (kind, rotation, x, y); nothing
/// is cached, so a piece can never report stale cells.

use super::board::{Board, COLS};
use super::shape::{Color, Kind, Shape};

/// Horizontal offsets tried, in order, when a rotation does not fit in place.
pub const KICKS: [i32; 4] = [-1, 1, -2, 2];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Piece {
    pub kind: Kind,
    pub rotation: usize,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// New piece at the spawn point: centered horizontally, top row.
    pub fn spawn(kind: Kind) -> Self {
        let size = kind.rotation_states()[0].size() as i32;
        Piece {
            kind,
            rotation: 0,
            x: COLS as i32 / 2 - size / 2,
            y: 0,
        }
    }

    pub fn shape(&self) -> Shape {
        let states = self.kind.rotation_states();
        states[self.rotation % states.len()]
    }

    pub fn color(&self) -> Color {
        self.kind.color()
    }

    /// Absolute board coordinates of every occupied sub-cell.
    pub fn cells(&self) -> Vec<(i32, i32)> {
        self.shape()
            .filled()
            .map(|(dx, dy)| (self.x + dx, self.y + dy))
            .collect()
    }

    /// Does the piece fit where it currently is?
    pub fn fits(&self, board: &Board) -> bool {
        board.is_valid_placement(&self.shape(), self.x, self.y)
    }

    /// Shift by (dx, dy) if the target placement is valid.
    pub fn attempt_move(&mut self, dx: i32, dy: i32, board: &Board) -> bool {
        if board.is_valid_placement(&self.shape(), self.x + dx, self.y + dy) {
            self.x += dx;
            self.y += dy;
            true
        } else {
            false
        }
    }

    /// Advance to the next rotation state, kicking sideways if needed.
    /// On failure the piece is left exactly as it was.
    pub fn attempt_rotate(&mut self, board: &Board) -> bool {
        let count = self.kind.rotation_states().len();
        let rotated = Piece {
            rotation: (self.rotation + 1) % count,
            ..*self
        };
        let shape = rotated.shape();

        if board.is_valid_placement(&shape, rotated.x, rotated.y) {
            *self = rotated;
            return true;
        }
        for dx in KICKS {
            if board.is_valid_placement(&shape, rotated.x + dx, rotated.y) {
                *self = Piece { x: rotated.x + dx, ..rotated };
                return true;
            }
        }
        false
    }

    /// Drop straight down until resting. Returns rows travelled.
    pub fn drop_to_floor(&mut self, board: &Board) -> u32 {
        let mut rows = 0;
        while self.attempt_move(0, 1, board) {
            rows += 1;
        }
        rows
    }
}
