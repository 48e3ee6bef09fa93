/// GameSession: the complete state of one running game.
///
/// ## Ownership
///
/// The session owns the board, the falling piece and the pre-generated
/// next piece. Nothing else holds references into it; the host loop passes
/// it by `&mut` to `step::tick` once per frame and reads a
/// `RenderSnapshot` afterwards.
///
/// ## Phases
///
///   Running  ── pause ──▶ Paused ── pause ──▶ Running
///   Running  ── spawn collision ──▶ GameOver (terminal)
///
/// Quit is not a phase: it clears `running` from any phase.

use crate::domain::board::Board;
use crate::domain::piece::Piece;
use super::event::GameEvent;
use super::kinds::KindSource;
use super::snapshot::RenderSnapshot;

/// Seconds per row at level 1.
pub const BASE_FALL_SECS: f64 = 0.5;
/// Each level beyond the first speeds gravity up by this fraction.
pub const LEVEL_SPEEDUP: f64 = 0.1;
pub const SOFT_DROP_DIVISOR: f64 = 5.0;
pub const SOFT_DROP_MIN_SECS: f64 = 0.02;
pub const POINTS_PER_ROW: u32 = 100;
pub const LINES_PER_LEVEL: u32 = 10;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Running,
    Paused,
    GameOver,
}

pub struct GameSession {
    pub board: Board,
    pub current: Piece,
    pub next: Piece,
    pub score: u32,
    pub lines: u32,
    /// Seconds accumulated since the last forced descent.
    pub fall_accumulator: f64,
    pub phase: Phase,
    /// Cleared by quit; the host loop stops when this is false.
    pub running: bool,
    kinds: Box<dyn KindSource>,
}

impl GameSession {
    pub fn new(kinds: Box<dyn KindSource>) -> Self {
        Self::with_board(Board::new(), kinds)
    }

    /// Start a game on a prepared board.
    pub fn with_board(board: Board, mut kinds: Box<dyn KindSource>) -> Self {
        let current = Piece::spawn(kinds.next_kind());
        let next = Piece::spawn(kinds.next_kind());
        GameSession {
            board,
            current,
            next,
            score: 0,
            lines: 0,
            fall_accumulator: 0.0,
            phase: Phase::Running,
            running: true,
            kinds,
        }
    }

    /// Always derived from `lines`; never stored.
    pub fn level(&self) -> u32 {
        1 + self.lines / LINES_PER_LEVEL
    }

    /// Seconds between forced descents at the current level.
    pub fn fall_interval(&self, soft_drop: bool) -> f64 {
        let interval = BASE_FALL_SECS / (1.0 + (self.level() - 1) as f64 * LEVEL_SPEEDUP);
        if soft_drop {
            (interval / SOFT_DROP_DIVISOR).max(SOFT_DROP_MIN_SECS)
        } else {
            interval
        }
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Commit the resting piece, clear rows, score, and bring in the next
    /// piece. Ends the game if the new piece cannot be placed.
    pub fn lock_current(&mut self, events: &mut Vec<GameEvent>) {
        let color = self.current.color();
        self.board.lock(self.current.cells(), color);
        events.push(GameEvent::Lock);

        let cleared = self.board.clear_full_rows() as u32;
        if cleared > 0 {
            self.score += cleared * POINTS_PER_ROW;
            self.lines += cleared;
            events.push(GameEvent::LineClear);
        }

        let fresh = Piece::spawn(self.kinds.next_kind());
        self.current = std::mem::replace(&mut self.next, fresh);
        if !self.current.fits(&self.board) {
            self.phase = Phase::GameOver;
            events.push(GameEvent::GameOver);
        }
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        let active = if self.is_over() { Vec::new() } else { self.current.cells() };
        RenderSnapshot {
            grid: *self.board.rows(),
            active,
            active_color: self.current.color(),
            next_shape: self.next.shape(),
            next_color: self.next.color(),
            score: self.score,
            lines: self.lines,
            level: self.level(),
            phase: self.phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::board_from;
    use crate::domain::shape::Kind;
    use crate::sim::kinds::KindSequence;

    fn session(kinds: &[Kind]) -> GameSession {
        GameSession::new(Box::new(KindSequence::new(kinds.to_vec())))
    }

    #[test]
    fn new_session_spawns_current_and_next() {
        let s = session(&[Kind::T, Kind::O]);
        assert_eq!(s.current.kind, Kind::T);
        assert_eq!(s.next.kind, Kind::O);
        assert_eq!(s.phase, Phase::Running);
        assert!(s.running);
        assert_eq!(s.level(), 1);
    }

    #[test]
    fn level_follows_lines() {
        let mut s = session(&[Kind::T]);
        for (lines, level) in [(0, 1), (9, 1), (10, 2), (19, 2), (25, 3)] {
            s.lines = lines;
            assert_eq!(s.level(), level, "lines={}", lines);
        }
    }

    #[test]
    fn fall_interval_by_level_and_soft_drop() {
        let mut s = session(&[Kind::T]);
        assert!((s.fall_interval(false) - 0.5).abs() < 1e-9);
        assert!((s.fall_interval(true) - 0.1).abs() < 1e-9);
        s.lines = 10;
        assert!((s.fall_interval(false) - 0.5 / 1.1).abs() < 1e-9);
        s.lines = 10_000;
        assert!((s.fall_interval(true) - SOFT_DROP_MIN_SECS).abs() < 1e-9);
    }

    #[test]
    fn lock_scores_cleared_rows() {
        let board = board_from(&[
            "####..####",
            "####..####",
        ]);
        let mut s = GameSession::with_board(board, Box::new(KindSequence::new(vec![Kind::O])));
        s.current = Piece { kind: Kind::O, rotation: 0, x: 4, y: 18 };
        let mut events = Vec::new();
        s.lock_current(&mut events);
        assert_eq!(s.score, 200);
        assert_eq!(s.lines, 2);
        assert!(s.board.rows().iter().all(|r| r.iter().all(|c| c.is_none())));
        assert_eq!(events, vec![GameEvent::Lock, GameEvent::LineClear]);
        assert_eq!(s.phase, Phase::Running);
    }

    #[test]
    fn snapshot_reflects_state() {
        let s = session(&[Kind::I, Kind::Z]);
        let snap = s.snapshot();
        assert_eq!(snap.active, s.current.cells());
        assert_eq!(snap.active_color, Kind::I.color());
        assert_eq!(snap.next_color, Kind::Z.color());
        assert_eq!(snap.next_shape, Kind::Z.rotation_states()[0]);
        assert_eq!((snap.score, snap.lines, snap.level), (0, 0, 1));
    }
}
