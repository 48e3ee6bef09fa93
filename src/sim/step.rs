/// The tick function: advances a session by one frame.
///
/// Processing order (Running phase):
///   1. Pause toggle (a pausing tick does nothing else)
///   2. Lateral moves (left, then right)
///   3. Rotation with kicks
///   4. Gravity: drain the fall accumulator, locking when the piece rests
///   5. Hard drop, unless gravity already locked a piece this tick
///
/// A hard drop only ever acts on the piece that was falling when the tick
/// began; it never reaches the piece promoted by a gravity lock.
///
/// Every input in `FrameInput` is one-shot except `soft_drop`, which is the
/// held state at the time of draining.

use crate::domain::action::FrameInput;
use super::event::GameEvent;
use super::session::{GameSession, Phase};

pub fn tick(session: &mut GameSession, dt: f64, input: FrameInput) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if input.quit {
        session.quit();
        return events;
    }

    match session.phase {
        Phase::GameOver => return events,
        Phase::Paused => {
            if input.pause_toggle {
                session.phase = Phase::Running;
            }
            return events;
        }
        Phase::Running => {
            if input.pause_toggle {
                session.phase = Phase::Paused;
                return events;
            }
        }
    }

    resolve_shift(session, input);
    resolve_rotate(session, input, &mut events);
    let landed = resolve_gravity(session, dt, input.soft_drop, &mut events);
    if !landed {
        resolve_hard_drop(session, input, &mut events);
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Input-driven steps
// ══════════════════════════════════════════════════════════════

fn resolve_shift(s: &mut GameSession, input: FrameInput) {
    if input.move_left {
        s.current.attempt_move(-1, 0, &s.board);
    }
    if input.move_right {
        s.current.attempt_move(1, 0, &s.board);
    }
}

fn resolve_rotate(s: &mut GameSession, input: FrameInput, events: &mut Vec<GameEvent>) {
    if input.rotate && s.current.attempt_rotate(&s.board) {
        events.push(GameEvent::RotateSuccess);
    }
}

fn resolve_hard_drop(s: &mut GameSession, input: FrameInput, events: &mut Vec<GameEvent>) {
    if !input.hard_drop {
        return;
    }
    s.current.drop_to_floor(&s.board);
    events.push(GameEvent::HardDrop);
    s.lock_current(events);
}

// ══════════════════════════════════════════════════════════════
// Gravity
// ══════════════════════════════════════════════════════════════

/// Returns true if a piece locked.
fn resolve_gravity(s: &mut GameSession, dt: f64, soft_drop: bool, events: &mut Vec<GameEvent>) -> bool {
    s.fall_accumulator += dt;
    let mut locked = false;
    loop {
        // Re-read each pass: a clear can raise the level mid-loop.
        let interval = s.fall_interval(soft_drop);
        if s.fall_accumulator < interval {
            break;
        }
        s.fall_accumulator -= interval;

        if !s.current.attempt_move(0, 1, &s.board) {
            s.lock_current(events);
            locked = true;
            if s.phase == Phase::GameOver {
                break;
            }
        }
    }
    locked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::{board_from, Board, ROWS};
    use crate::domain::piece::Piece;
    use crate::domain::shape::{Color, Kind};
    use crate::sim::kinds::KindSequence;

    fn session_on(board: Board, kinds: &[Kind]) -> GameSession {
        GameSession::with_board(board, Box::new(KindSequence::new(kinds.to_vec())))
    }

    fn session(kinds: &[Kind]) -> GameSession {
        session_on(Board::new(), kinds)
    }

    fn input() -> FrameInput {
        FrameInput::default()
    }

    // ── Lateral / rotate ──

    #[test]
    fn move_left_and_right_are_one_shot() {
        let mut s = session(&[Kind::T]);
        let x0 = s.current.x;
        tick(&mut s, 0.0, FrameInput { move_left: true, ..input() });
        assert_eq!(s.current.x, x0 - 1);
        tick(&mut s, 0.0, input());
        assert_eq!(s.current.x, x0 - 1);
        tick(&mut s, 0.0, FrameInput { move_right: true, ..input() });
        assert_eq!(s.current.x, x0);
    }

    #[test]
    fn blocked_move_is_still_consumed() {
        let mut s = session(&[Kind::O]);
        s.current.x = 0;
        let events = tick(&mut s, 0.0, FrameInput { move_left: true, ..input() });
        assert_eq!(s.current.x, 0);
        assert!(events.is_empty());
    }

    #[test]
    fn rotate_emits_event_on_success_only() {
        let mut s = session(&[Kind::T]);
        let events = tick(&mut s, 0.0, FrameInput { rotate: true, ..input() });
        assert_eq!(events, vec![GameEvent::RotateSuccess]);
        assert_eq!(s.current.rotation, 1);

        // Vertical I wedged in a one-wide well cannot turn.
        let well = board_from(&[
            "####.#####",
            "####.#####",
            "####.#####",
            "####.#####",
        ]);
        let mut s = session_on(well, &[Kind::I]);
        s.current = Piece { kind: Kind::I, rotation: 1, x: 2, y: 16 };
        let events = tick(&mut s, 0.0, FrameInput { rotate: true, ..input() });
        assert!(events.is_empty());
        assert_eq!(s.current.rotation, 1);
    }

    // ── Gravity ──

    #[test]
    fn gravity_waits_for_full_interval() {
        let mut s = session(&[Kind::T]);
        tick(&mut s, 0.3, input());
        assert_eq!(s.current.y, 0);
        tick(&mut s, 0.3, input());
        assert_eq!(s.current.y, 1);
        assert!((s.fall_accumulator - 0.1).abs() < 1e-9);
    }

    #[test]
    fn long_frame_drops_several_rows() {
        let mut s = session(&[Kind::T]);
        tick(&mut s, 1.6, input());
        assert_eq!(s.current.y, 3);
    }

    #[test]
    fn soft_drop_divides_interval() {
        let mut s = session(&[Kind::T]);
        tick(&mut s, 0.1, FrameInput { soft_drop: true, ..input() });
        assert_eq!(s.current.y, 1);
    }

    #[test]
    fn resting_piece_locks_and_next_is_promoted() {
        let mut s = session(&[Kind::O, Kind::T, Kind::I]);
        s.current.y = ROWS as i32 - 2;
        let events = tick(&mut s, 0.5, input());
        assert_eq!(events, vec![GameEvent::Lock]);
        assert_eq!(s.board.cell(4, 19), Some(Color::Yellow));
        assert_eq!(s.current.kind, Kind::T);
        assert_eq!(s.next.kind, Kind::I);
        assert_eq!((s.current.x, s.current.y), (4, 0));
    }

    #[test]
    fn two_clears_accumulate_score() {
        // One row then three rows, across two separate locks.
        let board = board_from(&[
            "#########.",
            "#########.",
            "#########.",
            "########..",
        ]);
        let mut s = session_on(board, &[Kind::I]);

        // Vertical I in the right column clears the three rows it spans
        // fully; the bottom row still has a gap at column 8.
        s.current = Piece { kind: Kind::I, rotation: 1, x: 7, y: 16 };
        let events = tick(&mut s, 0.5, input());
        assert!(events.contains(&GameEvent::LineClear));
        assert_eq!(s.lines, 3);
        assert_eq!(s.score, 300);

        // Fill the remaining gap at column 8 with a vertical I.
        s.current = Piece { kind: Kind::I, rotation: 1, x: 6, y: 16 };
        tick(&mut s, 0.5, input());
        assert_eq!(s.lines, 4);
        assert_eq!(s.score, 400);
    }

    #[test]
    fn clearing_ten_lines_raises_level() {
        let mut s = session(&[Kind::O]);
        s.lines = 9;
        for x in 0..8 {
            s.board.set(x, 19, Some(Color::Red));
        }
        s.current = Piece { kind: Kind::O, rotation: 0, x: 8, y: 18 };
        tick(&mut s, 0.5, input());
        assert_eq!(s.lines, 10);
        assert_eq!(s.level(), 2);
    }

    // ── Hard drop ──

    #[test]
    fn hard_drop_lands_and_locks_in_one_tick() {
        let mut s = session(&[Kind::T, Kind::O]);
        let events = tick(&mut s, 0.0, FrameInput { hard_drop: true, ..input() });
        assert_eq!(events, vec![GameEvent::HardDrop, GameEvent::Lock]);
        // T at rotation 0 is two rows tall: lands with y = ROWS - 2.
        assert_eq!(s.board.cell(5, 18), Some(Color::Purple));
        for x in 4..=6 {
            assert_eq!(s.board.cell(x, 19), Some(Color::Purple));
        }
        assert_eq!(s.current.kind, Kind::O);
    }

    #[test]
    fn hard_drop_clearing_rows_scores() {
        let board = board_from(&[
            "####..####",
            "####..####",
        ]);
        let mut s = session_on(board, &[Kind::O]);
        let events = tick(&mut s, 0.0, FrameInput { hard_drop: true, ..input() });
        assert_eq!(events, vec![GameEvent::HardDrop, GameEvent::Lock, GameEvent::LineClear]);
        assert_eq!(s.score, 200);
        assert_eq!(s.lines, 2);
    }

    #[test]
    fn hard_drop_on_landing_tick_locks_one_piece() {
        let mut s = session(&[Kind::O, Kind::I, Kind::T]);
        s.current = Piece { kind: Kind::O, rotation: 0, x: 4, y: ROWS as i32 - 2 };
        let events = tick(&mut s, 0.5, FrameInput { hard_drop: true, ..input() });
        assert_eq!(events, vec![GameEvent::Lock]);
        let locked = s.board.rows().iter().flatten().filter(|c| c.is_some()).count();
        assert_eq!(locked, 4);
        // The promoted piece is untouched.
        assert_eq!(s.current.kind, Kind::I);
        assert_eq!(s.current.y, 0);
    }

    // ── Game over ──

    #[test]
    fn blocked_spawn_ends_game() {
        let mut s = session(&[Kind::O]);
        // Top two rows occupied across the spawn columns.
        for y in 0..2 {
            for x in 2..8 {
                s.board.set(x, y, Some(Color::Red));
            }
        }
        s.current = Piece { kind: Kind::O, rotation: 0, x: 0, y: ROWS as i32 - 2 };
        s.score = 700;
        s.lines = 7;

        let events = tick(&mut s, 0.5, input());
        assert_eq!(events, vec![GameEvent::Lock, GameEvent::GameOver]);
        assert_eq!(s.phase, Phase::GameOver);
        assert_eq!(s.score, 700);
        assert_eq!(s.lines, 7);
        assert!(s.snapshot().active.is_empty());
    }

    #[test]
    fn game_over_is_terminal() {
        let mut s = session(&[Kind::O]);
        s.phase = Phase::GameOver;
        let before = s.board.clone();
        let events = tick(&mut s, 5.0, FrameInput { hard_drop: true, pause_toggle: true, ..input() });
        assert!(events.is_empty());
        assert_eq!(s.phase, Phase::GameOver);
        assert_eq!(s.board, before);
        assert!(s.running);
    }

    #[test]
    fn game_over_inside_gravity_ends_tick() {
        let mut s = session(&[Kind::O]);
        for x in 2..8 {
            s.board.set(x, 0, Some(Color::Red));
        }
        s.current = Piece { kind: Kind::O, rotation: 0, x: 0, y: ROWS as i32 - 2 };
        let events = tick(&mut s, 0.5, FrameInput { hard_drop: true, ..input() });
        assert_eq!(events, vec![GameEvent::Lock, GameEvent::GameOver]);
    }

    // ── Pause / quit ──

    #[test]
    fn pause_freezes_everything() {
        let mut s = session(&[Kind::T]);
        tick(&mut s, 0.0, FrameInput { pause_toggle: true, ..input() });
        assert_eq!(s.phase, Phase::Paused);

        let x0 = s.current.x;
        tick(&mut s, 10.0, FrameInput { move_left: true, hard_drop: true, ..input() });
        assert_eq!(s.current.x, x0);
        assert_eq!(s.current.y, 0);
        assert_eq!(s.fall_accumulator, 0.0);
        assert!(s.board.rows().iter().flatten().all(|c| c.is_none()));

        tick(&mut s, 0.0, FrameInput { pause_toggle: true, ..input() });
        assert_eq!(s.phase, Phase::Running);
    }

    #[test]
    fn quit_stops_from_any_phase() {
        for phase in [Phase::Running, Phase::Paused, Phase::GameOver] {
            let mut s = session(&[Kind::T]);
            s.phase = phase;
            tick(&mut s, 0.0, FrameInput { quit: true, ..input() });
            assert!(!s.running);
            assert_eq!(s.phase, phase);
        }
    }
}
