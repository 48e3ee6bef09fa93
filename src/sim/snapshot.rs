/// Read-only view of a session as of the end of a tick.
///
/// Built by `GameSession::snapshot()` after all mutation for the tick is
/// done, so a renderer never sees a half-applied step.

use crate::domain::board::Grid;
use crate::domain::shape::{Color, Shape};
use super::session::Phase;

#[derive(Clone, Debug)]
pub struct RenderSnapshot {
    pub grid: Grid,
    /// Absolute cells of the falling piece. Empty once the game is over.
    pub active: Vec<(i32, i32)>,
    pub active_color: Color,
    pub next_shape: Shape,
    pub next_color: Color,
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    pub phase: Phase,
}
