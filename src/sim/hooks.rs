/// Seams to the outside collaborators: audio and the drawing surface.
///
/// The simulation only produces events and snapshots; what happens to them
/// is up to whatever implements these traits.

use std::io;

use super::event::GameEvent;
use super::snapshot::RenderSnapshot;

/// Receives game events. Must not block and must never fail the tick.
pub trait AudioHook {
    fn play(&self, event: GameEvent);
}

/// Audio hook that ignores everything (muted, or no output device).
pub struct Silent;

impl AudioHook for Silent {
    fn play(&self, _event: GameEvent) {}
}

/// Anything that can paint a finished frame.
pub trait RenderSurface {
    fn present(&mut self, snapshot: &RenderSnapshot) -> io::Result<()>;
}
