/// Game session state and the per-frame tick.

pub mod event;
pub mod hooks;
pub mod kinds;
pub mod session;
pub mod snapshot;
pub mod step;
