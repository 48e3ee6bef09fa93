/// Events emitted during a simulation tick.
/// The host forwards these to the audio hook; they carry no payload.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameEvent {
    RotateSuccess,
    Lock,
    LineClear,
    HardDrop,
    GameOver,
}
