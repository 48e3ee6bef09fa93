/// Logical input actions and the buffer that feeds them to the tick.
///
/// Input mappers (keyboard, gamepad) push actions at any time between
/// ticks. The host drains the buffer once per tick into a `FrameInput`:
///   - one-shot actions (move, rotate, hard drop) are queued per
///     occurrence and each occurrence is consumed exactly once
///   - soft drop is held state and persists until explicitly stopped
///   - pause toggle and quit are edge flags

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Rotate,
    SoftDropStart,
    SoftDropStop,
    HardDrop,
    PauseToggle,
    Quit,
}

impl Action {
    /// Parse an action name (case-insensitive). Unknown names yield `None`
    /// so callers can skip them.
    pub fn from_name(s: &str) -> Option<Action> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "moveleft" | "left" => Some(Action::MoveLeft),
            "moveright" | "right" => Some(Action::MoveRight),
            "rotate" => Some(Action::Rotate),
            "softdropstart" | "softdrop" => Some(Action::SoftDropStart),
            "softdropstop" => Some(Action::SoftDropStop),
            "harddrop" => Some(Action::HardDrop),
            "pausetoggle" | "pause" => Some(Action::PauseToggle),
            "quit" => Some(Action::Quit),
            _ => None,
        }
    }
}

/// Everything the tick needs from input, drained once per frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct FrameInput {
    pub move_left: bool,
    pub move_right: bool,
    pub rotate: bool,
    pub hard_drop: bool,
    pub soft_drop: bool,
    pub pause_toggle: bool,
    pub quit: bool,
}

#[derive(Clone, Debug, Default)]
pub struct ActionBuffer {
    left: u32,
    right: u32,
    rotate: u32,
    hard_drop: u32,
    soft_drop: bool,
    pause_toggle: bool,
    quit: bool,
}

impl ActionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: Action) {
        match action {
            Action::MoveLeft => self.left += 1,
            Action::MoveRight => self.right += 1,
            Action::Rotate => self.rotate += 1,
            Action::HardDrop => self.hard_drop += 1,
            Action::SoftDropStart => self.soft_drop = true,
            Action::SoftDropStop => self.soft_drop = false,
            // Two toggles between ticks cancel out.
            Action::PauseToggle => self.pause_toggle = !self.pause_toggle,
            Action::Quit => self.quit = true,
        }
    }

    /// Take at most one occurrence of each one-shot action. Anything left
    /// over stays queued for the following ticks.
    pub fn drain(&mut self) -> FrameInput {
        fn take(n: &mut u32) -> bool {
            if *n > 0 {
                *n -= 1;
                true
            } else {
                false
            }
        }
        FrameInput {
            move_left: take(&mut self.left),
            move_right: take(&mut self.right),
            rotate: take(&mut self.rotate),
            hard_drop: take(&mut self.hard_drop),
            soft_drop: self.soft_drop,
            pause_toggle: std::mem::take(&mut self.pause_toggle),
            quit: self.quit,
        }
    }

    /// Forget queued one-shots (used while paused).
    pub fn discard_pending(&mut self) {
        self.left = 0;
        self.right = 0;
        self.rotate = 0;
        self.hard_drop = 0;
    }
}

/// Merges the held soft-drop state of every input device into one
/// start/stop stream, so releasing one device never cancels another
/// that is still held.
#[derive(Clone, Copy, Debug, Default)]
pub struct SoftDropLatch {
    reported: bool,
}

impl SoftDropLatch {
    /// Push a start or stop only when the combined held state changes.
    pub fn sync(&mut self, held: bool, buf: &mut ActionBuffer) {
        if held != self.reported {
            buf.push(if held { Action::SoftDropStart } else { Action::SoftDropStop });
            self.reported = held;
        }
    }
}
