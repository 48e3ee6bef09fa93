/// Gamepad input mapper using gilrs.
///
/// Face and shoulder buttons are bound to actions through the
/// `[gamepad.buttons]` table in config.toml. Default mapping:
///   D-pad / Left Stick ←→  Move left / right
///   D-pad / Left Stick ↓   Soft drop (held)
///   D-pad / Left Stick ↑   Rotate
///   A / B                  Rotate
///   X / Y                  Hard drop
///   Start                  Pause
///   Select                 Quit

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::action::{Action, ActionBuffer};

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
}

impl Btn {
    pub fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2  => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Directions shared by the D-pad and the left stick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Dir {
    Up,
    Down,
    Left,
    Right,
}

/// Per-input state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

/// Resolve the configured button table. Entries whose button or action
/// name is not recognised are skipped.
fn resolve_bindings(cfg: &GamepadConfig) -> Vec<(Btn, Action)> {
    cfg.buttons
        .iter()
        .filter_map(|(btn, action)| Some((Btn::from_name(btn)?, Action::from_name(action)?)))
        .collect()
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    // All tracked buttons (indexed by Btn)
    buttons: [BtnState; 10],

    // D-pad and stick, indexed by Dir
    dpad: [BtnState; 4],
    stick: [BtnState; 4],
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_x: f32,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_y: f32,

    bindings: Vec<(Btn, Action)>,
}

fn btn_index(btn: Btn) -> usize {
    btn as usize
}

fn dir_index(dir: Dir) -> usize {
    dir as usize
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: Gilrs::new().ok(),
            buttons: [BtnState::default(); 10],
            dpad: [BtnState::default(); 4],
            stick: [BtnState::default(); 4],
            stick_x: 0.0,
            stick_y: 0.0,
            bindings: resolve_bindings(cfg),
        }
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => self.set_button(btn, true),
                EventType::ButtonReleased(btn, _) => self.set_button(btn, false),
                EventType::AxisChanged(axis, value, _) => self.update_axis(axis, value),
                EventType::Disconnected => self.release_all(),
                _ => {}
            }
        }

        // Derive stick digital states
        let (x, y) = (self.stick_x, self.stick_y);
        self.stick[dir_index(Dir::Left)].set(x < -STICK_DEADZONE);
        self.stick[dir_index(Dir::Right)].set(x > STICK_DEADZONE);
        self.stick[dir_index(Dir::Up)].set(y > STICK_DEADZONE);
        self.stick[dir_index(Dir::Down)].set(y < -STICK_DEADZONE);
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        // D-pad handled separately (not in Btn enum)
        let dir = match gilrs_btn {
            Button::DPadUp => Some(Dir::Up),
            Button::DPadDown => Some(Dir::Down),
            Button::DPadLeft => Some(Dir::Left),
            Button::DPadRight => Some(Dir::Right),
            _ => None,
        };
        if let Some(dir) = dir {
            self.set_dpad(dir, held);
        } else if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.set_btn(btn, held);
        }
    }

    #[cfg(feature = "gamepad")]
    fn update_axis(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::LeftStickX => self.stick_x = value,
            Axis::LeftStickY => self.stick_y = value,
            _ => {}
        }
    }

    // ── Action output ──

    /// Translate this frame's pad activity into actions.
    pub fn push_actions(&self, buf: &mut ActionBuffer) {
        if self.dir_just_pressed(Dir::Left) {
            buf.push(Action::MoveLeft);
        }
        if self.dir_just_pressed(Dir::Right) {
            buf.push(Action::MoveRight);
        }
        if self.dir_just_pressed(Dir::Up) {
            buf.push(Action::Rotate);
        }

        for &(btn, action) in &self.bindings {
            match action {
                // Soft drop is held state; see `soft_drop_held`.
                Action::SoftDropStart | Action::SoftDropStop => {}
                _ if self.buttons[btn_index(btn)].just_pressed => buf.push(action),
                _ => {}
            }
        }
    }

    /// Down direction or any button bound to soft drop is held.
    pub fn soft_drop_held(&self) -> bool {
        self.dir_held(Dir::Down)
            || self.bindings.iter().any(|&(btn, action)| {
                action == Action::SoftDropStart && self.buttons[btn_index(btn)].held
            })
    }

    /// Was any bound button or direction freshly pressed this frame?
    pub fn any_pressed(&self) -> bool {
        self.buttons.iter().chain(&self.dpad).chain(&self.stick).any(|b| b.just_pressed)
    }

    // ── Internal ──

    fn dir_just_pressed(&self, dir: Dir) -> bool {
        self.dpad[dir_index(dir)].just_pressed || self.stick[dir_index(dir)].just_pressed
    }

    fn dir_held(&self, dir: Dir) -> bool {
        self.dpad[dir_index(dir)].held || self.stick[dir_index(dir)].held
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn set_btn(&mut self, btn: Btn, held: bool) {
        self.buttons[btn_index(btn)].set(held);
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn set_dpad(&mut self, dir: Dir, held: bool) {
        self.dpad[dir_index(dir)].set(held);
    }

    fn clear_just_pressed(&mut self) {
        for b in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            b.just_pressed = false;
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        for b in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            *b = BtnState::default();
        }
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}
