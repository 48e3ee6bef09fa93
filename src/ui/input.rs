/// Keyboard input mapper.
///
/// Tracks which keys are currently held down and turns raw key events into
/// logical `Action`s:
///   - lateral moves fire on every press, including key auto-repeat
///   - rotate, hard drop, pause and quit fire only on the initial press
///   - soft drop is reported as held state, merged with the gamepad by
///     the host
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::action::{Action, ActionBuffer};

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_ROTATE: &[KeyCode] = &[
    KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W'), KeyCode::Char('x'), KeyCode::Char('X'),
];
const KEYS_SOFT_DROP: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_HARD_DROP: &[KeyCode] = &[KeyCode::Char(' ')];
const KEYS_PAUSE: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

/// Logical action for a raw key, if it has one.
/// The soft-drop key maps to `SoftDropStart`; its release is derived from
/// held state, not from this table.
pub fn action_for_key(code: KeyCode) -> Option<Action> {
    let is = |keys: &[KeyCode]| keys.contains(&code);
    if is(KEYS_LEFT) {
        Some(Action::MoveLeft)
    } else if is(KEYS_RIGHT) {
        Some(Action::MoveRight)
    } else if is(KEYS_ROTATE) {
        Some(Action::Rotate)
    } else if is(KEYS_SOFT_DROP) {
        Some(Action::SoftDropStart)
    } else if is(KEYS_HARD_DROP) {
        Some(Action::HardDrop)
    } else if is(KEYS_PAUSE) {
        Some(Action::PauseToggle)
    } else if is(KEYS_QUIT) {
        Some(Action::Quit)
    } else {
        None
    }
}

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that transitioned from "not held" → "held" during the
    /// most recent drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Every Press/Repeat seen during the most recent drain, in order.
    presses: Vec<KeyCode>,

    /// Raw key events collected during drain.
    raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.begin_frame();

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.handle_key(key, Instant::now());
            }
        }

        self.expire(Instant::now());
    }

    /// Translate this frame's key activity into actions.
    pub fn push_actions(&self, buf: &mut ActionBuffer) {
        if self.ctrl_c_pressed() {
            buf.push(Action::Quit);
        }

        for &code in &self.presses {
            if let Some(a @ (Action::MoveLeft | Action::MoveRight)) = action_for_key(code) {
                buf.push(a);
            }
        }
        for &code in &self.fresh_presses {
            match action_for_key(code) {
                Some(Action::MoveLeft | Action::MoveRight | Action::SoftDropStart) | None => {}
                Some(a) => buf.push(a),
            }
        }
    }

    /// Is a soft-drop key held? The host merges this with the gamepad.
    pub fn soft_drop_held(&self) -> bool {
        self.any_held(KEYS_SOFT_DROP)
    }

    /// Was any of these keys freshly pressed this frame?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh_presses.contains(c))
    }

    /// Convenience: is any of these keys held?
    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held_inner(*c))
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    // ── Internal ──

    fn begin_frame(&mut self) {
        self.fresh_presses.clear();
        self.presses.clear();
        self.raw_events.clear();
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        self.raw_events.push(key);

        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                // Explicit release: remove from active set
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {
                // Ignore release when enhancement not confirmed;
                // rely on timeout-based expiry instead
            }
            _ => {
                let was_held = self.is_held_at(key.code, now);
                self.last_active.insert(key.code, now);
                self.presses.push(key.code);
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    /// Expire keys that have timed out (fallback for terminals without
    /// Release). With enhancement on, keys stay held until released.
    fn expire(&mut self, now: Instant) {
        if !self.honor_release {
            self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
        }
    }

    fn is_held_at(&self, code: KeyCode, now: Instant) -> bool {
        self.last_active
            .get(&code)
            .map(|t| self.honor_release || now.duration_since(*t) < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    fn is_held_inner(&self, code: KeyCode) -> bool {
        self.is_held_at(code, Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::action::{FrameInput, SoftDropLatch};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn release(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Release)
    }

    fn frame(input: &mut InputState, keys: &[KeyEvent]) -> FrameInput {
        frame_latched(input, &mut SoftDropLatch::default(), keys)
    }

    fn frame_latched(input: &mut InputState, latch: &mut SoftDropLatch, keys: &[KeyEvent]) -> FrameInput {
        let now = Instant::now();
        input.begin_frame();
        for &k in keys {
            input.handle_key(k, now);
        }
        input.expire(now);
        let mut buf = ActionBuffer::new();
        input.push_actions(&mut buf);
        latch.sync(input.soft_drop_held(), &mut buf);
        buf.drain()
    }

    #[test]
    fn default_bindings() {
        assert_eq!(action_for_key(KeyCode::Left), Some(Action::MoveLeft));
        assert_eq!(action_for_key(KeyCode::Char('x')), Some(Action::Rotate));
        assert_eq!(action_for_key(KeyCode::Up), Some(Action::Rotate));
        assert_eq!(action_for_key(KeyCode::Char(' ')), Some(Action::HardDrop));
        assert_eq!(action_for_key(KeyCode::Char('p')), Some(Action::PauseToggle));
        assert_eq!(action_for_key(KeyCode::Esc), Some(Action::Quit));
        assert_eq!(action_for_key(KeyCode::Down), Some(Action::SoftDropStart));
        assert_eq!(action_for_key(KeyCode::F(5)), None);
    }

    #[test]
    fn rotate_is_edge_triggered() {
        let mut input = InputState::new();
        let a = frame(&mut input, &[press(KeyCode::Up)]);
        assert!(a.rotate);
        // Auto-repeat while still held does not rotate again.
        let b = frame(&mut input, &[press(KeyCode::Up)]);
        assert!(!b.rotate);
    }

    #[test]
    fn lateral_move_follows_auto_repeat() {
        let mut input = InputState::new();
        let a = frame(&mut input, &[press(KeyCode::Left)]);
        assert!(a.move_left);
        let b = frame(&mut input, &[press(KeyCode::Left)]);
        assert!(b.move_left);
    }

    #[test]
    fn soft_drop_tracks_release() {
        let mut input = InputState::new();
        input.honor_release = true;
        let now = Instant::now();
        input.begin_frame();
        input.handle_key(press(KeyCode::Down), now);
        assert!(input.soft_drop_held());

        input.begin_frame();
        assert!(input.soft_drop_held());

        input.begin_frame();
        input.handle_key(release(KeyCode::Down), now);
        assert!(!input.soft_drop_held());
    }

    #[test]
    fn soft_drop_key_starts_and_stops_through_latch() {
        let mut input = InputState::new();
        input.honor_release = true;
        let mut latch = SoftDropLatch::default();
        assert!(frame_latched(&mut input, &mut latch, &[press(KeyCode::Down)]).soft_drop);
        assert!(!frame_latched(&mut input, &mut latch, &[release(KeyCode::Down)]).soft_drop);
    }

    #[test]
    fn ctrl_c_quits() {
        let mut input = InputState::new();
        let a = frame(
            &mut input,
            &[KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)],
        );
        assert!(a.quit);
    }

    #[test]
    fn unmapped_keys_are_ignored() {
        let mut input = InputState::new();
        let a = frame(&mut input, &[press(KeyCode::F(3)), press(KeyCode::Char('z'))]);
        assert_eq!(a, FrameInput::default());
    }
}
