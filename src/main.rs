/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use rand::rngs::StdRng;
use rand::SeedableRng;

use config::GameConfig;
use domain::action::{ActionBuffer, SoftDropLatch};
use sim::event::GameEvent;
use sim::hooks::{AudioHook, RenderSurface, Silent};
use sim::kinds::RandomKinds;
use sim::session::{GameSession, Phase};
use sim::step;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

/// Longest frame the simulation will see.
const MAX_FRAME_SECS: f64 = 0.25;

/// Keys that dismiss the game-over screen (quit keys go through the tick).
const KEYS_DISMISS: &[KeyCode] = &[KeyCode::Enter];

fn main() {
    let config = GameConfig::load();

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut session = GameSession::new(Box::new(RandomKinds::new(rng)));

    let mut renderer = Renderer::new(config.display.show_next);

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let audio: Box<dyn AudioHook> = if config.audio.muted {
        Box::new(Silent)
    } else {
        match SoundEngine::new() {
            Some(engine) => Box::new(engine),
            None => Box::new(Silent),
        }
    };

    let result = game_loop(&mut session, &mut renderer, audio.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    if let Some(msg) = exit_message(&session) {
        println!("{msg}");
    }
}

/// Final line for the shell; a player who quits mid-game gets none.
fn exit_message(session: &GameSession) -> Option<String> {
    session.is_over().then(|| format!("Game Over! Score: {}", session.score))
}

fn game_loop(
    session: &mut GameSession,
    surface: &mut Renderer,
    audio: &dyn AudioHook,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = surface.keyboard_enhanced;
    let mut gp = GamepadState::new(&config.gamepad);
    let mut actions = ActionBuffer::new();
    let mut soft_drop = SoftDropLatch::default();
    let frame_sleep = Duration::from_millis(config.display.frame_ms);
    let mut last_frame = Instant::now();

    surface.present(&session.snapshot())?;

    while session.running {
        kb.drain_events();
        gp.update();

        // The final board stays up until the player dismisses it.
        if session.is_over() && (kb.any_pressed(KEYS_DISMISS) || gp.any_pressed()) {
            break;
        }

        kb.push_actions(&mut actions);
        gp.push_actions(&mut actions);
        soft_drop.sync(kb.soft_drop_held() || gp.soft_drop_held(), &mut actions);

        // Moves pressed while paused are dropped, not replayed on resume.
        if session.phase == Phase::Paused {
            actions.discard_pending();
        }

        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f64().min(MAX_FRAME_SECS);
        last_frame = now;

        let events = step::tick(session, dt, actions.drain());
        process_sound_events(audio, &events);

        surface.present(&session.snapshot())?;
        std::thread::sleep(frame_sleep);
    }

    Ok(())
}

fn process_sound_events(audio: &dyn AudioHook, events: &[GameEvent]) {
    for &event in events {
        audio.play(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shape::Kind;
    use crate::sim::kinds::KindSequence;

    fn session() -> GameSession {
        GameSession::new(Box::new(KindSequence::new(vec![Kind::T])))
    }

    #[test]
    fn quitting_mid_game_prints_nothing() {
        let mut s = session();
        s.score = 300;
        s.quit();
        assert_eq!(exit_message(&s), None);
    }

    #[test]
    fn game_over_prints_final_score() {
        let mut s = session();
        s.score = 1200;
        s.phase = Phase::GameOver;
        assert_eq!(exit_message(&s).as_deref(), Some("Game Over! Score: 1200"));
    }
}
