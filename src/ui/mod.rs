/// Terminal-facing adapters: input mappers, renderer and audio.

pub mod gamepad;
pub mod input;
pub mod renderer;
pub mod sound;
