/// Sound engine: procedural 8-bit style sound effects via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink, so
/// `AudioHook::play` never stalls the frame.
///
/// Compile with `--no-default-features` or without "sound" feature
/// to disable audio entirely (the stub SoundEngine does nothing).

use crate::sim::event::GameEvent;
use crate::sim::hooks::AudioHook;

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::PI;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use crate::sim::event::GameEvent;

    const SAMPLE_RATE: u32 = 22050;

    /// Pre-generated WAV buffers for each sound effect.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_rotate: Arc<Vec<u8>>,
        sfx_lock: Arc<Vec<u8>>,
        sfx_clear: Arc<Vec<u8>>,
        sfx_drop: Arc<Vec<u8>>,
        sfx_game_over: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        /// `None` when no output device is available.
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_rotate: Arc::new(make_wav(&gen_blip(880.0, 0.04, 0.2))),
                sfx_lock: Arc::new(make_wav(&gen_lock())),
                sfx_clear: Arc::new(make_wav(&gen_clear())),
                sfx_drop: Arc::new(make_wav(&gen_drop())),
                sfx_game_over: Arc::new(make_wav(&gen_game_over())),
            })
        }

        pub fn play_event(&self, event: GameEvent) {
            let buf = match event {
                GameEvent::RotateSuccess => &self.sfx_rotate,
                GameEvent::Lock => &self.sfx_lock,
                GameEvent::LineClear => &self.sfx_clear,
                GameEvent::HardDrop => &self.sfx_drop,
                GameEvent::GameOver => &self.sfx_game_over,
            };
            self.play(buf);
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn samples_for(duration: f32) -> usize {
        (SAMPLE_RATE as f32 * duration) as usize
    }

    /// Simple sine blip at given frequency and duration
    fn gen_blip(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = samples_for(duration);
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32); // linear fade out
                (t * freq * 2.0 * PI).sin() * env * volume
            })
            .collect()
    }

    /// Lock: low square-ish thud
    fn gen_lock() -> Vec<f32> {
        let n = samples_for(0.07);
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = (1.0 - i as f32 / n as f32).powf(2.0);
                let wave = (t * 140.0 * 2.0 * PI).sin() * 0.7
                    + (t * 420.0 * 2.0 * PI).sin() * 0.3;
                wave * env * 0.35
            })
            .collect()
    }

    /// Hard drop: fast descending sweep with a little noise
    fn gen_drop() -> Vec<f32> {
        let n = samples_for(0.1);
        let mut rng: u32 = 2463534242;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 700.0 - t * 550.0;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let tone = (ti * freq * 2.0 * PI).sin();
                // Simple LCG noise
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let env = (1.0 - t).powf(0.7);
                (tone * 0.7 + noise * 0.3) * env * 0.3
            })
            .collect()
    }

    /// Line clear: ascending arpeggio C5→E5→G5→C6
    fn gen_clear() -> Vec<f32> {
        let notes = [523.0_f32, 659.0, 784.0, 1047.0];
        let mut samples = Vec::new();
        for &freq in &notes {
            let n = samples_for(0.06);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * 2.0 * PI).sin() * 0.7
                    + (t * freq * 3.0 * 2.0 * PI).sin() * 0.3;
                samples.push(wave * env * 0.25);
            }
        }
        samples
    }

    /// Game over: sad descending tone with a final fade
    fn gen_game_over() -> Vec<f32> {
        let notes = [440.0_f32, 370.0, 311.0, 261.0]; // A4→F#4→Eb4→C4
        let mut samples = Vec::new();
        for &freq in &notes {
            let n = samples_for(0.16);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.3;
                samples.push((t * freq * 2.0 * PI).sin() * env * 0.3);
            }
        }
        let total = samples.len();
        let fade_len = total / 4;
        for (k, s) in samples[total - fade_len..].iter_mut().enumerate() {
            *s *= (fade_len - k) as f32 / fade_len as f32;
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2; // 16-bit = 2 bytes per sample
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM format
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wav_header_matches_payload() {
            let wav = make_wav(&gen_lock());
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(&wav[8..12], b"WAVE");
            let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]) as usize;
            assert_eq!(wav.len(), 44 + data_size);
            assert_eq!(data_size, samples_for(0.07) * 2);
        }

        #[test]
        fn samples_stay_in_range() {
            for samples in [gen_lock(), gen_drop(), gen_clear(), gen_game_over()] {
                assert!(!samples.is_empty());
                assert!(samples.iter().all(|s| s.abs() <= 1.0));
            }
        }

        #[test]
        fn out_of_range_samples_are_clamped() {
            let wav = make_wav(&[2.0, -2.0]);
            assert_eq!(i16::from_le_bytes([wav[44], wav[45]]), 32767);
            assert_eq!(i16::from_le_bytes([wav[46], wav[47]]), -32767);
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_event(&self, _event: GameEvent) {}
}

impl AudioHook for SoundEngine {
    fn play(&self, event: GameEvent) {
        self.play_event(event);
    }
}
