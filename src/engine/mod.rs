//! Audio engine for sonify
//!
//! Mixes tone and sweep voices into a stereo stream, and provides the
//! real-time player, the WAV recorder and the synth-backed tone renderer.

mod offline;
mod player;
mod recorder;
mod renderer;

pub use offline::{render_to_wav, RenderSummary};
pub use player::{default_device_name, list_output_devices, Player};
pub use recorder::{Recorder, Take};
pub use renderer::SynthRenderer;

use std::f64::consts::FRAC_PI_4;

use crate::config::AudioConfig;
use crate::synth::Voice;

/// The stereo mixer
pub struct Engine {
    voices: Vec<Box<dyn Voice>>,
    sample_rate: f64,
    master_volume: f64,
}

impl Engine {
    /// Create a new engine with the given configuration
    pub fn new(config: &AudioConfig) -> Self {
        Self {
            voices: Vec::new(),
            sample_rate: config.sample_rate as f64,
            master_volume: config.master_volume.clamp(0.0, 1.0),
        }
    }

    /// Get the sample rate
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Output stream rate may differ from the configured one
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
    }

    /// Add a voice to the mix
    pub fn add_voice(&mut self, voice: Box<dyn Voice>) {
        self.voices.push(voice);
    }

    /// Number of voices still sounding
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Silence and drop every voice
    pub fn stop_all(&mut self) {
        for voice in &mut self.voices {
            voice.stop();
        }
        self.voices.clear();
    }

    /// Generate the next stereo frame (left, right)
    pub fn process(&mut self) -> (f32, f32) {
        let mut left = 0.0;
        let mut right = 0.0;

        for voice in &mut self.voices {
            if voice.is_active() {
                let (sample, pan) = voice.process();
                // Equal-power pan law
                let angle = (pan.clamp(-1.0, 1.0) + 1.0) * FRAC_PI_4;
                left += sample * angle.cos();
                right += sample * angle.sin();
            }
        }
        self.voices.retain(|v| v.is_active());

        let gain = self.master_volume;
        (
            (left * gain).clamp(-1.0, 1.0) as f32,
            (right * gain).clamp(-1.0, 1.0) as f32,
        )
    }

    /// Fill an interleaved buffer with `channels` samples per frame.
    /// Mono outputs get the average of both sides; extra channels stay silent.
    pub fn fill_buffer(&mut self, buffer: &mut [f32], channels: usize) {
        for frame in buffer.chunks_mut(channels.max(1)) {
            let (left, right) = self.process();
            match frame.len() {
                1 => frame[0] = (left + right) / 2.0,
                _ => {
                    frame[0] = left;
                    frame[1] = right;
                    for extra in frame.iter_mut().skip(2) {
                        *extra = 0.0;
                    }
                }
            }
        }
    }
}
