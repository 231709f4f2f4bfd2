//! Continuous frequency/pan sweep

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{Oscillator, Voice};
use crate::mapping::SweepParameters;

/// A sustained tone following a sweep's frequency and pan ramps.
///
/// The stop flag is shared with whoever started the sweep so it can be
/// cancelled from outside the audio thread.
pub struct SweepVoice {
    params: SweepParameters,
    oscillator: Oscillator,
    sample_rate: f64,
    elapsed: u64,
    stopped: Arc<AtomicBool>,
}

impl SweepVoice {
    pub fn new(params: SweepParameters, sample_rate: f64, stopped: Arc<AtomicBool>) -> Self {
        let start = params.frequency_at(0.0);
        Self {
            oscillator: Oscillator::new(params.timbre, start, sample_rate),
            params,
            sample_rate,
            elapsed: 0,
            stopped,
        }
    }

    fn time(&self) -> f64 {
        self.elapsed as f64 / self.sample_rate
    }
}

impl Voice for SweepVoice {
    fn is_active(&self) -> bool {
        !self.stopped.load(Ordering::SeqCst) && self.time() < self.params.duration
    }

    fn process(&mut self) -> (f64, f64) {
        let t = self.time();
        let pan = self.params.pan_at(t);
        if self.stopped.load(Ordering::SeqCst) {
            return (0.0, pan);
        }

        self.oscillator.set_frequency(self.params.frequency_at(t));
        let sample = self.oscillator.generate() * self.params.gain_at(t);
        self.elapsed += 1;
        (sample, pan)
    }

    fn stop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}
