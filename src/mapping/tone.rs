//! Tone and sweep parameters handed to a renderer

use crate::config::EnvelopeConfig;
use crate::synth::Waveform;

/// Everything needed to play one enveloped tone
#[derive(Debug, Clone, PartialEq)]
pub struct ToneParameters {
    /// Frequency in Hz
    pub frequency: f64,
    /// Peak volume 0.0-1.0
    pub volume: f64,
    /// Stereo position -1.0 (left) to 1.0 (right)
    pub pan: f64,
    /// Duration in seconds
    pub duration: f64,
    pub timbre: Waveform,
    pub envelope: EnvelopeConfig,
}

impl ToneParameters {
    /// Same tone, played `speed` times faster
    pub fn scaled(mut self, speed: f64) -> Self {
        self.duration /= speed;
        self
    }
}

/// Orientation markers played at sequence start and end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Start,
    End,
}

impl Marker {
    pub fn name(&self) -> &'static str {
        match self {
            Marker::Start => "start",
            Marker::End => "end",
        }
    }

    /// Fixed tone for this marker: a high blip to start, a low one to end
    pub fn tone(&self) -> ToneParameters {
        let (frequency, duration) = match self {
            Marker::Start => (880.0, 0.1),
            Marker::End => (220.0, 0.2),
        };
        ToneParameters {
            frequency,
            volume: 0.4,
            pan: 0.0,
            duration,
            timbre: Waveform::Triangle,
            envelope: EnvelopeConfig {
                attack: 0.01,
                decay: 0.02,
                sustain: 0.8,
                release: 0.05,
            },
        }
    }
}

/// A single sustained tone whose frequency and pan glide across a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct SweepParameters {
    /// One frequency per point, in playback order
    pub frequencies: Vec<f64>,
    /// One pan position per point
    pub pans: Vec<f64>,
    /// Total sweep length in seconds
    pub duration: f64,
    pub volume: f64,
    pub timbre: Waveform,
    /// Fade in/out time in seconds
    pub fade: f64,
}

impl SweepParameters {
    /// Number of points in the sweep
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Length of one point's slice of the sweep
    pub fn slice_duration(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.duration / self.len() as f64
        }
    }

    /// Frequency at `t` seconds into the sweep
    pub fn frequency_at(&self, t: f64) -> f64 {
        self.ramp(&self.frequencies, t)
    }

    /// Pan at `t` seconds into the sweep
    pub fn pan_at(&self, t: f64) -> f64 {
        self.ramp(&self.pans, t)
    }

    /// Gain envelope at `t`: linear fades at both edges
    pub fn gain_at(&self, t: f64) -> f64 {
        if t < 0.0 || t >= self.duration {
            return 0.0;
        }
        let fade = self.fade.min(self.duration / 2.0);
        if fade <= 0.0 {
            return self.volume;
        }
        let edge = (t / fade).min((self.duration - t) / fade).min(1.0);
        self.volume * edge
    }

    /// Index of the point sounding at `t`
    pub fn index_at(&self, t: f64) -> usize {
        let slice = self.slice_duration();
        if slice <= 0.0 {
            return 0;
        }
        ((t.max(0.0) / slice).floor() as usize).min(self.len().saturating_sub(1))
    }

    /// Piecewise-linear ramp: value `i` is reached at the start of slice `i`
    /// and the last value holds through the final slice.
    fn ramp(&self, values: &[f64], t: f64) -> f64 {
        match values.len() {
            0 => 0.0,
            1 => values[0],
            n => {
                let slice = self.slice_duration();
                let position = (t.max(0.0) / slice).min((n - 1) as f64);
                let i = position.floor() as usize;
                if i + 1 >= n {
                    return values[n - 1];
                }
                let frac = position - i as f64;
                values[i] + (values[i + 1] - values[i]) * frac
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweep() -> SweepParameters {
        SweepParameters {
            frequencies: vec![200.0, 400.0, 300.0, 500.0],
            pans: vec![-1.0, -0.5, 0.5, 1.0],
            duration: 2.0,
            volume: 0.5,
            timbre: Waveform::Sine,
            fade: 0.1,
        }
    }

    #[test]
    fn test_marker_tones() {
        assert_eq!(Marker::Start.tone().frequency, 880.0);
        assert_eq!(Marker::End.tone().duration, 0.2);
        assert_eq!(Marker::End.name(), "end");
    }

    #[test]
    fn test_scaled_tone() {
        let tone = Marker::Start.tone().scaled(2.0);
        assert!((tone.duration - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_sweep_ramp_breakpoints() {
        let s = sweep();
        assert_eq!(s.slice_duration(), 0.5);
        assert_eq!(s.frequency_at(0.0), 200.0);
        assert_eq!(s.frequency_at(0.25), 300.0);
        assert_eq!(s.frequency_at(0.5), 400.0);
        assert_eq!(s.frequency_at(1.5), 500.0);
        assert_eq!(s.frequency_at(1.9), 500.0);
        assert_eq!(s.pan_at(0.75), 0.0);
    }

    #[test]
    fn test_sweep_index_at() {
        let s = sweep();
        assert_eq!(s.index_at(0.0), 0);
        assert_eq!(s.index_at(0.49), 0);
        assert_eq!(s.index_at(0.5), 1);
        assert_eq!(s.index_at(1.99), 3);
        assert_eq!(s.index_at(10.0), 3);
    }

    #[test]
    fn test_sweep_gain_fades() {
        let s = sweep();
        assert_eq!(s.gain_at(0.0), 0.0);
        assert!((s.gain_at(0.05) - 0.25).abs() < 1e-9);
        assert_eq!(s.gain_at(1.0), 0.5);
        assert!((s.gain_at(1.95) - 0.25).abs() < 1e-9);
        assert_eq!(s.gain_at(2.0), 0.0);
    }
}
