//! Basic oscillator implementation

use std::f64::consts::PI;

/// Waveform types (the timbre of a tone)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Triangle,
    Sawtooth,
    Square,
}

impl Waveform {
    /// Parse a waveform name; unknown names fall back to sine
    pub fn from_name(name: &str) -> Self {
        Self::parse(name).unwrap_or_default()
    }

    /// Parse a waveform name strictly
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "sine" => Some(Waveform::Sine),
            "triangle" => Some(Waveform::Triangle),
            "sawtooth" | "saw" => Some(Waveform::Sawtooth),
            "square" => Some(Waveform::Square),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Triangle => "triangle",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Square => "square",
        }
    }
}

/// A phase-accumulating oscillator
pub struct Oscillator {
    waveform: Waveform,
    phase: f64,
    frequency: f64,
    sample_rate: f64,
}

impl Oscillator {
    /// Create a new oscillator
    pub fn new(waveform: Waveform, frequency: f64, sample_rate: f64) -> Self {
        Self {
            waveform,
            phase: 0.0,
            frequency,
            sample_rate,
        }
    }

    /// Set the frequency (phase is kept so sweeps glide without clicks)
    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency;
    }

    /// Get the current frequency
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Generate the next sample
    pub fn generate(&mut self) -> f64 {
        let p = self.phase;
        let sample = match self.waveform {
            Waveform::Sine => (p * 2.0 * PI).sin(),
            Waveform::Triangle => {
                if p < 0.25 {
                    4.0 * p
                } else if p < 0.75 {
                    2.0 - 4.0 * p
                } else {
                    4.0 * p - 4.0
                }
            }
            Waveform::Sawtooth => 2.0 * p - 1.0,
            Waveform::Square => {
                if p < 0.5 { 1.0 } else { -1.0 }
            }
        };

        self.phase += self.frequency / self.sample_rate;
        self.phase -= self.phase.floor();

        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waveform_names() {
        assert_eq!(Waveform::from_name("square"), Waveform::Square);
        assert_eq!(Waveform::from_name("SAW"), Waveform::Sawtooth);
        assert_eq!(Waveform::from_name("kazoo"), Waveform::Sine);
        assert_eq!(Waveform::parse("kazoo"), None);
        assert_eq!(Waveform::Triangle.name(), "triangle");
    }

    #[test]
    fn test_sine_starts_at_zero() {
        let mut osc = Oscillator::new(Waveform::Sine, 440.0, 44100.0);
        assert_eq!(osc.generate(), 0.0);
    }

    #[test]
    fn test_output_in_range() {
        for waveform in [Waveform::Sine, Waveform::Triangle, Waveform::Sawtooth, Waveform::Square] {
            let mut osc = Oscillator::new(waveform, 440.0, 44100.0);
            for _ in 0..1000 {
                let s = osc.generate();
                assert!((-1.0..=1.0).contains(&s), "{:?} out of range: {}", waveform, s);
            }
        }
    }

    #[test]
    fn test_square_wave_period() {
        // 100 Hz at 1000 Hz sample rate: 5 high samples, 5 low
        let mut osc = Oscillator::new(Waveform::Square, 100.0, 1000.0);
        let samples: Vec<f64> = (0..10).map(|_| osc.generate()).collect();
        assert_eq!(samples[0], 1.0);
        assert_eq!(samples[9], -1.0);
    }

    #[test]
    fn test_set_frequency() {
        let mut osc = Oscillator::new(Waveform::Sine, 220.0, 44100.0);
        osc.set_frequency(330.0);
        assert_eq!(osc.frequency(), 330.0);
    }
}
