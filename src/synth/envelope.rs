//! ADSR envelope generator
//!
//! Attack-Decay-Sustain-Release envelope for amplitude shaping.

use crate::config::EnvelopeConfig;

/// Envelope stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// Sample-driven ADSR envelope
pub struct Envelope {
    sample_rate: f64,
    attack: f64,
    decay: f64,
    sustain: f64,
    release: f64,

    stage: EnvelopeStage,
    level: f64,
    release_start_level: f64,
}

/// Shortest stage time, keeps per-sample rates finite
const MIN_STAGE_SECS: f64 = 0.001;

impl Envelope {
    /// Create an envelope from configuration
    pub fn new(config: &EnvelopeConfig, sample_rate: f64) -> Self {
        Self {
            sample_rate,
            attack: config.attack.max(MIN_STAGE_SECS),
            decay: config.decay.max(MIN_STAGE_SECS),
            sustain: config.sustain.clamp(0.0, 1.0),
            release: config.release.max(MIN_STAGE_SECS),
            stage: EnvelopeStage::Idle,
            level: 0.0,
            release_start_level: 0.0,
        }
    }

    pub fn attack_time(&self) -> f64 {
        self.attack
    }

    /// Release time in seconds
    pub fn release_time(&self) -> f64 {
        self.release
    }

    /// Shrink attack and release so both fit inside a note of `duration`
    /// seconds, each taking at most half of it
    pub fn fit_to(&mut self, duration: f64) {
        let half = (duration / 2.0).max(MIN_STAGE_SECS);
        self.attack = self.attack.min(half);
        self.release = self.release.min(half);
    }

    /// Trigger the envelope (start attack phase)
    pub fn trigger(&mut self) {
        self.stage = EnvelopeStage::Attack;
    }

    /// Release the envelope (start release phase)
    pub fn release(&mut self) {
        if self.stage != EnvelopeStage::Idle && self.stage != EnvelopeStage::Release {
            self.release_start_level = self.level;
            self.stage = EnvelopeStage::Release;
        }
    }

    /// Get current stage
    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    /// Check if envelope is active (not idle)
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }

    /// Get current level without advancing
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Generate the next envelope sample
    pub fn process(&mut self) -> f64 {
        let dt = 1.0 / self.sample_rate;

        match self.stage {
            EnvelopeStage::Idle => {
                self.level = 0.0;
            }
            EnvelopeStage::Attack => {
                self.level += dt / self.attack;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeStage::Decay;
                }
            }
            EnvelopeStage::Decay => {
                self.level -= (1.0 - self.sustain) * dt / self.decay;
                if self.level <= self.sustain {
                    self.level = self.sustain;
                    self.stage = EnvelopeStage::Sustain;
                }
            }
            EnvelopeStage::Sustain => {
                self.level = self.sustain;
            }
            EnvelopeStage::Release => {
                self.level -= self.release_start_level * dt / self.release;
                if self.level <= 0.0 {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }

        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> EnvelopeConfig {
        EnvelopeConfig {
            attack: 0.001,
            decay: 0.001,
            sustain: 0.5,
            release: 0.01,
        }
    }

    #[test]
    fn test_envelope_creation() {
        let env = Envelope::new(&EnvelopeConfig::default(), 44100.0);
        assert_eq!(env.stage(), EnvelopeStage::Idle);
        assert_eq!(env.level(), 0.0);
        assert!(!env.is_active());
    }

    #[test]
    fn test_envelope_attack_phase() {
        let mut env = Envelope::new(&EnvelopeConfig::default(), 44100.0);
        env.trigger();
        assert_eq!(env.stage(), EnvelopeStage::Attack);

        // 20ms attack is 882 samples at 44100 Hz
        for _ in 0..900 {
            env.process();
        }
        assert!(env.level() > 0.9);
    }

    #[test]
    fn test_envelope_sustain_level() {
        let mut env = Envelope::new(&fast(), 44100.0);
        env.trigger();
        for _ in 0..500 {
            env.process();
        }
        assert!((env.level() - 0.5).abs() < 0.01);
        assert_eq!(env.stage(), EnvelopeStage::Sustain);
    }

    #[test]
    fn test_envelope_release() {
        let mut env = Envelope::new(&fast(), 44100.0);
        env.trigger();
        for _ in 0..200 {
            env.process();
        }

        env.release();
        assert_eq!(env.stage(), EnvelopeStage::Release);
        for _ in 0..1000 {
            env.process();
        }
        assert_eq!(env.level(), 0.0);
        assert_eq!(env.stage(), EnvelopeStage::Idle);
    }

    #[test]
    fn test_zero_times_are_clamped() {
        let config = EnvelopeConfig { attack: 0.0, decay: 0.0, sustain: 2.0, release: 0.0 };
        let mut env = Envelope::new(&config, 1000.0);
        assert_eq!(env.release_time(), 0.001);
        env.trigger();
        assert_eq!(env.process(), 1.0);
    }

    #[test]
    fn test_fit_to_short_note() {
        let mut env = Envelope::new(&EnvelopeConfig::default(), 44100.0);
        env.fit_to(0.05);
        assert_eq!(env.attack_time(), 0.02);
        assert_eq!(env.release_time(), 0.025);

        // Long notes keep the configured times
        let mut env = Envelope::new(&EnvelopeConfig::default(), 44100.0);
        env.fit_to(1.0);
        assert_eq!(env.release_time(), 0.1);
    }
}
