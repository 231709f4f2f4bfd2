//! Playback mode and traversal state

use serde::{Deserialize, Serialize};
use std::fmt;

/// Slowest allowed playback speed multiplier
pub const MIN_SPEED: f64 = 0.25;
/// Fastest allowed playback speed multiplier
pub const MAX_SPEED: f64 = 4.0;

/// How the dataset is traversed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum PlaybackMode {
    /// One tone per point
    #[default]
    Discrete,
    /// One gliding tone across the remaining points
    Continuous,
}

impl PlaybackMode {
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackMode::Discrete => "discrete",
            PlaybackMode::Continuous => "continuous",
        }
    }
}

impl From<&str> for PlaybackMode {
    /// Anything other than `continuous` is discrete
    fn from(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("continuous") {
            PlaybackMode::Continuous
        } else {
            PlaybackMode::Discrete
        }
    }
}

impl From<String> for PlaybackMode {
    fn from(s: String) -> Self {
        PlaybackMode::from(s.as_str())
    }
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Snapshot of the controller's traversal state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    pub mode: PlaybackMode,
    /// Most recently rendered point, -1 before the first
    pub index: isize,
    pub playing: bool,
    pub paused: bool,
    pub speed: f64,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            mode: PlaybackMode::Discrete,
            index: -1,
            playing: false,
            paused: false,
            speed: 1.0,
        }
    }
}

impl PlaybackState {
    pub fn is_idle(&self) -> bool {
        !self.playing && !self.paused
    }

    /// Short human label for status lines
    pub fn label(&self) -> &'static str {
        if self.playing {
            "playing"
        } else if self.paused {
            "paused"
        } else {
            "stopped"
        }
    }
}

/// Clamp a requested speed into the supported range
pub fn clamp_speed(speed: f64) -> f64 {
    if speed.is_nan() {
        return 1.0;
    }
    speed.clamp(MIN_SPEED, MAX_SPEED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_coercion() {
        assert_eq!(PlaybackMode::from("continuous"), PlaybackMode::Continuous);
        assert_eq!(PlaybackMode::from("Continuous"), PlaybackMode::Continuous);
        assert_eq!(PlaybackMode::from("discrete"), PlaybackMode::Discrete);
        assert_eq!(PlaybackMode::from("warp"), PlaybackMode::Discrete);
        assert_eq!(PlaybackMode::from(""), PlaybackMode::Discrete);
    }

    #[test]
    fn test_mode_serializes_lowercase() {
        let yaml = serde_yaml::to_string(&PlaybackMode::Continuous).unwrap();
        assert_eq!(yaml.trim(), "continuous");
    }

    #[test]
    fn test_clamp_speed() {
        assert_eq!(clamp_speed(0.1), MIN_SPEED);
        assert_eq!(clamp_speed(10.0), MAX_SPEED);
        assert_eq!(clamp_speed(1.5), 1.5);
        assert_eq!(clamp_speed(f64::NAN), 1.0);
    }

    #[test]
    fn test_default_state_is_idle() {
        let state = PlaybackState::default();
        assert!(state.is_idle());
        assert_eq!(state.index, -1);
        assert_eq!(state.label(), "stopped");
    }
}
