//! Configuration schema definitions

use anyhow::{bail, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use crate::playback::PlaybackMode;

/// Main configuration for a sonification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SonifyConfig {
    /// Pitch mapping (`pitch: value` is shorthand for `pitch: { field: value }`)
    #[serde(deserialize_with = "field_shorthand")]
    pub pitch: PitchConfig,

    /// Volume mapping (same shorthand as pitch)
    #[serde(deserialize_with = "field_shorthand")]
    pub volume: VolumeConfig,

    /// Stereo spread
    pub pan: PanConfig,

    /// Independent-axis field for scatter-style datasets
    pub x: Option<String>,

    /// Note duration: milliseconds, or a field mapping
    pub duration: DurationConfig,

    /// Silence between notes in milliseconds (default: 50)
    pub gap: f64,

    /// Playback mode (default: discrete)
    pub mode: PlaybackMode,

    /// Amplitude envelope applied to every tone
    pub envelope: EnvelopeConfig,

    /// Orientation markers
    pub markers: MarkersConfig,

    /// Waveform selection
    pub timbre: TimbreConfig,

    /// Narration and focus behaviour
    pub accessibility: AccessibilityConfig,

    /// Audio output settings
    pub audio: AudioConfig,

    /// Start playing as soon as the dataset is bound
    pub auto_play: bool,
}

impl Default for SonifyConfig {
    fn default() -> Self {
        Self {
            pitch: PitchConfig::default(),
            volume: VolumeConfig::default(),
            pan: PanConfig::default(),
            x: None,
            duration: DurationConfig::default(),
            gap: default_gap(),
            mode: PlaybackMode::default(),
            envelope: EnvelopeConfig::default(),
            markers: MarkersConfig::default(),
            timbre: TimbreConfig::default(),
            accessibility: AccessibilityConfig::default(),
            audio: AudioConfig::default(),
            auto_play: false,
        }
    }
}

impl SonifyConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.audio.sample_rate < 8000 || self.audio.sample_rate > 192000 {
            bail!("Sample rate must be between 8000 and 192000");
        }
        if !(0.0..=1.0).contains(&self.audio.master_volume) {
            bail!("Master volume must be between 0.0 and 1.0");
        }

        let [lo, hi] = self.pitch.range;
        if !(lo > 0.0 && hi > 0.0 && lo.is_finite() && hi.is_finite()) {
            bail!("Pitch range must be positive frequencies in Hz");
        }
        for v in self.volume.range {
            if !(0.0..=1.0).contains(&v) {
                bail!("Volume range must lie within 0.0 and 1.0");
            }
        }
        for p in self.pan.range {
            if !(-1.0..=1.0).contains(&p) {
                bail!("Pan range must lie within -1.0 and 1.0");
            }
        }

        match &self.duration {
            DurationConfig::Fixed(ms) if *ms <= 0.0 || !ms.is_finite() => {
                bail!("Duration must be a positive number of milliseconds");
            }
            DurationConfig::Mapped { range, .. } if range.iter().any(|ms| *ms <= 0.0) => {
                bail!("Duration range must be positive milliseconds");
            }
            _ => {}
        }
        if self.gap < 0.0 || !self.gap.is_finite() {
            bail!("Gap must not be negative");
        }

        let env = &self.envelope;
        if env.attack < 0.0 || env.decay < 0.0 || env.release < 0.0 {
            bail!("Envelope times must not be negative");
        }
        if !(0.0..=1.0).contains(&env.sustain) {
            bail!("Envelope sustain must be between 0.0 and 1.0");
        }

        Ok(())
    }

    /// True when points carry an independent-axis value (scatter-style data)
    pub fn is_two_dimensional(&self) -> bool {
        self.x.is_some()
    }
}

/// Accepts either a bare field name or the full struct
#[derive(Deserialize)]
#[serde(untagged)]
enum Shorthand<T> {
    Field(String),
    Full(T),
}

fn field_shorthand<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + From<String>,
{
    Ok(match Shorthand::<T>::deserialize(deserializer)? {
        Shorthand::Field(field) => T::from(field),
        Shorthand::Full(config) => config,
    })
}

/// Pitch channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchConfig {
    /// Field to read (None = auto-detect `value`/`y` or a bare number)
    pub field: Option<String>,

    /// Frequency range [min, max] in Hz (default: 220..880)
    pub range: [f64; 2],

    /// Scale name, or `continuous` (default: pentatonic)
    pub scale: String,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            field: None,
            range: [220.0, 880.0],
            scale: "pentatonic".to_string(),
        }
    }
}

impl From<String> for PitchConfig {
    fn from(field: String) -> Self {
        Self {
            field: Some(field),
            ..Self::default()
        }
    }
}

/// Volume channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeConfig {
    /// Field to read (None = constant volume at the range midpoint)
    pub field: Option<String>,

    /// Volume range 0.0-1.0 (default: 0.4..0.7)
    pub range: [f64; 2],
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            field: None,
            range: [0.4, 0.7],
        }
    }
}

impl From<String> for VolumeConfig {
    fn from(field: String) -> Self {
        Self {
            field: Some(field),
            ..Self::default()
        }
    }
}

/// Stereo panning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanConfig {
    /// Left to right spread (default: -0.7..0.7)
    pub range: [f64; 2],
}

impl Default for PanConfig {
    fn default() -> Self {
        Self { range: [-0.7, 0.7] }
    }
}

/// Note duration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DurationConfig {
    /// Same duration for every note, in milliseconds
    Fixed(f64),
    /// Duration driven by a data field
    Mapped {
        field: String,
        #[serde(default = "default_duration_range")]
        range: [f64; 2],
    },
}

impl Default for DurationConfig {
    fn default() -> Self {
        DurationConfig::Fixed(200.0)
    }
}

impl DurationConfig {
    /// Representative note length in milliseconds, used for pacing sweeps
    pub fn base_ms(&self) -> f64 {
        match self {
            DurationConfig::Fixed(ms) => *ms,
            DurationConfig::Mapped { range, .. } => (range[0] + range[1]) / 2.0,
        }
    }
}

fn default_duration_range() -> [f64; 2] { [100.0, 400.0] }
fn default_gap() -> f64 { 50.0 }

/// ADSR envelope (times in seconds, sustain as a level)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnvelopeConfig {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            attack: 0.02,
            decay: 0.05,
            sustain: 0.7,
            release: 0.1,
        }
    }
}

/// Start/end orientation tones
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkersConfig {
    pub start: bool,
    pub end: bool,
}

impl Default for MarkersConfig {
    fn default() -> Self {
        Self { start: true, end: true }
    }
}

/// Waveform selection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TimbreConfig {
    /// One waveform for every point (`sine`, `square`, `sawtooth`, `triangle`)
    Constant(String),
    /// Category field looked up in a category -> waveform table
    Mapped {
        field: String,
        #[serde(default)]
        mapping: HashMap<String, String>,
    },
}

impl Default for TimbreConfig {
    fn default() -> Self {
        TimbreConfig::Constant("sine".to_string())
    }
}

/// Narration and focus settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessibilityConfig {
    /// Narrate each point as it plays
    pub announce: bool,
    /// Narrate a dataset summary when playback starts
    pub announce_summary: bool,
    /// Move visual focus along with playback
    pub focus: bool,
    /// Arrow/Home/End/Space/Escape navigation
    pub keyboard: bool,
    /// Preview points under the pointer
    pub hover: bool,
}

impl Default for AccessibilityConfig {
    fn default() -> Self {
        Self {
            announce: true,
            announce_summary: true,
            focus: true,
            keyboard: true,
            hover: true,
        }
    }
}

/// Audio output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Sample rate in Hz (default: 44100)
    pub sample_rate: u32,

    /// Master volume 0.0-1.0 (default: 0.5)
    pub master_volume: f64,

    /// Output device name (None = default device)
    pub device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            master_volume: 0.5,
            device: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: SonifyConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.pitch.range, [220.0, 880.0]);
        assert_eq!(config.pitch.scale, "pentatonic");
        assert_eq!(config.volume.range, [0.4, 0.7]);
        assert_eq!(config.pan.range, [-0.7, 0.7]);
        assert_eq!(config.duration, DurationConfig::Fixed(200.0));
        assert_eq!(config.gap, 50.0);
        assert_eq!(config.mode, PlaybackMode::Discrete);
        assert!(config.markers.start && config.markers.end);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_field_shorthand() {
        let yaml = r#"
pitch: sales
volume: profit
"#;
        let config: SonifyConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.pitch.field.as_deref(), Some("sales"));
        assert_eq!(config.pitch.range, [220.0, 880.0]);
        assert_eq!(config.volume.field.as_deref(), Some("profit"));
    }

    #[test]
    fn test_full_pitch_config() {
        let yaml = r#"
pitch:
  field: temperature
  range: [200, 800]
  scale: continuous
duration:
  field: weight
  range: [150, 300]
timbre:
  field: kind
  mapping:
    alpha: square
"#;
        let config: SonifyConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.pitch.field.as_deref(), Some("temperature"));
        assert_eq!(config.pitch.range, [200.0, 800.0]);
        assert_eq!(config.pitch.scale, "continuous");
        assert_eq!(config.duration.base_ms(), 225.0);
        assert!(matches!(config.timbre, TimbreConfig::Mapped { .. }));
    }

    #[test]
    fn test_unknown_mode_coerces_to_discrete() {
        let config: SonifyConfig = serde_yaml::from_str("mode: warp").unwrap();
        assert_eq!(config.mode, PlaybackMode::Discrete);

        let config: SonifyConfig = serde_yaml::from_str("mode: continuous").unwrap();
        assert_eq!(config.mode, PlaybackMode::Continuous);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = SonifyConfig::default();
        config.gap = -1.0;
        assert!(config.validate().is_err());

        let mut config = SonifyConfig::default();
        config.duration = DurationConfig::Fixed(0.0);
        assert!(config.validate().is_err());

        let mut config = SonifyConfig::default();
        config.envelope.sustain = 1.5;
        assert!(config.validate().is_err());

        let mut config = SonifyConfig::default();
        config.pan.range = [-2.0, 1.0];
        assert!(config.validate().is_err());
    }
}
