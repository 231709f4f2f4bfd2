//! Data point to tone parameter mapping

use log::debug;
use serde_json::Value;
use std::collections::HashMap;

use super::extent::normalize;
use super::{lerp, Extent, LinearMapper, Mapper, QuantizeMapper, Scale, SweepParameters, ToneParameters};
use crate::config::{DurationConfig, EnvelopeConfig, SonifyConfig, TimbreConfig};
use crate::data::{Accessor, DataPoint, ResolvedAccessor};
use crate::synth::Waveform;

/// Extents computed by the last [`ValueMapper::analyze`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Extents {
    pub pitch: Option<Extent>,
    pub volume: Option<Extent>,
    pub duration: Option<Extent>,
    pub x: Option<Extent>,
}

enum DurationMapping {
    Fixed(f64),
    Mapped { accessor: ResolvedAccessor, range: [f64; 2] },
}

enum TimbreMapping {
    Constant(Waveform),
    Lookup { field: String, table: HashMap<String, Waveform> },
}

/// Maps data points to tone parameters.
///
/// Construction resolves every accessor; [`analyze`](Self::analyze) computes
/// the per-dataset extents; [`map`](Self::map) is then a pure function of
/// the point, its position and those extents.
pub struct ValueMapper {
    pitch: ResolvedAccessor,
    pitch_range: [f64; 2],
    frequency: Box<dyn Mapper>,
    volume: Option<ResolvedAccessor>,
    volume_range: [f64; 2],
    pan_range: [f64; 2],
    x: Option<ResolvedAccessor>,
    duration: DurationMapping,
    timbre: TimbreMapping,
    envelope: EnvelopeConfig,
    extents: Extents,
}

impl ValueMapper {
    /// Create a mapper from configuration
    pub fn new(config: &SonifyConfig) -> Self {
        let duration = match &config.duration {
            DurationConfig::Fixed(ms) => DurationMapping::Fixed(*ms),
            DurationConfig::Mapped { field, range } => DurationMapping::Mapped {
                accessor: Accessor::Field(field.clone()).resolve(),
                range: *range,
            },
        };

        let timbre = match &config.timbre {
            TimbreConfig::Constant(name) => TimbreMapping::Constant(Waveform::from_name(name)),
            TimbreConfig::Mapped { field, mapping } => TimbreMapping::Lookup {
                field: field.clone(),
                table: mapping
                    .iter()
                    .map(|(category, name)| (category.clone(), Waveform::from_name(name)))
                    .collect(),
            },
        };

        Self {
            pitch: Accessor::from_field(config.pitch.field.as_deref()).resolve(),
            pitch_range: config.pitch.range,
            frequency: frequency_mapper(config.pitch.range, &config.pitch.scale),
            volume: config
                .volume
                .field
                .as_deref()
                .map(|f| Accessor::Field(f.to_string()).resolve()),
            volume_range: config.volume.range,
            pan_range: config.pan.range,
            x: config.x.as_deref().map(|f| Accessor::Field(f.to_string()).resolve()),
            duration,
            timbre,
            envelope: config.envelope,
            extents: Extents::default(),
        }
    }

    /// Override the pitch accessor (an explicit function beats any field name)
    pub fn with_pitch_accessor(mut self, accessor: Accessor) -> Self {
        self.pitch = accessor.resolve();
        self
    }

    /// Drive volume from an accessor
    pub fn with_volume_accessor(mut self, accessor: Accessor) -> Self {
        self.volume = Some(accessor.resolve());
        self
    }

    /// Read the independent axis through an accessor (scatter-style data)
    pub fn with_x_accessor(mut self, accessor: Accessor) -> Self {
        self.x = Some(accessor.resolve());
        self
    }

    /// Compute extents for every configured channel, replacing the previous ones
    pub fn analyze(&mut self, points: &[DataPoint]) {
        let extent_of = |accessor: &ResolvedAccessor| {
            Extent::from_values(
                points
                    .iter()
                    .filter_map(|p| accessor.get(&p.value, p.sequence_index)),
            )
        };

        self.extents = Extents {
            pitch: extent_of(&self.pitch),
            volume: self.volume.as_ref().and_then(extent_of),
            duration: match &self.duration {
                DurationMapping::Mapped { accessor, .. } => extent_of(accessor),
                DurationMapping::Fixed(_) => None,
            },
            x: self.x.as_ref().and_then(extent_of),
        };
    }

    pub fn extents(&self) -> &Extents {
        &self.extents
    }

    /// True when points are positioned by an independent axis
    pub fn is_two_dimensional(&self) -> bool {
        self.x.is_some()
    }

    /// The value driving pitch, if the point has one
    pub fn pitch_value(&self, point: &DataPoint) -> Option<f64> {
        self.pitch.get(&point.value, point.sequence_index)
    }

    /// The independent-axis value, if configured and present
    pub fn x_value(&self, point: &DataPoint) -> Option<f64> {
        self.x.as_ref()?.get(&point.value, point.sequence_index)
    }

    /// Map a point to tone parameters
    pub fn map(&self, point: &DataPoint, index: usize, total: usize) -> ToneParameters {
        ToneParameters {
            frequency: self.map_pitch(point),
            volume: self.map_volume(point),
            pan: self.map_pan(point, index, total),
            duration: self.map_duration(point),
            timbre: self.map_timbre(point),
            envelope: self.envelope,
        }
    }

    fn map_pitch(&self, point: &DataPoint) -> f64 {
        let normalized = normalize(self.pitch_value(point), self.extents.pitch);
        self.frequency.map(normalized)
    }

    fn map_volume(&self, point: &DataPoint) -> f64 {
        let Some(accessor) = &self.volume else {
            return midpoint(self.volume_range);
        };
        match accessor.get(&point.value, point.sequence_index) {
            Some(v) => {
                let extent = self.extents.volume.or(self.extents.pitch);
                lerp(normalize(Some(v), extent), self.volume_range)
            }
            None => midpoint(self.volume_range),
        }
    }

    fn map_pan(&self, point: &DataPoint, index: usize, total: usize) -> f64 {
        if let (Some(x), Some(extent)) = (self.x_value(point), self.extents.x) {
            return lerp(extent.normalize(x), self.pan_range);
        }
        map_pan(index, total, self.pan_range)
    }

    fn map_duration(&self, point: &DataPoint) -> f64 {
        let ms = match &self.duration {
            DurationMapping::Fixed(ms) => *ms,
            DurationMapping::Mapped { accessor, range } => {
                let value = accessor.get(&point.value, point.sequence_index);
                let extent = self.extents.duration.or(self.extents.pitch);
                lerp(normalize(value, extent), *range)
            }
        };
        ms / 1000.0
    }

    fn map_timbre(&self, point: &DataPoint) -> Waveform {
        match &self.timbre {
            TimbreMapping::Constant(waveform) => *waveform,
            TimbreMapping::Lookup { field, table } => point
                .value
                .get(field)
                .and_then(category_key)
                .and_then(|key| table.get(&key).copied())
                .unwrap_or_default(),
        }
    }

    /// Sweep over `points[start..]`, each point holding `seconds_per_point`
    pub fn sweep(&self, points: &[DataPoint], start: usize, seconds_per_point: f64) -> SweepParameters {
        let total = points.len();
        let tones: Vec<ToneParameters> = points
            .iter()
            .enumerate()
            .skip(start)
            .map(|(i, p)| self.map(p, i, total))
            .collect();

        let duration = tones.len() as f64 * seconds_per_point;
        let volume = if tones.is_empty() {
            midpoint(self.volume_range)
        } else {
            tones.iter().map(|t| t.volume).sum::<f64>() / tones.len() as f64
        };

        SweepParameters {
            frequencies: tones.iter().map(|t| t.frequency).collect(),
            pans: tones.iter().map(|t| t.pan).collect(),
            duration,
            volume,
            timbre: tones.first().map(|t| t.timbre).unwrap_or_default(),
            fade: (duration / 4.0).min(0.05),
        }
    }

    /// The configured pitch range in Hz
    pub fn pitch_range(&self) -> [f64; 2] {
        self.pitch_range
    }
}

fn midpoint(range: [f64; 2]) -> f64 {
    (range[0] + range[1]) / 2.0
}

fn category_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn frequency_mapper(range: [f64; 2], scale: &str) -> Box<dyn Mapper> {
    match Scale::from_name(scale) {
        Some(scale) => Box::new(QuantizeMapper::new(scale.name(), range[0], range[1], &scale)),
        None => {
            if !scale.eq_ignore_ascii_case("continuous") {
                debug!("Unknown scale '{}', using continuous pitch", scale);
            }
            Box::new(LinearMapper::unit("continuous", range))
        }
    }
}

/// Frequency for a normalized value within `range` (Hz), quantized to `scale`
/// unless the scale is `continuous` or unknown
pub fn value_to_frequency(normalized: f64, range: [f64; 2], scale: &str) -> f64 {
    frequency_mapper(range, scale).map(normalized)
}

/// Position-based stereo pan: first point at `range[0]`, last at `range[1]`
pub fn map_pan(index: usize, total: usize, range: [f64; 2]) -> f64 {
    if total <= 1 {
        return 0.0;
    }
    lerp(index as f64 / (total - 1) as f64, range)
}
