//! Quantize mapper for snapping pitch to musical scales

use super::Mapper;

/// Concert pitch reference (A4)
pub const REFERENCE_HZ: f64 = 440.0;

/// Musical scale definition (intervals in semitones from root)
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    name: String,
    intervals: Vec<u8>,
}

impl Scale {
    /// Create a new scale
    pub fn new(name: &str, intervals: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            intervals,
        }
    }

    /// Major pentatonic scale (root, M2, M3, P5, M6)
    pub fn pentatonic() -> Self {
        Self::new("pentatonic", vec![0, 2, 4, 7, 9])
    }

    /// Minor pentatonic scale (root, m3, P4, P5, m7)
    pub fn minor_pentatonic() -> Self {
        Self::new("minor_pentatonic", vec![0, 3, 5, 7, 10])
    }

    /// Major scale
    pub fn major() -> Self {
        Self::new("major", vec![0, 2, 4, 5, 7, 9, 11])
    }

    /// Natural minor scale
    pub fn minor() -> Self {
        Self::new("minor", vec![0, 2, 3, 5, 7, 8, 10])
    }

    /// Blues scale (minor pentatonic plus the flat fifth)
    pub fn blues() -> Self {
        Self::new("blues", vec![0, 3, 5, 6, 7, 10])
    }

    /// All twelve semitones
    pub fn chromatic() -> Self {
        Self::new("chromatic", (0..12).collect())
    }

    /// Dorian mode
    pub fn dorian() -> Self {
        Self::new("dorian", vec![0, 2, 3, 5, 7, 9, 10])
    }

    /// Whole tone scale
    pub fn whole_tone() -> Self {
        Self::new("whole_tone", vec![0, 2, 4, 6, 8, 10])
    }

    /// Get scale by name. `continuous` and unknown names have no scale.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "pentatonic" | "major_pentatonic" | "majorpentatonic" => Some(Self::pentatonic()),
            "minor_pentatonic" | "minorpentatonic" => Some(Self::minor_pentatonic()),
            "major" => Some(Self::major()),
            "minor" | "natural_minor" => Some(Self::minor()),
            "blues" => Some(Self::blues()),
            "chromatic" => Some(Self::chromatic()),
            "dorian" => Some(Self::dorian()),
            "whole_tone" | "wholetone" => Some(Self::whole_tone()),
            _ => None,
        }
    }

    /// Get the name of this scale
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the intervals
    pub fn intervals(&self) -> &[u8] {
        &self.intervals
    }

    fn contains_pitch_class(&self, semitones_from_root: i64) -> bool {
        let class = semitones_from_root.rem_euclid(12) as u8;
        self.intervals.contains(&class)
    }
}

/// Frequency to fractional MIDI note number
pub fn hz_to_midi(hz: f64) -> f64 {
    12.0 * (hz / REFERENCE_HZ).log2() + 69.0
}

/// MIDI note number to frequency
pub fn midi_to_hz(midi: f64) -> f64 {
    REFERENCE_HZ * 2.0_f64.powf((midi - 69.0) / 12.0)
}

/// Maps a normalized value onto the scale notes inside a frequency range.
///
/// Every whole semitone between the range endpoints whose pitch class is in
/// the scale (relative to the lowest whole semitone in range) becomes one
/// step; the input picks a step by `round(input * (steps - 1))`.
pub struct QuantizeMapper {
    name: String,
    min_hz: f64,
    notes: Vec<f64>,
}

impl QuantizeMapper {
    /// Create a new quantize mapper over `min_hz..max_hz`
    pub fn new(name: &str, min_hz: f64, max_hz: f64, scale: &Scale) -> Self {
        Self {
            name: name.to_string(),
            min_hz,
            notes: scale_notes(min_hz, max_hz, scale),
        }
    }

    /// The MIDI notes available to this mapper, ascending
    pub fn notes(&self) -> &[f64] {
        &self.notes
    }
}

fn scale_notes(min_hz: f64, max_hz: f64, scale: &Scale) -> Vec<f64> {
    if !(min_hz > 0.0 && max_hz > 0.0) {
        return Vec::new();
    }

    let (lo, hi) = {
        let a = hz_to_midi(min_hz);
        let b = hz_to_midi(max_hz);
        (a.min(b), a.max(b))
    };

    // Tolerate float noise so exact note frequencies stay inside the range.
    let first = (lo - 1e-9).ceil() as i64;
    let last = (hi + 1e-9).floor() as i64;

    (first..=last)
        .filter(|&note| scale.contains_pitch_class(note - first))
        .map(|note| note as f64)
        .collect()
}

impl Mapper for QuantizeMapper {
    fn name(&self) -> &str {
        &self.name
    }

    fn map(&self, input: f64) -> f64 {
        if self.notes.is_empty() {
            return self.min_hz;
        }

        let input = if input.is_finite() { input.clamp(0.0, 1.0) } else { 0.5 };
        let step = (input * (self.notes.len() - 1) as f64).round() as usize;
        midi_to_hz(self.notes[step.min(self.notes.len() - 1)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_creation() {
        let scale = Scale::pentatonic();
        assert_eq!(scale.name(), "pentatonic");
        assert_eq!(scale.intervals(), &[0, 2, 4, 7, 9]);
        assert_eq!(Scale::chromatic().intervals().len(), 12);
    }

    #[test]
    fn test_scale_from_name() {
        assert!(Scale::from_name("pentatonic").is_some());
        assert!(Scale::from_name("Major").is_some());
        assert!(Scale::from_name("blues").is_some());
        assert!(Scale::from_name("continuous").is_none());
        assert!(Scale::from_name("unknown").is_none());
    }

    #[test]
    fn test_midi_conversion() {
        assert!((hz_to_midi(440.0) - 69.0).abs() < 1e-9);
        assert!((hz_to_midi(220.0) - 57.0).abs() < 1e-9);
        assert!((midi_to_hz(81.0) - 880.0).abs() < 1e-9);
    }

    #[test]
    fn test_quantize_endpoints() {
        let mapper = QuantizeMapper::new("test", 220.0, 880.0, &Scale::pentatonic());

        // Two octaves of a five-note scale plus the top root
        assert_eq!(mapper.notes().len(), 11);
        assert!((mapper.map(0.0) - 220.0).abs() < 1e-6);
        assert!((mapper.map(1.0) - 880.0).abs() < 1e-6);
    }

    #[test]
    fn test_quantize_picks_scale_degree() {
        let mapper = QuantizeMapper::new("test", 220.0, 880.0, &Scale::pentatonic());

        // Step 5 of 0..=10 is the root one octave up (A4)
        assert!((mapper.map(0.5) - 440.0).abs() < 1e-6);
        // Step 1 is B3 (two semitones above A3)
        assert!((mapper.map(0.1) - midi_to_hz(59.0)).abs() < 1e-6);
    }

    #[test]
    fn test_quantize_monotonic() {
        for scale in [Scale::pentatonic(), Scale::major(), Scale::blues(), Scale::chromatic()] {
            let mapper = QuantizeMapper::new("test", 200.0, 1000.0, &scale);
            let mut previous = 0.0;
            for i in 0..=100 {
                let hz = mapper.map(i as f64 / 100.0);
                assert!(hz >= previous, "{} not monotonic at {}", scale.name(), i);
                previous = hz;
            }
        }
    }

    #[test]
    fn test_quantize_empty_range_returns_min() {
        // 441..445 Hz lies strictly between A4 and A#4
        let mapper = QuantizeMapper::new("test", 441.0, 445.0, &Scale::pentatonic());
        assert!(mapper.notes().is_empty());
        assert_eq!(mapper.map(0.7), 441.0);
    }
}
