//! Observed value ranges

/// The `[min, max]` range observed for one mapped channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Min/max over the finite values, or None if there are none
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some(Extent::new(v, v)),
                Some(e) => Some(Extent::new(e.min.min(v), e.max.max(v))),
            })
    }

    /// True when every observed value was the same
    pub fn is_degenerate(&self) -> bool {
        (self.max - self.min).abs() < f64::EPSILON
    }

    /// Position of `value` within the extent, clamped to 0..1.
    /// A degenerate extent puts every value at the midpoint.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            0.5
        } else {
            ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
        }
    }
}

/// Normalize against an optional extent (midpoint when unknown)
pub fn normalize(value: Option<f64>, extent: Option<Extent>) -> f64 {
    match (value, extent) {
        (Some(v), Some(e)) => e.normalize(v),
        _ => 0.5,
    }
}
