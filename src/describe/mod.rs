//! Narration text for points and datasets

mod format;

pub use format::format_number;

use serde_json::Value;
use std::fmt;

use crate::config::SonifyConfig;
use crate::data::{Accessor, DataPoint, ResolvedAccessor};
use crate::mapping::Extent;

/// Fields tried, in order, when looking for a point's label
const LABEL_FIELDS: [&str; 6] = ["label", "name", "category", "x", "month", "date"];

/// Coarse direction of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    /// Compare the mean of the first quarter against the mean of the last.
    /// Needs at least four values.
    pub fn classify(values: &[f64]) -> Option<Self> {
        if values.len() < 4 {
            return None;
        }
        let quarter = values.len() / 4;
        let mean = |slice: &[f64]| slice.iter().sum::<f64>() / slice.len() as f64;
        let first = mean(&values[..quarter]);
        let last = mean(&values[values.len() - quarter..]);

        Some(if last > first * 1.1 {
            Trend::Increasing
        } else if last < first * 0.9 {
            Trend::Decreasing
        } else {
            Trend::Stable
        })
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        })
    }
}

/// Builds point descriptions and dataset summaries
pub struct DescriptionGenerator {
    value: ResolvedAccessor,
    x: Option<ResolvedAccessor>,
}

impl DescriptionGenerator {
    pub fn new(config: &SonifyConfig) -> Self {
        Self {
            value: Accessor::from_field(config.pitch.field.as_deref()).resolve(),
            x: config.x.as_deref().map(|f| Accessor::Field(f.to_string()).resolve()),
        }
    }

    /// Read the narrated value through a custom accessor
    pub fn with_value_accessor(mut self, accessor: Accessor) -> Self {
        self.value = accessor.resolve();
        self
    }

    /// Read the independent axis through a custom accessor
    pub fn with_x_accessor(mut self, accessor: Accessor) -> Self {
        self.x = Some(accessor.resolve());
        self
    }

    fn is_two_dimensional(&self) -> bool {
        self.x.is_some()
    }

    /// Describe one point, e.g. `Point 3 of 12. March. Value: 1,250`
    pub fn describe(&self, point: &DataPoint, index: usize, total: usize) -> String {
        let mut parts = vec![format!("Point {} of {}", index + 1, total)];

        if let Some(label) = self.label(&point.value) {
            parts.push(label);
        }

        let value = self.value.get(&point.value, point.sequence_index);
        match &self.x {
            Some(x) => {
                if let Some(x) = x.get(&point.value, point.sequence_index) {
                    parts.push(format!("X: {}", format_number(x)));
                }
                if let Some(y) = value {
                    parts.push(format!("Y: {}", format_number(y)));
                }
            }
            None => {
                if let Some(v) = value {
                    parts.push(format!("Value: {}", format_number(v)));
                }
            }
        }

        parts.join(". ")
    }

    fn label(&self, datum: &Value) -> Option<String> {
        LABEL_FIELDS
            .iter()
            .filter(|key| !(self.is_two_dimensional() && **key == "x"))
            .find_map(|key| match datum.get(*key)? {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
    }

    /// Summarize a dataset: count, range and trend
    pub fn summarize(&self, points: &[DataPoint]) -> String {
        let values: Vec<f64> = points
            .iter()
            .filter_map(|p| self.value.get(&p.value, p.sequence_index))
            .collect();

        let mut summary = format!("{} data points", points.len());

        if let Some(extent) = Extent::from_values(values.iter().copied()) {
            summary.push_str(&format!(
                ". Range: {} to {}",
                format_number(extent.min),
                format_number(extent.max)
            ));
        }

        if let Some(x) = &self.x {
            let xs = points.iter().filter_map(|p| x.get(&p.value, p.sequence_index));
            if let Some(extent) = Extent::from_values(xs) {
                summary.push_str(&format!(
                    ". X range: {} to {}",
                    format_number(extent.min),
                    format_number(extent.max)
                ));
            }
        }

        if let Some(trend) = Trend::classify(&values) {
            summary.push_str(&format!(". Trend: {}", trend));
        }

        summary.push('.');
        summary
    }
}
