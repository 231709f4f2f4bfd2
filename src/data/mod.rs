//! Data points bound to chart marks
//!
//! A dataset is an ordered list of raw JSON datums. Each point carries an
//! opaque handle that the caller resolves to its own visual element.

mod accessor;

pub use accessor::{Accessor, ResolvedAccessor};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;

/// Opaque key for the visual mark a point is drawn as.
///
/// The core never interprets it; it only hands it back to the focus target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualHandle(pub usize);

/// A data point bound to a chart mark
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    /// Raw datum (a number, or an object with named fields)
    pub value: Value,

    /// Position in the bound sequence
    pub sequence_index: usize,

    /// Mark this point is drawn as, if any
    pub handle: Option<VisualHandle>,
}

impl DataPoint {
    /// Create a new data point without a visual handle
    pub fn new(value: impl Into<Value>, sequence_index: usize) -> Self {
        Self {
            value: value.into(),
            sequence_index,
            handle: None,
        }
    }

    /// Attach a visual handle
    pub fn with_handle(mut self, handle: VisualHandle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Numeric value of a named field, if present
    pub fn field(&self, name: &str) -> Option<f64> {
        self.value.get(name).and_then(as_number)
    }
}

/// Build points from raw datums, handle `i` for datum `i`
pub fn bind_values(values: impl IntoIterator<Item = Value>) -> Vec<DataPoint> {
    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| DataPoint::new(value, i).with_handle(VisualHandle(i)))
        .collect()
}

/// Load a dataset from a JSON file containing an array of datums
pub fn load_dataset(path: &Path) -> Result<Vec<DataPoint>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset: {:?}", path))?;
    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse dataset: {:?}", path))?;

    match value {
        Value::Array(items) => Ok(bind_values(items)),
        _ => bail!("Dataset must be a JSON array of values"),
    }
}

/// Interpret a JSON value as a finite number
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_data_point_creation() {
        let point = DataPoint::new(json!({"month": "Jan", "sales": 120}), 3)
            .with_handle(VisualHandle(7));

        assert_eq!(point.sequence_index, 3);
        assert_eq!(point.handle, Some(VisualHandle(7)));
        assert_eq!(point.field("sales"), Some(120.0));
        assert_eq!(point.field("month"), None);
        assert_eq!(point.field("missing"), None);
    }

    #[test]
    fn test_bind_values_assigns_handles() {
        let points = bind_values(vec![json!(1), json!(2), json!(3)]);
        assert_eq!(points.len(), 3);
        assert_eq!(points[2].sequence_index, 2);
        assert_eq!(points[2].handle, Some(VisualHandle(2)));
    }

    #[test]
    fn test_load_dataset() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"[{"value": 10}, {"value": 20}, 30]"#).unwrap();

        let points = load_dataset(file.path()).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[1].field("value"), Some(20.0));
        assert_eq!(points[2].value, json!(30));
    }

    #[test]
    fn test_load_dataset_rejects_non_array() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"value": 10}"#).unwrap();

        assert!(load_dataset(file.path()).is_err());
    }
}
