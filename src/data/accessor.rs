//! Field accessors
//!
//! An [`Accessor`] is resolved once, when a dataset is bound, into a
//! [`ResolvedAccessor`]: a uniform `(datum, index) -> Option<f64>` function.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::as_number;

type AccessorFn = dyn Fn(&Value, usize) -> Option<f64> + Send + Sync;

/// How a channel reads its value from a datum
#[derive(Clone, Default)]
pub enum Accessor {
    /// Caller-supplied function
    Function(Arc<AccessorFn>),
    /// Named field of an object datum
    Field(String),
    /// `value`, then `y`, then the datum itself when it is a number
    #[default]
    Auto,
}

impl Accessor {
    /// Wrap a closure as an accessor
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&Value, usize) -> Option<f64> + Send + Sync + 'static,
    {
        Accessor::Function(Arc::new(f))
    }

    /// Explicit function wins over a field name, a field name over auto-detection
    pub fn from_field(field: Option<&str>) -> Self {
        match field {
            Some(name) => Accessor::Field(name.to_string()),
            None => Accessor::Auto,
        }
    }

    /// Resolve into a callable accessor
    pub fn resolve(&self) -> ResolvedAccessor {
        let f: Arc<AccessorFn> = match self {
            Accessor::Function(f) => Arc::clone(f),
            Accessor::Field(name) => {
                let name = name.clone();
                Arc::new(move |datum: &Value, _: usize| datum.get(&name).and_then(as_number))
            }
            Accessor::Auto => Arc::new(|datum: &Value, _: usize| auto_detect(datum)),
        };
        ResolvedAccessor(f)
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Function(_) => f.write_str("Accessor::Function"),
            Accessor::Field(name) => write!(f, "Accessor::Field({name:?})"),
            Accessor::Auto => f.write_str("Accessor::Auto"),
        }
    }
}

fn auto_detect(datum: &Value) -> Option<f64> {
    if let Some(n) = as_number(datum) {
        return Some(n);
    }
    ["value", "y"]
        .iter()
        .find_map(|key| datum.get(*key).and_then(as_number))
}

/// A resolved accessor: always callable, never inspects its own variant
#[derive(Clone)]
pub struct ResolvedAccessor(Arc<AccessorFn>);

impl ResolvedAccessor {
    pub fn get(&self, datum: &Value, index: usize) -> Option<f64> {
        (self.0)(datum, index).filter(|v| v.is_finite())
    }
}

impl fmt::Debug for ResolvedAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResolvedAccessor")
    }
}
