//! Seed identity values

use crate::error::{LineageError, LineageResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An integer seed identifying a stamping run.
///
/// Seeds arriving over the JSON boundary go through [`Seed::from_value`],
/// which rejects booleans outright (JSON callers routinely conflate them
/// with integers) and anything that cannot be losslessly converted.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Seed(i64);

impl Seed {
    /// Validate a JSON value as a seed.
    pub fn from_value(value: &Value) -> LineageResult<Self> {
        match value {
            Value::Bool(_) => Err(LineageError::InvalidProvenance(
                "seed must be an integer, not a boolean".to_string(),
            )),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Ok(Self(i));
                }
                // Accept floats only when the integer round-trip is exact.
                // The bound check must come before the cast: out-of-range
                // values saturate to i64::MAX, which round-trips back to
                // 2^63 and would smuggle a different seed through.
                if let Some(f) = n.as_f64() {
                    if f.fract() == 0.0 && f >= -(2f64.powi(63)) && f < 2f64.powi(63) {
                        let i = f as i64;
                        if i as f64 == f {
                            return Ok(Self(i));
                        }
                    }
                }
                Err(LineageError::InvalidProvenance(format!(
                    "seed {} cannot be losslessly converted to an integer",
                    n
                )))
            }
            other => Err(LineageError::InvalidProvenance(format!(
                "seed must be an integer, got {}",
                kind_of(other)
            ))),
        }
    }

    /// The underlying integer value
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for Seed {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
