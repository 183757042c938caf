use std::fmt;

use serde::{Deserialize, Serialize};

/// A numeric field the storefront may send either as a JSON number or as a
/// string (`"100"`, `"1229.99"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericValue {
    Number(serde_json::Number),
    Text(String),
}

impl NumericValue {
    /// Parsed value, `None` when the text is not a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NumericValue::Number(n) => n.as_f64(),
            NumericValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, NumericValue::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericValue::Number(n) => write!(f, "{}", n),
            NumericValue::Text(s) => write!(f, "{}", s.trim()),
        }
    }
}

impl From<f64> for NumericValue {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(NumericValue::Number)
            .unwrap_or_else(|| NumericValue::Text(value.to_string()))
    }
}

impl From<u32> for NumericValue {
    fn from(value: u32) -> Self {
        NumericValue::Number(value.into())
    }
}
