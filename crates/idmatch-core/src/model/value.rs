use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A single cell value.
///
/// `Number(NaN)` is treated as absent everywhere, matching how tabular
/// sources represent missing numeric cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    /// True for `Null` and for a NaN number.
    pub fn is_absent(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    /// True when the value is absent or its string form is blank.
    pub fn is_blank(&self) -> bool {
        self.is_absent() || self.to_key_text().trim().is_empty()
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(*n),
            _ => None,
        }
    }

    /// String form used for key derivation and text output.
    ///
    /// Absent values render as the empty string. Integral numbers render
    /// without a fractional part (`2024`, not `2024.0`).
    pub fn to_key_text(&self) -> Cow<'_, str> {
        match self {
            Value::Null => Cow::Borrowed(""),
            Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            Value::Number(n) if n.is_nan() => Cow::Borrowed(""),
            Value::Number(n) => Cow::Owned(format_number(*n)),
            Value::Text(s) => Cow::Borrowed(s),
        }
    }
}

fn format_number(n: f64) -> String {
    if n == 0.0 {
        // folds -0.0 into 0
        return "0".to_string();
    }
    format!("{}", n)
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_key_text())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
