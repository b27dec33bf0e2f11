//! Comparison-only normalization.
//!
//! Produces a projection of a record set used for fingerprinting and change
//! detection. The input is never mutated; the output has the same columns
//! and the same row order, so normalized and original rows correlate by
//! position.
//!
//! Column kind is decided per column: a column holding any text value is a
//! text column, otherwise it is numeric.
//!
//! - Text columns: absent becomes `""`, numbers become their text form,
//!   then leading/trailing whitespace is removed and inner whitespace runs
//!   collapse to one space.
//! - Numeric columns: numbers are rounded to six decimals, NaN becomes
//!   absent.
//! - Booleans pass through unchanged.

use crate::model::{Record, RecordSet, Value};

/// Decimal places numeric values are rounded to before comparison.
pub const DECIMAL_PLACES: i32 = 6;

/// Magnitude (2^32) from which `f64` no longer holds six reliable decimals;
/// larger values pass through unrounded so rounding stays idempotent.
pub const ROUNDING_LIMIT: f64 = 4_294_967_296.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Text,
    Numeric,
}

/// Normalize a record set for comparison.
pub fn normalize(set: &RecordSet) -> RecordSet {
    let kinds = column_kinds(set);

    let records = set
        .records()
        .iter()
        .map(|record| {
            Record::new(
                record
                    .values()
                    .iter()
                    .zip(&kinds)
                    .map(|(value, kind)| normalize_value(value, *kind))
                    .collect(),
            )
        })
        .collect();

    RecordSet::from_parts(set.columns().to_vec(), records)
}

fn column_kinds(set: &RecordSet) -> Vec<ColumnKind> {
    (0..set.columns().len())
        .map(|position| {
            let has_text = set
                .records()
                .iter()
                .any(|r| matches!(r.get(position), Value::Text(_)));
            if has_text {
                ColumnKind::Text
            } else {
                ColumnKind::Numeric
            }
        })
        .collect()
}

fn normalize_value(value: &Value, kind: ColumnKind) -> Value {
    match (kind, value) {
        (_, Value::Bool(b)) => Value::Bool(*b),
        (ColumnKind::Text, v) => Value::Text(collapse_whitespace(&v.to_key_text())),
        (ColumnKind::Numeric, Value::Number(n)) if n.is_nan() => Value::Null,
        (ColumnKind::Numeric, Value::Number(n)) => Value::Number(round_decimals(*n)),
        (ColumnKind::Numeric, other) => other.clone(),
    }
}

/// Trim and collapse every whitespace run to a single space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Round to [`DECIMAL_PLACES`], half away from zero.
pub fn round_decimals(n: f64) -> f64 {
    if !n.is_finite() || n.abs() >= ROUNDING_LIMIT {
        return n;
    }
    let scale = 10f64.powi(DECIMAL_PLACES);
    let rounded = (n * scale).round() / scale;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
