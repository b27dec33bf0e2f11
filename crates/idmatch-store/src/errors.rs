//! Error handling for idmatch-store
//!
//! Wraps idmatch-core ExError with store-specific helpers

use idmatch_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create an IO error for a named table
pub fn table_io_error(operation: &str, table: &str, err: std::io::Error) -> ExError {
    io_error(operation, err).with_table(table)
}

/// Create a CSV decoding/encoding error
///
/// Carries the 0-based data row when the csv reader reports a position.
pub fn csv_error(operation: &str, table: &str, err: csv::Error) -> ExError {
    let row = err
        .position()
        .and_then(|p| usize::try_from(p.record()).ok())
        .and_then(|record| record.checked_sub(1));
    let kind = match err.kind() {
        csv::ErrorKind::Io(_) => ExErrorKind::Io,
        _ => ExErrorKind::InvalidInput,
    };
    let ex = ExError::new(kind)
        .with_op(operation.to_string())
        .with_table(table)
        .with_message(err.to_string());
    match row {
        Some(row) => ex.with_row(row),
        None => ex,
    }
}

/// Create an invalid table name error
pub fn invalid_table_name(name: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op("resolve_table")
        .with_message(format!(
            "table name '{}' must be non-empty and must not contain path separators",
            name
        ))
}

/// Create a malformed table error
pub fn malformed_table(table: &str, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op("load_table")
        .with_table(table)
        .with_message(reason)
}

/// Create a serialization error
pub fn serialization_error(operation: &str, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
