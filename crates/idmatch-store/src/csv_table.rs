//! CSV encoding of record sets.
//!
//! Decoding infers cell types: an empty cell is absent, a cell that parses
//! as a finite number is a number, anything else is text. Columns listed as
//! text columns are never parsed as numbers, and the literal missing-value
//! markers `nan`, `NaN` and `None` in them read as empty text.

use crate::errors::{csv_error, malformed_table, Result};
use idmatch_core::model::{Record, RecordSet, Value};
use std::collections::HashSet;
use std::io::{Read, Write};

/// Missing-value markers found in text columns of exported tables.
const TEXT_NULL_MARKERS: &[&str] = &["nan", "NaN", "None"];

/// Markers read as absent in inferred (non-text) columns.
const NULL_MARKERS: &[&str] = &["nan", "NaN", "None", "NULL", "null", "NA", "N/A", "#N/A"];

/// Decode a CSV table with a header row.
///
/// `table` names the table in error context only.
///
/// # Errors
///
/// `InvalidInput` for a missing header row, duplicate column names or rows
/// whose width differs from the header; `Io` if the reader fails.
pub fn read_csv<R: Read>(reader: R, table: &str, text_fields: &[String]) -> Result<RecordSet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error("read_csv_header", table, e))?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(malformed_table(table, "missing header row"));
    }

    let forced: HashSet<&str> = text_fields.iter().map(String::as_str).collect();
    let force_text: Vec<bool> = headers.iter().map(|h| forced.contains(h.as_str())).collect();

    let mut set = RecordSet::new(headers).map_err(|e| malformed_table(table, e.to_string()))?;
    for result in reader.records() {
        let row = result.map_err(|e| csv_error("read_csv_row", table, e))?;
        let values = row
            .iter()
            .zip(&force_text)
            .map(|(cell, text)| parse_cell(cell, *text))
            .collect();
        set.push(Record::new(values))
            .map_err(|e| malformed_table(table, e.to_string()))?;
    }

    tracing::debug!(table = table, rows = set.len(), columns = set.columns().len(), "decoded csv");
    Ok(set)
}

/// Encode a record set as CSV with a header row.
///
/// # Errors
///
/// `Io` if the writer fails.
pub fn write_csv<W: Write>(writer: W, table: &str, set: &RecordSet) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    writer
        .write_record(set.columns())
        .map_err(|e| csv_error("write_csv_header", table, e))?;
    for record in set.records() {
        writer
            .write_record(record.values().iter().map(format_cell))
            .map_err(|e| csv_error("write_csv_row", table, e))?;
    }
    writer
        .flush()
        .map_err(|e| csv_error("write_csv_flush", table, csv::Error::from(e)))?;
    Ok(())
}

/// Decode one cell.
pub fn parse_cell(raw: &str, force_text: bool) -> Value {
    if force_text {
        return if TEXT_NULL_MARKERS.contains(&raw.trim()) {
            Value::Text(String::new())
        } else {
            Value::Text(raw.to_string())
        };
    }

    let trimmed = raw.trim();
    if trimmed.is_empty() || NULL_MARKERS.contains(&trimmed) {
        return Value::Null;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Value::Number(n),
        _ => Value::Text(raw.to_string()),
    }
}

/// Encode one cell: absent as empty, numbers in their shortest text form.
pub fn format_cell(value: &Value) -> String {
    value.to_key_text().into_owned()
}
