//! Identity assigner.
//!
//! Attaches the five metadata columns to each original batch record. The
//! batch itself is never touched; every output row is a new record that
//! remembers the batch row it came from.

use crate::config::OutputColumns;
use crate::matcher::Match;
use crate::model::{Classification, Record, RecordSet, Value};
use chrono::{DateTime, SecondsFormat, Utc};

/// One output row with the data uniqueness enforcement needs kept alongside.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignedRow {
    pub source_row: usize,
    pub classification: Classification,
    pub identifier: String,
    /// Full output record: metadata columns first, then batch columns.
    pub record: Record,
}

/// The assigned output table.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignedTable {
    columns: Vec<String>,
    rows: Vec<AssignedRow>,
    /// Batch columns dropped because a metadata column has the same name.
    shadowed: Vec<String>,
}

impl AssignedTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[AssignedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn shadowed_columns(&self) -> &[String] {
        &self.shadowed
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Same table restricted to the rows `keep` accepts, order preserved.
    pub(crate) fn retain(mut self, mut keep: impl FnMut(&AssignedRow) -> bool) -> Self {
        self.rows.retain(|row| keep(row));
        self
    }

    pub fn to_record_set(&self) -> RecordSet {
        RecordSet::from_parts(
            self.columns.clone(),
            self.rows.iter().map(|r| r.record.clone()).collect(),
        )
    }

    pub fn into_record_set(self) -> RecordSet {
        RecordSet::from_parts(self.columns, self.rows.into_iter().map(|r| r.record).collect())
    }
}

/// Timestamp text written into every output row of one run.
pub fn format_run_timestamp(run_at: DateTime<Utc>) -> String {
    run_at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Build the output table from the original batch and its matches.
///
/// Columns are the metadata columns in the order identifier, fingerprint,
/// classification, timestamp, provenance, followed by the batch columns in
/// their original order. A batch column named like a metadata column is
/// replaced by the metadata column.
pub fn assign(
    original: &RecordSet,
    matches: &[Match],
    run_at: DateTime<Utc>,
    output: &OutputColumns,
) -> AssignedTable {
    let metadata = output.names();
    let mut columns: Vec<String> = metadata.iter().map(|n| (*n).to_string()).collect();
    let mut kept_positions = Vec::with_capacity(original.columns().len());
    let mut shadowed = Vec::new();

    for (position, name) in original.columns().iter().enumerate() {
        if metadata.contains(&name.as_str()) {
            shadowed.push(name.clone());
        } else {
            columns.push(name.clone());
            kept_positions.push(position);
        }
    }

    let timestamp = format_run_timestamp(run_at);
    let rows = matches
        .iter()
        .filter_map(|m| {
            let source = original.record(m.row)?;
            let mut values = Vec::with_capacity(columns.len());
            values.push(Value::Text(m.identifier.clone()));
            values.push(Value::Text(m.fingerprint.to_string()));
            values.push(Value::Text(m.classification.tag().to_string()));
            values.push(Value::Text(timestamp.clone()));
            values.push(Value::Bool(true));
            values.extend(kept_positions.iter().map(|p| source.get(*p).clone()));

            Some(AssignedRow {
                source_row: m.row,
                classification: m.classification,
                identifier: m.identifier.clone(),
                record: Record::new(values),
            })
        })
        .collect();

    AssignedTable {
        columns,
        rows,
        shadowed,
    }
}
