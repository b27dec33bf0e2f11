//! Post-run integrity check.
//!
//! Reporting only: nothing here can fail a run.

use crate::assign::AssignedTable;
use crate::config::MatchConfig;
use crate::model::RecordSet;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Empty-value counts for one critical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriticalFieldCheck {
    pub field: String,
    /// False when the output has no such column.
    pub present: bool,
    /// Output rows where the field is absent or blank.
    pub empty_in_output: usize,
    /// Of those, rows whose source batch record had a value.
    pub introduced_empty: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub input_rows: usize,
    pub output_rows: usize,
    pub empty_identifiers: usize,
    /// Identifiers still shared by several output rows, sorted.
    pub duplicate_identifiers: Vec<String>,
    pub critical_fields: Vec<CriticalFieldCheck>,
}

impl IntegrityReport {
    /// True when no invariant is violated. Pre-existing empty critical
    /// values and row-count drift caused by duplicate removal are reported
    /// through [`warnings`](Self::warnings) but do not make a run unclean.
    pub fn is_clean(&self) -> bool {
        self.empty_identifiers == 0
            && self.duplicate_identifiers.is_empty()
            && self.critical_fields.iter().all(|c| c.introduced_empty == 0)
    }

    pub fn row_drift(&self) -> i64 {
        self.output_rows as i64 - self.input_rows as i64
    }

    /// Human-readable findings, one line each.
    pub fn warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.row_drift() != 0 {
            out.push(format!(
                "output has {} rows but the batch had {} ({:+})",
                self.output_rows,
                self.input_rows,
                self.row_drift()
            ));
        }
        if self.empty_identifiers > 0 {
            out.push(format!(
                "{} output rows have an empty identifier",
                self.empty_identifiers
            ));
        }
        if !self.duplicate_identifiers.is_empty() {
            out.push(format!(
                "{} identifiers are shared by several output rows",
                self.duplicate_identifiers.len()
            ));
        }
        for check in &self.critical_fields {
            if !check.present {
                out.push(format!("critical field '{}' is not in the output", check.field));
            } else if check.introduced_empty > 0 {
                out.push(format!(
                    "critical field '{}' lost values in {} rows",
                    check.field, check.introduced_empty
                ));
            } else if check.empty_in_output > 0 {
                out.push(format!(
                    "critical field '{}' is empty in {} rows",
                    check.field, check.empty_in_output
                ));
            }
        }
        out
    }
}

pub fn check(batch: &RecordSet, output: &AssignedTable, config: &MatchConfig) -> IntegrityReport {
    let id_position = output.column_index(&config.output.identifier);

    let mut empty_identifiers = 0;
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    for row in output.rows() {
        let written = id_position.map(|p| row.record.get(p));
        if row.identifier.trim().is_empty() || written.map_or(true, |v| v.is_blank()) {
            empty_identifiers += 1;
            continue;
        }
        *seen.entry(row.identifier.as_str()).or_default() += 1;
    }
    let duplicate_identifiers = seen
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(id, _)| id.to_string())
        .collect();

    let mut checked = HashSet::new();
    let critical_fields = config
        .critical_fields
        .iter()
        .filter(|f| checked.insert(f.as_str()))
        .map(|field| critical_field(batch, output, field))
        .collect();

    IntegrityReport {
        input_rows: batch.len(),
        output_rows: output.len(),
        empty_identifiers,
        duplicate_identifiers,
        critical_fields,
    }
}

fn critical_field(batch: &RecordSet, output: &AssignedTable, field: &str) -> CriticalFieldCheck {
    let Some(position) = output.column_index(field) else {
        return CriticalFieldCheck {
            field: field.to_string(),
            present: false,
            empty_in_output: 0,
            introduced_empty: 0,
        };
    };

    let mut empty_in_output = 0;
    let mut introduced_empty = 0;
    for row in output.rows() {
        if !row.record.get(position).is_blank() {
            continue;
        }
        empty_in_output += 1;
        let had_value = batch
            .value(row.source_row, field)
            .is_some_and(|v| !v.is_blank());
        if had_value {
            introduced_empty += 1;
        }
    }

    CriticalFieldCheck {
        field: field.to_string(),
        present: true,
        empty_in_output,
        introduced_empty,
    }
}
