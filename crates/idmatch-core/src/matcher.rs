//! Matcher / classifier.
//!
//! Looks up every normalized batch record in the snapshot index, in batch row
//! order, and decides NEW, UPDATED or UNCHANGED. Each record's outcome depends
//! only on the read-only index, never on its siblings, except that freshly
//! issued identifiers must be distinct within the run.

use crate::config::ResolvedColumns;
use crate::errors::{IdMatchError, Result};
use crate::fingerprint::{derive_key, Fingerprint};
use crate::ids::IdGenerator;
use crate::model::{ChangeSet, Classification, FieldChange, RecordSet, Value};
use crate::snapshot::{SnapshotColumns, SnapshotIndex};
use serde::Serialize;
use std::collections::HashSet;

/// Consecutive already-issued identifiers tolerated before giving up.
pub const MAX_ID_ATTEMPTS: u32 = 16;

/// Classification result for one batch record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    /// Row position in the batch.
    pub row: usize,
    pub identifier: String,
    pub fingerprint: Fingerprint,
    pub classification: Classification,
    /// Snapshot row the identifier was taken from; `None` for NEW.
    pub snapshot_row: Option<usize>,
    /// Raw old/new values of differing monitored fields. Empty unless UPDATED.
    pub changes: ChangeSet,
    pub empty_key: bool,
}

/// Everything the matcher needs from a usable snapshot.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotView<'a> {
    pub index: &'a SnapshotIndex,
    /// Raw snapshot rows, for change-set old values.
    pub original: &'a RecordSet,
    pub columns: &'a SnapshotColumns,
}

/// Classify every batch record.
///
/// `batch` and `normalized` must be index-aligned. With no snapshot, every
/// record is NEW and no lookup happens.
///
/// # Errors
///
/// Returns `IdGenerationExhausted` if the generator keeps producing
/// identifiers already issued in this run.
pub fn classify(
    batch: &RecordSet,
    normalized: &RecordSet,
    columns: &ResolvedColumns,
    snapshot: Option<SnapshotView<'_>>,
    ids: &mut dyn IdGenerator,
) -> Result<Vec<Match>> {
    let mut issued = HashSet::new();
    let mut matches = Vec::with_capacity(normalized.len());

    for (row, record) in normalized.records().iter().enumerate() {
        let derivation = derive_key(record, &columns.key);
        let hit = snapshot.and_then(|s| s.index.get(&derivation.fingerprint).map(|e| (s, e)));

        let m = match hit {
            None => Match {
                row,
                identifier: fresh_id(ids, &mut issued)?,
                fingerprint: derivation.fingerprint,
                classification: Classification::New,
                snapshot_row: None,
                changes: ChangeSet::new(),
                empty_key: derivation.empty_key,
            },
            Some((view, entry)) => {
                let mut changes = ChangeSet::new();
                for ((field, batch_pos), snap_pos) in
                    columns.monitored.iter().zip(&view.columns.monitored)
                {
                    // field absent from the snapshot schema: nothing to compare
                    let Some(snap_pos) = snap_pos else {
                        continue;
                    };
                    if values_equal(record.get(*batch_pos), entry.comparison.get(*snap_pos)) {
                        continue;
                    }
                    let old = view
                        .original
                        .record(entry.row)
                        .map(|r| r.get(*snap_pos).clone())
                        .unwrap_or(Value::Null);
                    let new = batch
                        .record(row)
                        .map(|r| r.get(*batch_pos).clone())
                        .unwrap_or(Value::Null);
                    changes.insert(field.clone(), FieldChange { old, new });
                }

                let classification = if changes.is_empty() {
                    Classification::Unchanged
                } else {
                    Classification::Updated
                };
                Match {
                    row,
                    identifier: entry.identifier.clone(),
                    fingerprint: derivation.fingerprint,
                    classification,
                    snapshot_row: Some(entry.row),
                    changes,
                    empty_key: derivation.empty_key,
                }
            }
        };
        matches.push(m);
    }

    tracing::debug!(
        rows = matches.len(),
        new = count(&matches, Classification::New),
        updated = count(&matches, Classification::Updated),
        unchanged = count(&matches, Classification::Unchanged),
        "classified batch"
    );
    Ok(matches)
}

/// Equality of two normalized monitored values.
///
/// Absent values (including empty text, which is how normalization renders
/// absent text) equal each other and nothing else. A number equals text
/// holding its text form, so one column typed differently in batch and
/// snapshot still compares by content.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    let (a_empty, b_empty) = (is_empty_cell(a), is_empty_cell(b));
    if a_empty || b_empty {
        return a_empty && b_empty;
    }
    match (a, b) {
        (Value::Number(n), Value::Text(t)) | (Value::Text(t), Value::Number(n)) => {
            Value::Number(*n).to_key_text() == t.as_str()
        }
        _ => a == b,
    }
}

fn is_empty_cell(value: &Value) -> bool {
    value.is_absent() || matches!(value, Value::Text(s) if s.is_empty())
}

fn fresh_id(ids: &mut dyn IdGenerator, issued: &mut HashSet<String>) -> Result<String> {
    for _ in 0..MAX_ID_ATTEMPTS {
        let id = ids.next_id();
        if !id.trim().is_empty() && issued.insert(id.clone()) {
            return Ok(id);
        }
        tracing::warn!(identifier = %id, "identifier generator repeated an identifier");
    }
    Err(IdMatchError::IdGenerationExhausted {
        attempts: MAX_ID_ATTEMPTS,
    })
}

fn count(matches: &[Match], classification: Classification) -> usize {
    matches
        .iter()
        .filter(|m| m.classification == classification)
        .count()
}
