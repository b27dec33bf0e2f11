//! Fingerprint index over the prior snapshot.
//!
//! Built once per run, single-threaded, then only read. When several
//! snapshot rows share a fingerprint the earliest row keeps the slot; later
//! rows are recorded as duplicates and never replace it, so an identifier
//! does not churn between runs. "Earliest" is decided by comparing row
//! positions, not by the order entries happen to be visited.

use crate::fingerprint::{derive_key, Fingerprint};
use crate::model::{Record, RecordSet};
use crate::snapshot::SnapshotColumns;
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Indexed snapshot record: its identifier and normalized comparison data.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub identifier: String,
    /// Row position in the snapshot.
    pub row: usize,
    /// Normalized snapshot record used for change detection.
    pub comparison: Record,
}

/// A snapshot row whose fingerprint was already taken by an earlier row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateFingerprint {
    pub fingerprint: Fingerprint,
    pub kept_row: usize,
    pub kept_identifier: String,
    pub dropped_row: usize,
    pub dropped_identifier: String,
}

#[derive(Debug, Clone, Default)]
pub struct SnapshotIndex {
    entries: HashMap<Fingerprint, IndexEntry>,
    duplicates: Vec<DuplicateFingerprint>,
    rows_without_identifier: Vec<usize>,
    empty_key_rows: usize,
    source_rows: usize,
}

impl SnapshotIndex {
    /// Build the index from a snapshot and its normalized projection.
    ///
    /// `normalized` and `original` must be index-aligned. Identifiers are read
    /// from `original`; rows whose identifier is absent or blank are not
    /// indexed and are reported through [`rows_without_identifier`](Self::rows_without_identifier).
    pub fn build(normalized: &RecordSet, original: &RecordSet, columns: &SnapshotColumns) -> Self {
        let mut index = SnapshotIndex {
            source_rows: original.len(),
            ..Self::default()
        };

        for (row, comparison) in normalized.records().iter().enumerate() {
            let identifier = original
                .record(row)
                .map(|r| r.get(columns.identifier).to_key_text().trim().to_string())
                .unwrap_or_default();
            if identifier.is_empty() {
                index.rows_without_identifier.push(row);
                continue;
            }

            let derivation = derive_key(comparison, &columns.key);
            if derivation.empty_key {
                index.empty_key_rows += 1;
            }

            index.insert(
                derivation.fingerprint,
                IndexEntry {
                    identifier,
                    row,
                    comparison: comparison.clone(),
                },
            );
        }

        index.duplicates.sort_by_key(|d| d.dropped_row);
        index
    }

    fn insert(&mut self, fingerprint: Fingerprint, candidate: IndexEntry) {
        match self.entries.entry(fingerprint) {
            Entry::Vacant(slot) => {
                slot.insert(candidate);
            }
            Entry::Occupied(mut slot) => {
                let fingerprint = slot.key().clone();
                let dropped = if candidate.row < slot.get().row {
                    slot.insert(candidate)
                } else {
                    candidate
                };
                let kept = slot.get();
                self.duplicates.push(DuplicateFingerprint {
                    fingerprint,
                    kept_row: kept.row,
                    kept_identifier: kept.identifier.clone(),
                    dropped_row: dropped.row,
                    dropped_identifier: dropped.identifier,
                });
            }
        }
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&IndexEntry> {
        self.entries.get(fingerprint)
    }

    /// Number of distinct fingerprints indexed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Duplicate-in-snapshot events, ordered by dropped row.
    pub fn duplicates(&self) -> &[DuplicateFingerprint] {
        &self.duplicates
    }

    pub fn rows_without_identifier(&self) -> &[usize] {
        &self.rows_without_identifier
    }

    pub fn empty_key_rows(&self) -> usize {
        self.empty_key_rows
    }

    pub fn source_rows(&self) -> usize {
        self.source_rows
    }
}
