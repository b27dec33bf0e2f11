//! Prior snapshot handling.
//!
//! ## Responsibilities
//!
//! - Decide whether a prior snapshot is usable for matching
//! - Build the read-only fingerprint index with first-wins duplicate resolution
//!
//! ## Non-Responsibilities
//!
//! - Loading the snapshot (handled by `idmatch-store`)
//! - Deciding what a failed load means (handled by `idmatch-engine`)

pub mod index;

pub use index::{DuplicateFingerprint, IndexEntry, SnapshotIndex};

use crate::config::MatchConfig;
use crate::model::RecordSet;
use serde::{Deserialize, Serialize};

/// Why a run did or did not match against a prior snapshot.
///
/// Every variant other than `Usable` means "first run": all records are NEW.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SnapshotStatus {
    /// No snapshot was supplied
    Absent,
    /// The snapshot could not be loaded
    LoadFailed { reason: String },
    /// The snapshot has no rows
    Empty,
    /// The snapshot has no identifier column
    MissingIdentifierColumn { column: String },
    /// The snapshot lacks natural-key columns, so fingerprints cannot be compared
    MissingKeyColumns { columns: Vec<String> },
    /// The snapshot was indexed
    Usable { rows: usize },
}

impl SnapshotStatus {
    pub fn is_first_run(&self) -> bool {
        !matches!(self, SnapshotStatus::Usable { .. })
    }

    pub fn describe(&self) -> String {
        match self {
            SnapshotStatus::Absent => "no prior snapshot (first import)".to_string(),
            SnapshotStatus::LoadFailed { reason } => {
                format!("prior snapshot could not be loaded: {}", reason)
            }
            SnapshotStatus::Empty => "prior snapshot is empty".to_string(),
            SnapshotStatus::MissingIdentifierColumn { column } => {
                format!("prior snapshot has no '{}' column", column)
            }
            SnapshotStatus::MissingKeyColumns { columns } => {
                format!("prior snapshot lacks natural-key columns {:?}", columns)
            }
            SnapshotStatus::Usable { rows } => format!("prior snapshot with {} rows", rows),
        }
    }
}

/// Column positions of the configured fields within the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotColumns {
    pub identifier: usize,
    /// Natural-key positions, in declared key order.
    pub key: Vec<usize>,
    /// One entry per configured monitored field; `None` when the snapshot
    /// lacks that field, in which case it is skipped during comparison.
    pub monitored: Vec<Option<usize>>,
}

/// Check a snapshot for usability and resolve its columns.
///
/// Returns the status to report, and the resolved columns when usable.
pub fn assess(
    config: &MatchConfig,
    snapshot: Option<&RecordSet>,
) -> (SnapshotStatus, Option<SnapshotColumns>) {
    let Some(snapshot) = snapshot else {
        return (SnapshotStatus::Absent, None);
    };

    let Some(identifier) = snapshot.column_index(&config.identifier_field) else {
        return (
            SnapshotStatus::MissingIdentifierColumn {
                column: config.identifier_field.clone(),
            },
            None,
        );
    };

    if snapshot.is_empty() {
        return (SnapshotStatus::Empty, None);
    }

    let missing: Vec<String> = config
        .natural_key
        .iter()
        .filter(|f| !snapshot.has_column(f))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return (SnapshotStatus::MissingKeyColumns { columns: missing }, None);
    }

    let key = config
        .natural_key
        .iter()
        .filter_map(|f| snapshot.column_index(f))
        .collect();
    let monitored = config
        .monitored_fields
        .iter()
        .map(|f| snapshot.column_index(f))
        .collect();

    (
        SnapshotStatus::Usable {
            rows: snapshot.len(),
        },
        Some(SnapshotColumns {
            identifier,
            key,
            monitored,
        }),
    )
}
