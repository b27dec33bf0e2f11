//! JSON run report.
//!
//! Everything a reviewer needs to audit one run after the fact: the
//! summary counts, every anomaly resolution, the integrity findings and the
//! per-field changes of every UPDATED record.

use crate::atomic::atomic_write;
use crate::errors::{serialization_error, Result};
use idmatch_core::integrity::IntegrityReport;
use idmatch_core::model::ChangeSet;
use idmatch_core::snapshot::{DuplicateFingerprint, SnapshotStatus};
use idmatch_core::uniqueness::UniquenessReport;
use idmatch_core::{Fingerprint, Reconciliation, RunSummary};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct UpdateEntry {
    pub row: usize,
    pub identifier: String,
    pub fingerprint: Fingerprint,
    pub changes: ChangeSet,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub summary: RunSummary,
    pub snapshot: SnapshotStatus,
    pub snapshot_duplicates: Vec<DuplicateFingerprint>,
    pub empty_key_rows: Vec<usize>,
    pub uniqueness: UniquenessReport,
    pub integrity: IntegrityReport,
    pub integrity_warnings: Vec<String>,
    pub updates: Vec<UpdateEntry>,
}

impl RunReport {
    pub fn from_reconciliation(r: &Reconciliation) -> Self {
        Self {
            summary: r.summary.clone(),
            snapshot: r.snapshot_status.clone(),
            snapshot_duplicates: r.snapshot_duplicates.clone(),
            empty_key_rows: r.empty_key_rows(),
            uniqueness: r.uniqueness.clone(),
            integrity: r.integrity.clone(),
            integrity_warnings: r.integrity.warnings(),
            updates: r
                .updates()
                .map(|m| UpdateEntry {
                    row: m.row,
                    identifier: m.identifier.clone(),
                    fingerprint: m.fingerprint.clone(),
                    changes: m.changes.clone(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| serialization_error("encode_report", e))
    }
}

/// Write a report as pretty JSON, replacing any existing file.
///
/// # Errors
///
/// Returns `Serialization` or `Io` errors.
pub fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    let json = report.to_json()?;
    atomic_write(path, json.as_bytes())?;
    tracing::debug!(path = %path.display(), "wrote run report");
    Ok(())
}
