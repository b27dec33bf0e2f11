//! Reconciliation entry point.
//!
//! Runs the whole pipeline over in-memory record sets:
//! normalize → derive keys → index snapshot → classify → assign → enforce
//! uniqueness → integrity check → summary.
//!
//! Only configuration problems (invalid config, batch missing required
//! columns) fail a run, and they fail it before any record is processed.
//! Every other anomaly is resolved deterministically, logged as a warning
//! and counted in the returned [`RunSummary`].

use crate::assign::assign;
use crate::config::{MatchConfig, ResolvedColumns};
use crate::errors::Result;
use crate::ids::{IdGenerator, RandomIdGenerator};
use crate::integrity::{self, IntegrityReport};
use crate::matcher::{classify, Match, SnapshotView};
use crate::model::{Classification, RecordSet};
use crate::normalize::normalize;
use crate::report::RunSummary;
use crate::snapshot::{assess, DuplicateFingerprint, SnapshotIndex, SnapshotStatus};
use crate::uniqueness::{enforce_unique_identifiers, UniquenessReport};
use chrono::{DateTime, Utc};
use idmatch_core_types::RunId;
use std::time::Instant;

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// Output table: metadata columns, then the batch columns.
    pub output: RecordSet,
    /// One entry per batch row, in batch order, including rows later dropped
    /// by uniqueness enforcement.
    pub matches: Vec<Match>,
    pub summary: RunSummary,
    pub uniqueness: UniquenessReport,
    pub integrity: IntegrityReport,
    pub snapshot_status: SnapshotStatus,
    pub snapshot_duplicates: Vec<DuplicateFingerprint>,
}

impl Reconciliation {
    pub fn run_id(&self) -> &RunId {
        &self.summary.run_id
    }

    /// UPDATED matches that survived uniqueness enforcement, in batch order.
    pub fn updates(&self) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(|m| {
            m.classification == Classification::Updated && !self.uniqueness.is_dropped(m.row)
        })
    }

    /// Batch rows whose natural key was entirely empty.
    pub fn empty_key_rows(&self) -> Vec<usize> {
        self.matches
            .iter()
            .filter(|m| m.empty_key)
            .map(|m| m.row)
            .collect()
    }
}

/// Reconcile `batch` against an optional prior `snapshot`.
///
/// `run_at` is stamped on every output row.
///
/// # Errors
///
/// - `InvalidConfig` if `config` fails validation
/// - `MissingColumns` if the batch lacks a natural-key or monitored field
/// - `IdGenerationExhausted` if `ids` keeps repeating itself
pub fn reconcile(
    config: &MatchConfig,
    batch: &RecordSet,
    snapshot: Option<&RecordSet>,
    ids: &mut dyn IdGenerator,
    run_at: DateTime<Utc>,
) -> Result<Reconciliation> {
    let start = Instant::now();
    let run_id = RunId::new();
    crate::log_op_start!(
        "reconcile",
        run_id = %run_id,
        batch_rows = batch.len(),
        snapshot_rows = snapshot.map_or(0, RecordSet::len)
    );

    match run_pipeline(config, batch, snapshot, ids, run_at, run_id) {
        Ok(r) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            crate::log_op_end!(
                "reconcile",
                duration_ms = duration_ms,
                output_rows = r.output.len(),
                new = r.summary.new,
                updated = r.summary.updated,
                unchanged = r.summary.unchanged
            );
            Ok(r)
        }
        Err(e) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            crate::log_op_error!("reconcile", e.clone(), duration_ms = duration_ms);
            Err(e)
        }
    }
}

/// [`reconcile`] with random identifiers, stamped with the current time.
///
/// # Errors
///
/// Same as [`reconcile`].
pub fn reconcile_now(
    config: &MatchConfig,
    batch: &RecordSet,
    snapshot: Option<&RecordSet>,
) -> Result<Reconciliation> {
    reconcile(config, batch, snapshot, &mut RandomIdGenerator, Utc::now())
}

fn run_pipeline(
    config: &MatchConfig,
    batch: &RecordSet,
    snapshot: Option<&RecordSet>,
    ids: &mut dyn IdGenerator,
    run_at: DateTime<Utc>,
    run_id: RunId,
) -> Result<Reconciliation> {
    config.validate()?;
    let columns = ResolvedColumns::resolve(config, batch.columns())?;

    let normalized = normalize(batch);
    tracing::debug!(rows = normalized.len(), "normalized batch");

    let (snapshot_status, snapshot_columns) = assess(config, snapshot);
    if snapshot_status.is_first_run() {
        tracing::warn!(
            run_id = %run_id,
            snapshot_status = %snapshot_status.describe(),
            "no usable prior snapshot, treating run as first import"
        );
    }

    let index = match (snapshot, &snapshot_columns) {
        (Some(snap), Some(snap_columns)) => {
            let index = SnapshotIndex::build(&normalize(snap), snap, snap_columns);
            tracing::debug!(
                fingerprints = index.len(),
                snapshot_rows = index.source_rows(),
                "indexed snapshot"
            );
            if !index.duplicates().is_empty() {
                tracing::warn!(
                    snapshot_duplicates = index.duplicates().len(),
                    "snapshot rows share a fingerprint, keeping the earliest"
                );
            }
            if !index.rows_without_identifier().is_empty() {
                tracing::warn!(
                    rows = index.rows_without_identifier().len(),
                    "snapshot rows without identifier were not indexed"
                );
            }
            Some(index)
        }
        _ => None,
    };

    let view = match (snapshot, &snapshot_columns, &index) {
        (Some(original), Some(snap_columns), Some(index)) => Some(SnapshotView {
            index,
            original,
            columns: snap_columns,
        }),
        _ => None,
    };

    let matches = classify(batch, &normalized, &columns, view, ids)?;
    let empty_key_records = matches.iter().filter(|m| m.empty_key).count();
    if empty_key_records > 0 {
        tracing::warn!(
            empty_key_records = empty_key_records,
            "records with an empty natural key cannot match reliably"
        );
    }

    let assigned = assign(batch, &matches, run_at, &config.output);
    if !assigned.shadowed_columns().is_empty() {
        tracing::debug!(
            columns = ?assigned.shadowed_columns(),
            "batch columns replaced by metadata columns"
        );
    }

    let (assigned, uniqueness) = enforce_unique_identifiers(assigned);
    let integrity = integrity::check(batch, &assigned, config);
    for warning in integrity.warnings() {
        tracing::warn!(finding = %warning, "integrity check");
    }

    let count = |c: Classification| {
        assigned
            .rows()
            .iter()
            .filter(|r| r.classification == c)
            .count()
    };
    let summary = RunSummary {
        run_id,
        run_at,
        first_run: snapshot_status.is_first_run(),
        input_rows: batch.len(),
        output_rows: assigned.len(),
        new: count(Classification::New),
        updated: count(Classification::Updated),
        unchanged: count(Classification::Unchanged),
        empty_key_records,
        snapshot_rows: snapshot.map_or(0, RecordSet::len),
        indexed_fingerprints: index.as_ref().map_or(0, SnapshotIndex::len),
        snapshot_duplicates: index.as_ref().map_or(0, |i| i.duplicates().len()),
        snapshot_rows_without_identifier: index
            .as_ref()
            .map_or(0, |i| i.rows_without_identifier().len()),
        dropped_duplicates: uniqueness.dropped_count(),
    };
    let snapshot_duplicates = index
        .map(|i| i.duplicates().to_vec())
        .unwrap_or_default();

    Ok(Reconciliation {
        output: assigned.into_record_set(),
        matches,
        summary,
        uniqueness,
        integrity,
        snapshot_status,
        snapshot_duplicates,
    })
}
