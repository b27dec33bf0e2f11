//! Reconcile orchestration.
//!
//! ## Steps (in order):
//! 1. Load the batch (absent batch is an error)
//! 2. Load the prior snapshot, if one is named (absent or unreadable means first run)
//! 3. Run the kernel (configuration errors stop here, nothing is written)
//! 4. Save the output table unless `dry_run`

use chrono::{DateTime, Utc};
use idmatch_core::errors::{ExError, ExErrorKind};
use idmatch_core::ids::IdGenerator;
use idmatch_core::model::RecordSet;
use idmatch_core::reconcile::{reconcile, Reconciliation};
use idmatch_core::snapshot::SnapshotStatus;
use idmatch_core::MatchConfig;
use idmatch_store::errors::Result;
use idmatch_store::TableStore;
use std::time::Instant;

/// What to reconcile and where to put the result.
#[derive(Debug, Clone)]
pub struct ReconcileRequest {
    pub config: MatchConfig,
    pub batch_table: String,
    /// Prior snapshot table; `None` forces a first run.
    pub snapshot_table: Option<String>,
    pub output_table: String,
    /// Compute everything but write nothing.
    pub dry_run: bool,
}

impl ReconcileRequest {
    pub fn new(
        config: MatchConfig,
        batch_table: impl Into<String>,
        output_table: impl Into<String>,
    ) -> Self {
        Self {
            config,
            batch_table: batch_table.into(),
            snapshot_table: None,
            output_table: output_table.into(),
            dry_run: false,
        }
    }

    pub fn with_snapshot(mut self, table: impl Into<String>) -> Self {
        self.snapshot_table = Some(table.into());
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Load, reconcile and persist one batch.
///
/// # Errors
///
/// - `InvalidInput` if the batch table does not exist or cannot be decoded
/// - `MissingColumns` / `InvalidConfig` from the kernel, before anything is written
/// - `Io` if the output table cannot be saved
pub fn run_reconcile(
    store: &mut dyn TableStore,
    request: &ReconcileRequest,
    ids: &mut dyn IdGenerator,
    run_at: DateTime<Utc>,
) -> Result<Reconciliation> {
    let start = Instant::now();
    idmatch_core::log_op_start!(
        "run_reconcile",
        batch_table = request.batch_table.as_str(),
        snapshot_table = request.snapshot_table.as_deref().unwrap_or(""),
        output_table = request.output_table.as_str(),
        dry_run = request.dry_run
    );

    match run_reconcile_inner(store, request, ids, run_at) {
        Ok(r) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            idmatch_core::log_op_end!(
                "run_reconcile",
                duration_ms = duration_ms,
                run_id = %r.run_id(),
                output_rows = r.output.len()
            );
            Ok(r)
        }
        Err(e) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            idmatch_core::log_op_error!("run_reconcile", e.clone(), duration_ms = duration_ms);
            Err(e)
        }
    }
}

fn run_reconcile_inner(
    store: &mut dyn TableStore,
    request: &ReconcileRequest,
    ids: &mut dyn IdGenerator,
    run_at: DateTime<Utc>,
) -> Result<Reconciliation> {
    let batch = store.load(&request.batch_table)?.ok_or_else(|| {
        ExError::new(ExErrorKind::InvalidInput)
            .with_op("load_batch")
            .with_table(request.batch_table.as_str())
            .with_message("batch table does not exist")
    })?;

    let (snapshot, load_failure) = load_snapshot(store, request.snapshot_table.as_deref());

    let mut r = reconcile(&request.config, &batch, snapshot.as_ref(), ids, run_at).map_err(|e| {
        let ex: ExError = e.into();
        match ex.kind() {
            ExErrorKind::MissingColumns => ex.with_table(request.batch_table.as_str()),
            _ => ex,
        }
    })?;
    if let Some(reason) = load_failure {
        r.snapshot_status = SnapshotStatus::LoadFailed { reason };
    }

    if request.dry_run {
        tracing::info!(table = request.output_table.as_str(), "dry run, output not saved");
    } else {
        store.save(&request.output_table, &r.output)?;
    }
    Ok(r)
}

/// Load the snapshot, turning every failure into "no snapshot".
///
/// Returns the failure reason alongside so it can be reported.
fn load_snapshot(
    store: &dyn TableStore,
    table: Option<&str>,
) -> (Option<RecordSet>, Option<String>) {
    let Some(table) = table else {
        return (None, None);
    };
    match store.load(table) {
        Ok(Some(snapshot)) => (Some(snapshot), None),
        Ok(None) => {
            tracing::warn!(table = table, "snapshot table does not exist, treating run as first import");
            (None, None)
        }
        Err(e) => {
            tracing::warn!(
                table = table,
                err.code = e.code(),
                message = %e,
                "snapshot table unreadable, treating run as first import"
            );
            (None, Some(e.to_string()))
        }
    }
}
