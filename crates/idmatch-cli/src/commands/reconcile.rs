//! Reconcile command
//!
//! Usage: idmatch reconcile --store <DIR> --batch <TABLE> --output <TABLE>
//!        [--snapshot <TABLE>] [--config <FILE>] [--report <FILE>] [--dry-run]

use anyhow::Context;
use chrono::Utc;
use clap::Args;
use idmatch_core::{render_human_summary, MatchConfig, RandomIdGenerator};
use idmatch_engine::commands::reconcile::{run_reconcile, ReconcileRequest};
use idmatch_store::{write_report, CsvTableStore, RunReport};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Directory holding the tables as `<name>.csv`
    #[arg(long, default_value = ".")]
    pub store: PathBuf,

    /// Table with the imported batch
    #[arg(long)]
    pub batch: String,

    /// Table with the previously persisted snapshot (omit for a first import)
    #[arg(long)]
    pub snapshot: Option<String>,

    /// Table the reconciled output replaces
    #[arg(long)]
    pub output: String,

    /// TOML configuration file (defaults apply when omitted)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the JSON run report to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    #[arg(long)]
    pub dry_run: bool,
}

pub fn execute(args: ReconcileArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mut store = CsvTableStore::new(&args.store).with_text_fields(config.text_columns());

    let mut request = ReconcileRequest::new(config, args.batch, args.output).dry_run(args.dry_run);
    if let Some(snapshot) = args.snapshot {
        request = request.with_snapshot(snapshot);
    }

    let r = run_reconcile(&mut store, &request, &mut RandomIdGenerator, Utc::now())?;

    print!("{}", render_human_summary(&r));
    if args.dry_run {
        println!();
        println!("Dry run: table '{}' was not written", request.output_table);
    }

    if let Some(path) = &args.report {
        write_report(path, &RunReport::from_reconciliation(&r))
            .with_context(|| format!("writing run report to {}", path.display()))?;
    }

    tracing::debug!(run_id = %r.run_id(), "reconcile command finished");
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<MatchConfig> {
    let Some(path) = path else {
        return Ok(MatchConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading configuration {}", path.display()))?;
    let config = MatchConfig::from_toml(&text)
        .with_context(|| format!("loading configuration {}", path.display()))?;
    Ok(config)
}
