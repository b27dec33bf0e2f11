//! idmatch CLI
//!
//! Command-line interface for natural-key reconciliation

use clap::{Parser, Subcommand};
use idmatch_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "idmatch")]
#[command(about = "idmatch - Natural-key matching and stable ID assignment", long_about = None)]
struct Cli {
    /// Emit JSON structured logs instead of human-readable ones
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Reconcile an imported batch against the prior snapshot
    Reconcile(commands::reconcile::ReconcileArgs),
    /// Print the default configuration as TOML
    DefaultConfig,
}

fn main() {
    let cli = Cli::parse();

    init(if cli.log_json {
        Profile::Production
    } else {
        Profile::Development
    });

    let result = match cli.command {
        Commands::Reconcile(args) => commands::reconcile::execute(args),
        Commands::DefaultConfig => commands::default_config::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
