//! idmatch Core - natural-key reconciliation kernel
//!
//! Reconciles an imported batch of records against the previously persisted
//! snapshot and assigns stable identifiers:
//! - Comparison-only normalization (trimmed text, 6-decimal numerics)
//! - SHA-256 natural-key fingerprints
//! - First-wins snapshot index
//! - NEW / UPDATED / UNCHANGED classification with change sets
//! - Identifier assignment and post-hoc uniqueness enforcement
//! - Integrity check and run summary
//!
//! The kernel works on in-memory [`RecordSet`]s only; loading and saving
//! tables lives in `idmatch-store`.
//!
//! ```
//! use idmatch_core::{reconcile_now, MatchConfig, RecordSet, Value};
//!
//! let config = MatchConfig::new(["name", "source"], ["FE"]);
//! let batch = RecordSet::from_rows(
//!     ["name", "source", "FE"],
//!     vec![vec![Value::from("Steel"), Value::from("ADEME"), Value::from(1.5)]],
//! )?;
//!
//! let run = reconcile_now(&config, &batch, None)?;
//! assert_eq!(run.summary.new, 1);
//! # Ok::<(), idmatch_core::IdMatchError>(())
//! ```

pub mod assign;
pub mod config;
pub mod errors;
pub mod fingerprint;
pub mod ids;
pub mod integrity;
pub mod logging_facility;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod reconcile;
pub mod report;
pub mod snapshot;
pub mod uniqueness;

// Log field and event names, re-exported for the logging macros
pub use idmatch_core_types::schema;

// Re-export commonly used types
pub use config::{MatchConfig, OutputColumns};
pub use errors::{ExError, ExErrorKind, IdMatchError, Result};
pub use fingerprint::Fingerprint;
pub use ids::{IdGenerator, RandomIdGenerator, SequentialIdGenerator};
pub use matcher::Match;
pub use model::{ChangeSet, Classification, FieldChange, Record, RecordSet, Value};
pub use reconcile::{reconcile, reconcile_now, Reconciliation};
pub use report::{render_human_summary, RunSummary};
pub use snapshot::SnapshotStatus;
