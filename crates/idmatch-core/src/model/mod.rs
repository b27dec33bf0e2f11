//! Tabular data model.
//!
//! Records are rows of a [`RecordSet`], index-aligned with its column list.
//! Row position is the stable input order every deterministic tie-break in
//! the pipeline refers to.

pub mod classification;
pub mod record;
pub mod value;

pub use classification::{ChangeSet, Classification, FieldChange};
pub use record::{Record, RecordSet};
pub use value::Value;
