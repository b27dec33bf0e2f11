//! Run reporting.
//!
//! [`RunSummary`] is the machine-readable count sheet of one run;
//! [`render_human_summary`] turns a whole reconciliation into Markdown for
//! review. Both are informational and never affect the output table.

pub mod human_summary;
pub mod summary;

pub use human_summary::render_human_summary;
pub use summary::RunSummary;
