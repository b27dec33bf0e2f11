//! idmatch Store - table and report persistence
//!
//! Provides:
//! - `TableStore` trait: the "load table" / "save table" capability
//! - CSV-directory store with type inference and forced-text columns
//! - In-memory store for tests and embedding
//! - JSON run reports

pub mod atomic;
pub mod csv_table;
pub mod errors;
pub mod report;
pub mod table_store;

// Re-export key types
pub use errors::Result;
pub use report::{write_report, RunReport};
pub use table_store::{CsvTableStore, MemoryTableStore, TableStore};
