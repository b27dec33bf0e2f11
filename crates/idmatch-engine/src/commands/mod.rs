//! Command orchestration layer.
//!
//! Provides high-level command functions that coordinate between
//! the reconciliation kernel and the table store.

pub mod reconcile;
