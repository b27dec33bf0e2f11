//! idmatch Engine - Orchestration layer
//!
//! Coordinates table loading, the reconciliation kernel and output
//! persistence.

pub mod commands;
