//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_RUN_ID: &str = "run_id";

// Table identifiers
pub const FIELD_TABLE: &str = "table";
pub const FIELD_ROW: &str = "row";

// Collection sizes
pub const FIELD_BATCH_ROWS: &str = "batch_rows";
pub const FIELD_SNAPSHOT_ROWS: &str = "snapshot_rows";
pub const FIELD_OUTPUT_ROWS: &str = "output_rows";

// Anomaly counters
pub const FIELD_EMPTY_KEY_RECORDS: &str = "empty_key_records";
pub const FIELD_SNAPSHOT_DUPLICATES: &str = "snapshot_duplicates";
pub const FIELD_DROPPED_DUPLICATES: &str = "dropped_duplicates";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
