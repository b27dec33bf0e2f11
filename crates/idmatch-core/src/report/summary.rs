use chrono::{DateTime, Utc};
use idmatch_core_types::RunId;
use serde::{Deserialize, Serialize};

/// Counts describing one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub run_at: DateTime<Utc>,
    /// No usable snapshot: every record was NEW.
    pub first_run: bool,

    pub input_rows: usize,
    pub output_rows: usize,
    pub new: usize,
    pub updated: usize,
    pub unchanged: usize,

    /// Batch records whose natural-key fields were all empty.
    pub empty_key_records: usize,

    pub snapshot_rows: usize,
    pub indexed_fingerprints: usize,
    /// Snapshot rows that lost their fingerprint slot to an earlier row.
    pub snapshot_duplicates: usize,
    pub snapshot_rows_without_identifier: usize,

    /// Output rows removed by uniqueness enforcement.
    pub dropped_duplicates: usize,
}

impl RunSummary {
    /// Whether any recoverable anomaly was absorbed during the run.
    pub fn has_anomalies(&self) -> bool {
        self.empty_key_records > 0
            || self.snapshot_duplicates > 0
            || self.snapshot_rows_without_identifier > 0
            || self.dropped_duplicates > 0
    }

    /// Records that will change the persisted dataset (NEW + UPDATED).
    pub fn pending_writes(&self) -> usize {
        self.new + self.updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn summary() -> RunSummary {
        RunSummary {
            run_id: RunId::from_string("run-1".to_string()),
            run_at: Utc.timestamp_opt(0, 0).unwrap(),
            first_run: false,
            input_rows: 4,
            output_rows: 4,
            new: 1,
            updated: 2,
            unchanged: 1,
            empty_key_records: 0,
            snapshot_rows: 3,
            indexed_fingerprints: 3,
            snapshot_duplicates: 0,
            snapshot_rows_without_identifier: 0,
            dropped_duplicates: 0,
        }
    }

    #[test]
    fn test_no_anomalies() {
        let s = summary();
        assert!(!s.has_anomalies());
        assert_eq!(s.pending_writes(), 3);
    }

    #[test]
    fn test_snapshot_duplicate_is_an_anomaly() {
        let s = RunSummary {
            snapshot_duplicates: 1,
            ..summary()
        };
        assert!(s.has_anomalies());
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(summary()).unwrap();
        assert_eq!(json["run_id"], "run-1");
        assert_eq!(json["updated"], 2);
        assert_eq!(json["run_at"], "1970-01-01T00:00:00Z");
    }
}
