#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{batch, config, row, run_at, STEEL};
use idmatch_core::{reconcile, Classification, SequentialIdGenerator, SnapshotStatus, Value};

#[test]
fn test_single_record_without_snapshot_is_new() {
    let b = batch(vec![row(STEEL, 1.5, "")]);
    let r = reconcile(
        &config(),
        &b,
        None,
        &mut SequentialIdGenerator::new("id-"),
        run_at(),
    )
    .unwrap();

    assert_eq!(r.output.len(), 1);
    assert_eq!(r.matches[0].classification, Classification::New);
    assert_eq!(r.output.value(0, "operation"), Some(&Value::from("NEW")));

    let id = r.output.value(0, "ID").unwrap();
    assert!(!id.is_blank());
    assert_eq!(id, &Value::from("id-000001"));

    assert_eq!(r.snapshot_status, SnapshotStatus::Absent);
    assert!(r.summary.first_run);
    assert!(!r.summary.has_anomalies());
}

#[test]
fn test_random_identifiers_are_fresh_and_distinct() {
    let b = batch(vec![row(STEEL, 1.5, ""), row(common::GLASS, 2.0, "")]);
    let r = idmatch_core::reconcile_now(&config(), &b, None).unwrap();

    let a = r.output.value(0, "ID").unwrap();
    let b = r.output.value(1, "ID").unwrap();
    assert_ne!(a, b);
    assert_eq!(a.as_text().map(str::len), Some(36));
}

#[test]
fn test_output_carries_metadata_then_batch_columns() {
    let b = batch(vec![row(STEEL, 1.5, "note")]);
    let r = reconcile(
        &config(),
        &b,
        None,
        &mut SequentialIdGenerator::new("id-"),
        run_at(),
    )
    .unwrap();

    let columns = r.output.columns();
    assert_eq!(
        &columns[..5],
        &[
            "ID",
            "natural_key_hash",
            "operation",
            "import_timestamp",
            "matched_by_natural_key"
        ]
    );
    assert_eq!(&columns[5..], b.columns());
    assert_eq!(
        r.output.value(0, "matched_by_natural_key"),
        Some(&Value::Bool(true))
    );
    assert_eq!(
        r.output.value(0, "import_timestamp"),
        Some(&Value::from("2024-05-02T09:00:00.000000Z"))
    );

    let hash = r.output.value(0, "natural_key_hash").unwrap().as_text().unwrap();
    assert_eq!(hash.len(), 16);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}
