#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{TimeZone, Utc};
use idmatch_core::logging_facility::test_capture::init_test_capture;
use idmatch_core::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use idmatch_core::snapshot::SnapshotStatus;
use idmatch_core::{Classification, MatchConfig, RecordSet, SequentialIdGenerator, Value};
use idmatch_engine::commands::reconcile::{run_reconcile, ReconcileRequest};
use idmatch_store::{CsvTableStore, MemoryTableStore, TableStore};
use std::fs;
use tempfile::TempDir;

fn config() -> MatchConfig {
    MatchConfig::new(["name", "source"], ["FE"]).with_critical_fields(["name"])
}

fn csv_store(dir: &TempDir) -> CsvTableStore {
    CsvTableStore::new(dir.path()).with_text_fields(config().text_columns())
}

#[test]
fn test_second_run_reuses_identifiers_from_saved_output() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("import_1.csv"),
        "name,source,FE\nSteel,ADEME,1.5\nGlass,ADEME,0.8\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("import_2.csv"),
        "name,source,FE\nGlass,ADEME,0.8\nSteel,ADEME,1.7\nWood,ADEME,0.1\n",
    )
    .unwrap();

    let mut store = csv_store(&dir);
    let first = run_reconcile(
        &mut store,
        &ReconcileRequest::new(config(), "import_1", "factors").with_snapshot("factors"),
        &mut SequentialIdGenerator::new("r1-"),
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    )
    .unwrap();
    assert!(first.summary.first_run);
    assert_eq!(first.summary.new, 2);

    let second = run_reconcile(
        &mut store,
        &ReconcileRequest::new(config(), "import_2", "factors").with_snapshot("factors"),
        &mut SequentialIdGenerator::new("r2-"),
        Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
    )
    .unwrap();
    assert!(!second.summary.first_run);
    assert_eq!(second.summary.unchanged, 1);
    assert_eq!(second.summary.updated, 1);
    assert_eq!(second.summary.new, 1);

    let saved = store.load("factors").unwrap().unwrap();
    let ids: Vec<_> = (0..saved.len())
        .map(|row| saved.value(row, "ID").unwrap().clone())
        .collect();
    assert_eq!(
        ids,
        vec![
            Value::from("r1-000002"),
            Value::from("r1-000001"),
            Value::from("r2-000001"),
        ]
    );
    assert_eq!(saved.value(1, "FE"), Some(&Value::from(1.7)));
    assert_eq!(saved.value(1, "operation"), Some(&Value::from("UPDATED")));
}

#[test]
fn test_unreadable_snapshot_degrades_to_first_run() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("batch.csv"), "name,source,FE\nSteel,ADEME,1.5\n").unwrap();
    fs::write(dir.path().join("prior.csv"), "ID,name,source,FE\nx-1,Steel\n").unwrap();

    let mut store = csv_store(&dir);
    let r = run_reconcile(
        &mut store,
        &ReconcileRequest::new(config(), "batch", "out").with_snapshot("prior"),
        &mut SequentialIdGenerator::new("n-"),
        Utc::now(),
    )
    .unwrap();

    assert!(matches!(r.snapshot_status, SnapshotStatus::LoadFailed { .. }));
    assert!(r.snapshot_status.is_first_run());
    assert_eq!(r.matches[0].classification, Classification::New);
    assert_eq!(r.matches[0].identifier, "n-000001");
}

#[test]
fn test_output_can_replace_its_own_snapshot_table() {
    let mut store = MemoryTableStore::new();
    store.insert(
        "snapshot",
        RecordSet::from_rows(
            ["ID", "name", "source", "FE"],
            vec![vec![
                Value::from("keep-me"),
                Value::from("Steel"),
                Value::from("ADEME"),
                Value::from(1.5),
            ]],
        )
        .unwrap(),
    );
    store.insert(
        "batch",
        RecordSet::from_rows(
            ["name", "source", "FE"],
            vec![vec![Value::from("Steel"), Value::from("ADEME"), Value::from(1.5)]],
        )
        .unwrap(),
    );

    let r = run_reconcile(
        &mut store,
        &ReconcileRequest::new(config(), "batch", "snapshot").with_snapshot("snapshot"),
        &mut SequentialIdGenerator::new("n-"),
        Utc::now(),
    )
    .unwrap();

    assert_eq!(r.summary.unchanged, 1);
    let saved = store.get("snapshot").unwrap();
    assert_eq!(saved.value(0, "ID"), Some(&Value::from("keep-me")));
    assert_eq!(saved.value(0, "operation"), Some(&Value::from("UNCHANGED")));
}

#[test]
fn test_run_reconcile_logs_start_and_end() {
    let capture = init_test_capture();
    let mut store = MemoryTableStore::new();
    store.insert(
        "log_batch_ok",
        RecordSet::from_rows(
            ["name", "source", "FE"],
            vec![vec![Value::from("Steel"), Value::from("ADEME"), Value::from(1.5)]],
        )
        .unwrap(),
    );

    run_reconcile(
        &mut store,
        &ReconcileRequest::new(config(), "log_batch_ok", "log_out"),
        &mut SequentialIdGenerator::new("n-"),
        Utc::now(),
    )
    .unwrap();

    let started = capture.count_events(|e| {
        e.op.as_deref() == Some("run_reconcile")
            && e.event.as_deref() == Some(EVENT_START)
            && e.fields.get("batch_table").map(String::as_str) == Some("log_batch_ok")
    });
    assert_eq!(started, 1);
    assert!(
        capture.count_events(|e| {
            e.op.as_deref() == Some("run_reconcile")
                && e.event.as_deref() == Some(EVENT_END)
                && e.fields.contains_key("run_id")
                && e.fields.contains_key("duration_ms")
        }) >= 1
    );
}

#[test]
fn test_run_reconcile_logs_error_for_missing_batch() {
    let capture = init_test_capture();
    let mut store = MemoryTableStore::new();

    let err = run_reconcile(
        &mut store,
        &ReconcileRequest::new(config(), "log_batch_absent", "out"),
        &mut SequentialIdGenerator::new("n-"),
        Utc::now(),
    )
    .unwrap_err();
    assert_eq!(err.op(), Some("load_batch"));

    assert!(
        capture.count_events(|e| {
            e.op.as_deref() == Some("run_reconcile")
                && e.event.as_deref() == Some(EVENT_END_ERROR)
                && e.fields.get("err.code").map(String::as_str) == Some("ERR_INVALID_INPUT")
        }) >= 1
    );
}
