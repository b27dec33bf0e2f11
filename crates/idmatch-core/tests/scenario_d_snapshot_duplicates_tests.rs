#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{batch, config, row, run_at, snapshot, STEEL};
use idmatch_core::normalize::normalize;
use idmatch_core::snapshot::{assess, SnapshotIndex};
use idmatch_core::{reconcile, Classification, SequentialIdGenerator};

#[test]
fn test_index_keeps_first_identifier() {
    let s = snapshot(vec![
        ("id-1", row(STEEL, 1.5, "")),
        ("id-2", row(STEEL, 9.9, "")),
    ]);
    let config = config();
    let (_, columns) = assess(&config, Some(&s));
    let index = SnapshotIndex::build(&normalize(&s), &s, &columns.unwrap());

    assert_eq!(index.len(), 1);
    assert_eq!(index.duplicates().len(), 1);
    assert_eq!(index.duplicates()[0].kept_identifier, "id-1");
    assert_eq!(index.duplicates()[0].dropped_identifier, "id-2");
}

#[test]
fn test_batch_record_matches_first_snapshot_row() {
    let s = snapshot(vec![
        ("id-1", row(STEEL, 1.5, "")),
        ("id-2", row(STEEL, 9.9, "")),
    ]);
    let b = batch(vec![row(STEEL, 1.5, "")]);

    let r = reconcile(
        &config(),
        &b,
        Some(&s),
        &mut SequentialIdGenerator::new("new-"),
        run_at(),
    )
    .unwrap();

    assert_eq!(r.matches[0].identifier, "id-1");
    assert_eq!(r.matches[0].classification, Classification::Unchanged);
    assert_eq!(r.summary.snapshot_duplicates, 1);
    assert!(r.summary.has_anomalies());
}

#[test]
fn test_kept_row_follows_snapshot_row_order() {
    let s = snapshot(vec![
        ("id-2", row(STEEL, 9.9, "")),
        ("id-1", row(STEEL, 1.5, "")),
    ]);
    let b = batch(vec![row(STEEL, 1.5, "")]);

    let r = reconcile(
        &config(),
        &b,
        Some(&s),
        &mut SequentialIdGenerator::new("new-"),
        run_at(),
    )
    .unwrap();

    assert_eq!(r.matches[0].identifier, "id-2");
    assert_eq!(r.matches[0].classification, Classification::Updated);
}

#[test]
fn test_two_batch_rows_resolving_to_one_identifier_keep_one() {
    // Both batch rows share a fingerprint, so both pick up id-1.
    let s = snapshot(vec![("id-1", row(STEEL, 1.5, ""))]);
    let b = batch(vec![
        row(STEEL, 1.5, ""),
        row(["Steel ", "1", "FR", "ADEME", "2024", "kg"], 3.0, ""),
    ]);

    let r = reconcile(
        &config(),
        &b,
        Some(&s),
        &mut SequentialIdGenerator::new("new-"),
        run_at(),
    )
    .unwrap();

    assert_eq!(r.output.len(), 1);
    assert_eq!(r.summary.dropped_duplicates, 1);
    // UPDATED outranks UNCHANGED
    assert_eq!(r.uniqueness.dropped[0].source_row, 0);
    assert_eq!(
        r.uniqueness.dropped[0].kept_classification,
        Classification::Updated
    );
    assert!(r.integrity.is_clean());
    assert_eq!(r.integrity.row_drift(), -1);
}

#[test]
fn test_dropped_update_is_not_reported_as_update() {
    let s = snapshot(vec![("id-1", row(STEEL, 1.5, ""))]);
    let b = batch(vec![
        row(STEEL, 2.0, ""),
        row(["Steel ", "1", "FR", "ADEME", "2024", "kg"], 3.0, ""),
    ]);

    let r = reconcile(
        &config(),
        &b,
        Some(&s),
        &mut SequentialIdGenerator::new("new-"),
        run_at(),
    )
    .unwrap();

    assert_eq!(r.matches[1].classification, Classification::Updated);
    assert!(r.uniqueness.is_dropped(1));
    assert_eq!(r.summary.updated, 1);
    let updated_rows: Vec<usize> = r.updates().map(|m| m.row).collect();
    assert_eq!(updated_rows, vec![0]);
}
