#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{batch, config, row, run_at, STEEL};
use idmatch_core::{reconcile, Classification, SequentialIdGenerator};

#[test]
fn test_empty_key_record_still_gets_identity() {
    let b = batch(vec![row(["", " ", "", "", "", ""], 1.0, "")]);

    let r = reconcile(
        &config(),
        &b,
        None,
        &mut SequentialIdGenerator::new("id-"),
        run_at(),
    )
    .unwrap();

    assert_eq!(r.output.len(), 1);
    let m = &r.matches[0];
    assert!(m.empty_key);
    assert_eq!(m.classification, Classification::New);
    assert!(!m.identifier.is_empty());
    assert_eq!(m.fingerprint.as_str().len(), 16);
    assert_eq!(r.summary.empty_key_records, 1);
    assert_eq!(r.empty_key_rows(), vec![0]);
}

#[test]
fn test_empty_key_count_ignores_partial_keys() {
    let b = batch(vec![
        row(STEEL, 1.0, ""),
        row(["", "", "", "ADEME", "", ""], 1.0, ""),
        row(["", "", "", "", "", ""], 1.0, ""),
    ]);

    let r = reconcile(
        &config(),
        &b,
        None,
        &mut SequentialIdGenerator::new("id-"),
        run_at(),
    )
    .unwrap();

    assert_eq!(r.summary.empty_key_records, 1);
    assert_eq!(r.empty_key_rows(), vec![2]);
}
