#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{batch, config, run_at, KEY, MONITORED};
use idmatch_core::{
    reconcile, Classification, RecordSet, Reconciliation, SequentialIdGenerator, Value,
};
use proptest::prelude::*;
use std::collections::HashSet;

/// Small alphabets so keys collide often.
fn arb_row() -> impl Strategy<Value = Vec<Value>> {
    (
        prop::collection::vec(prop_oneof!["[ab]", "[ab] ", Just(String::new())], 6),
        prop_oneof![Just(1.0f64), Just(2.0f64), Just(2.000_000_1f64)],
        prop_oneof![Just("x"), Just(" x"), Just("y")],
    )
        .prop_map(|(key, fe, comments)| {
            let mut values: Vec<Value> = key.into_iter().map(Value::from).collect();
            values.push(Value::from(fe));
            values.push(Value::from(comments));
            values
        })
}

fn arb_batch() -> impl Strategy<Value = RecordSet> {
    prop::collection::vec(arb_row(), 0..24).prop_map(batch)
}

fn run(batch: &RecordSet, snapshot: Option<&RecordSet>) -> Reconciliation {
    reconcile(
        &config(),
        batch,
        snapshot,
        &mut SequentialIdGenerator::new("id-"),
        run_at(),
    )
    .unwrap()
}

fn identifiers(r: &Reconciliation) -> Vec<String> {
    (0..r.output.len())
        .map(|row| r.output.value(row, "ID").unwrap().to_string())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_output_identifiers_unique_and_non_empty(b in arb_batch(), s in arb_batch()) {
        let first = run(&s, None);
        let r = run(&b, Some(&first.output));

        let ids = identifiers(&r);
        prop_assert!(ids.iter().all(|id| !id.trim().is_empty()));
        let distinct: HashSet<&String> = ids.iter().collect();
        prop_assert_eq!(distinct.len(), ids.len());
        prop_assert!(r.integrity.is_clean());
    }

    #[test]
    fn prop_runs_are_deterministic(b in arb_batch(), s in arb_batch()) {
        let snap = run(&s, None).output;
        let one = run(&b, Some(&snap));
        let two = run(&b, Some(&snap));
        prop_assert_eq!(one.output, two.output);
        prop_assert_eq!(one.matches, two.matches);
    }

    #[test]
    fn prop_identity_is_stable_across_runs(b in arb_batch()) {
        let first = run(&b, None);
        let second = reconcile(
            &config(),
            &b,
            Some(&first.output),
            &mut SequentialIdGenerator::new("second-"),
            run_at(),
        )
        .unwrap();

        // every surviving row of run 1 keeps its identifier in run 2
        let first_ids: HashSet<String> = identifiers(&first).into_iter().collect();
        for m in &second.matches {
            prop_assert_ne!(m.classification, Classification::New);
            prop_assert!(first_ids.contains(&m.identifier));
        }
    }

    #[test]
    fn prop_classification_is_consistent(b in arb_batch(), s in arb_batch()) {
        let snap = run(&s, None).output;
        let r = run(&b, Some(&snap));
        for m in &r.matches {
            match m.classification {
                Classification::New => prop_assert!(m.snapshot_row.is_none()),
                Classification::Updated => {
                    prop_assert!(m.snapshot_row.is_some());
                    prop_assert!(!m.changes.is_empty());
                }
                Classification::Unchanged => {
                    prop_assert!(m.snapshot_row.is_some());
                    prop_assert!(m.changes.is_empty());
                }
            }
        }
    }

    #[test]
    fn prop_batch_fields_survive_unchanged(b in arb_batch()) {
        let r = run(&b, None);
        prop_assert_eq!(r.output.len(), b.len());
        for row in 0..b.len() {
            for column in KEY.iter().chain(MONITORED.iter()) {
                prop_assert_eq!(r.output.value(row, column), b.value(row, column));
            }
        }
    }
}
