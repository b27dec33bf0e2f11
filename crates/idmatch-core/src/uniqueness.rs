//! Uniqueness enforcer.
//!
//! Groups output rows by identifier. In a group of two or more, the row with
//! the lowest `(classification rank, source row)` survives and the others
//! are dropped. Surviving rows keep their input order.

use crate::assign::AssignedTable;
use crate::model::Classification;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// A row removed because another row kept its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedRecord {
    pub identifier: String,
    pub source_row: usize,
    pub classification: Classification,
    pub kept_source_row: usize,
    pub kept_classification: Classification,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UniquenessReport {
    /// Identifiers shared by more than one row before enforcement, sorted.
    pub colliding_identifiers: Vec<String>,
    /// Dropped rows, ordered by source row.
    pub dropped: Vec<DroppedRecord>,
}

impl UniquenessReport {
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty()
    }

    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }

    pub fn is_dropped(&self, source_row: usize) -> bool {
        self.dropped
            .binary_search_by_key(&source_row, |d| d.source_row)
            .is_ok()
    }
}

/// Drop rows until every identifier appears once.
pub fn enforce_unique_identifiers(table: AssignedTable) -> (AssignedTable, UniquenessReport) {
    // identifier -> every (rank, source_row, classification) carrying it
    let mut groups: BTreeMap<String, Vec<(u8, usize, Classification)>> = BTreeMap::new();
    for row in table.rows() {
        groups.entry(row.identifier.clone()).or_default().push((
            row.classification.rank(),
            row.source_row,
            row.classification,
        ));
    }

    let mut report = UniquenessReport::default();
    let mut losers: HashSet<usize> = HashSet::new();
    for (identifier, members) in groups.iter().filter(|(_, m)| m.len() > 1) {
        let Some(&(_, kept_row, kept_class)) =
            members.iter().min_by_key(|(rank, row, _)| (*rank, *row))
        else {
            continue;
        };
        report.colliding_identifiers.push(identifier.clone());
        for &(_, source_row, classification) in members.iter().filter(|(_, r, _)| *r != kept_row) {
            losers.insert(source_row);
            report.dropped.push(DroppedRecord {
                identifier: identifier.clone(),
                source_row,
                classification,
                kept_source_row: kept_row,
                kept_classification: kept_class,
            });
        }
    }
    report.dropped.sort_by_key(|d| d.source_row);

    if losers.is_empty() {
        return (table, report);
    }

    tracing::warn!(
        dropped_duplicates = report.dropped.len(),
        colliding_identifiers = report.colliding_identifiers.len(),
        "dropped rows sharing an identifier"
    );
    let table = table.retain(|row| !losers.contains(&row.source_row));
    (table, report)
}
