use chrono::{DateTime, TimeZone, Utc};
use idmatch_core::{MatchConfig, RecordSet, Value};

#[allow(dead_code)]
pub const KEY: [&str; 6] = ["name", "scope", "location", "source", "date", "unit"];
#[allow(dead_code)]
pub const MONITORED: [&str; 2] = ["FE", "comments"];

/// Config over the emission-factor style test columns.
#[allow(dead_code)]
pub fn config() -> MatchConfig {
    MatchConfig::new(KEY, MONITORED).with_critical_fields(["name", "source"])
}

#[allow(dead_code)]
pub fn run_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap()
}

/// One batch row: the six key fields, then FE and comments.
#[allow(dead_code)]
pub fn row(key: [&str; 6], fe: f64, comments: &str) -> Vec<Value> {
    let mut values: Vec<Value> = key.iter().map(|v| Value::from(*v)).collect();
    values.push(Value::from(fe));
    values.push(Value::from(comments));
    values
}

#[allow(dead_code)]
pub fn batch(rows: Vec<Vec<Value>>) -> RecordSet {
    let columns: Vec<&str> = KEY.iter().chain(MONITORED.iter()).copied().collect();
    RecordSet::from_rows(columns, rows).unwrap()
}

/// Snapshot with an `ID` column in front of the batch columns.
#[allow(dead_code)]
pub fn snapshot(rows: Vec<(&str, Vec<Value>)>) -> RecordSet {
    let columns: Vec<&str> = std::iter::once("ID")
        .chain(KEY.iter().copied())
        .chain(MONITORED.iter().copied())
        .collect();
    let rows = rows
        .into_iter()
        .map(|(id, values)| {
            let mut full = vec![Value::from(id)];
            full.extend(values);
            full
        })
        .collect();
    RecordSet::from_rows(columns, rows).unwrap()
}

#[allow(dead_code)]
pub const STEEL: [&str; 6] = ["Steel", "1", "FR", "ADEME", "2024", "kg"];

#[allow(dead_code)]
pub const GLASS: [&str; 6] = ["Glass", "1", "FR", "ADEME", "2024", "kg"];
