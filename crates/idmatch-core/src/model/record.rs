use crate::errors::{IdMatchError, Result};
use crate::model::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One row of a [`RecordSet`], index-aligned with the set's columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record(Vec<Value>);

impl Record {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// Value at a column position; out-of-range positions read as `Null`.
    pub fn get(&self, position: usize) -> &Value {
        self.0.get(position).unwrap_or(&Value::Null)
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.0
    }
}

/// An ordered table of records sharing one column list.
///
/// Column names are unique. Every record has exactly one value per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl RecordSet {
    /// Create an empty record set with the given columns.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRecordSet` if a column name appears twice.
    pub fn new(columns: Vec<String>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(IdMatchError::InvalidRecordSet {
                    reason: format!("duplicate column '{}'", column),
                });
            }
        }
        Ok(Self {
            columns,
            records: Vec::new(),
        })
    }

    /// Build a record set from column names and row values.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRecordSet` on duplicate columns or a row whose width
    /// differs from the column count.
    pub fn from_rows<C, S>(columns: C, rows: Vec<Vec<Value>>) -> Result<Self>
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new(columns.into_iter().map(Into::into).collect())?;
        for row in rows {
            set.push(Record::new(row))?;
        }
        Ok(set)
    }

    /// Append a record.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRecordSet` if the record width differs from the column count.
    pub fn push(&mut self, record: Record) -> Result<()> {
        if record.len() != self.columns.len() {
            return Err(IdMatchError::InvalidRecordSet {
                reason: format!(
                    "row {} has {} values but there are {} columns",
                    self.records.len(),
                    record.len(),
                    self.columns.len()
                ),
            });
        }
        self.records.push(record);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, row: usize) -> Option<&Record> {
        self.records.get(row)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Value of a named field in a given row, `None` if either is missing.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let position = self.column_index(column)?;
        self.records.get(row).map(|r| r.get(position))
    }

    /// Build a record set whose records are already known to match the columns.
    pub(crate) fn from_parts(columns: Vec<String>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }
}
