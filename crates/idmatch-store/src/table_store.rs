//! Named-table storage.

use crate::atomic::atomic_write;
use crate::csv_table::{read_csv, write_csv};
use crate::errors::{invalid_table_name, table_io_error, Result};
use idmatch_core::model::RecordSet;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// The "load table" / "save table" capability the engine runs against.
pub trait TableStore {
    /// Load a table; `Ok(None)` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error when the table exists but cannot be read or decoded.
    fn load(&self, name: &str) -> Result<Option<RecordSet>>;

    /// Create or replace a table.
    ///
    /// # Errors
    ///
    /// Returns an error when the table cannot be written.
    fn save(&mut self, name: &str, table: &RecordSet) -> Result<()>;
}

/// Tables stored as `<root>/<name>.csv`.
#[derive(Debug, Clone)]
pub struct CsvTableStore {
    root: PathBuf,
    text_fields: Vec<String>,
}

impl CsvTableStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            text_fields: Vec::new(),
        }
    }

    /// Columns decoded as text regardless of content.
    pub fn with_text_fields(mut self, fields: Vec<String>) -> Self {
        self.text_fields = fields;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing a table.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for empty names and names that would escape the root.
    pub fn table_path(&self, name: &str) -> Result<PathBuf> {
        let valid = !name.trim().is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\']);
        if !valid {
            return Err(invalid_table_name(name));
        }
        Ok(self.root.join(format!("{}.csv", name)))
    }
}

impl TableStore for CsvTableStore {
    fn load(&self, name: &str) -> Result<Option<RecordSet>> {
        let path = self.table_path(name)?;
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(table = name, path = %path.display(), "table not found");
                return Ok(None);
            }
            Err(e) => return Err(table_io_error("load_table", name, e)),
        };
        let set = read_csv(BufReader::new(file), name, &self.text_fields)?;
        Ok(Some(set))
    }

    fn save(&mut self, name: &str, table: &RecordSet) -> Result<()> {
        let path = self.table_path(name)?;
        let mut buffer = Vec::new();
        write_csv(&mut buffer, name, table)?;
        atomic_write(&path, &buffer).map_err(|e| e.with_table(name))?;
        tracing::debug!(table = name, rows = table.len(), path = %path.display(), "saved table");
        Ok(())
    }
}

/// Tables held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTableStore {
    tables: HashMap<String, RecordSet>,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, table: RecordSet) {
        self.tables.insert(name.into(), table);
    }

    pub fn get(&self, name: &str) -> Option<&RecordSet> {
        self.tables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }
}

impl TableStore for MemoryTableStore {
    fn load(&self, name: &str) -> Result<Option<RecordSet>> {
        Ok(self.tables.get(name).cloned())
    }

    fn save(&mut self, name: &str, table: &RecordSet) -> Result<()> {
        self.tables.insert(name.to_string(), table.clone());
        Ok(())
    }
}
