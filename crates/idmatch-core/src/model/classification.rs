use crate::model::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of matching one incoming record against the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    /// No snapshot record shares the fingerprint; a fresh identifier was issued
    New,
    /// Matched a snapshot record and at least one monitored field differs
    Updated,
    /// Matched a snapshot record and no monitored field differs
    Unchanged,
}

impl Classification {
    /// Tag written into the output table.
    pub fn tag(&self) -> &'static str {
        match self {
            Classification::New => "NEW",
            Classification::Updated => "UPDATED",
            Classification::Unchanged => "UNCHANGED",
        }
    }

    /// Priority when identifiers collide; lower wins.
    ///
    /// Records carrying fresh import content outrank carried-over rows.
    pub fn rank(&self) -> u8 {
        match self {
            Classification::New => 1,
            Classification::Updated => 2,
            Classification::Unchanged => 3,
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Old/new raw values of one monitored field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub old: Value,
    pub new: Value,
}

/// Monitored field name to its change, for UPDATED records.
pub type ChangeSet = BTreeMap<String, FieldChange>;
