//! Reconciliation configuration.
//!
//! The natural key, the monitored fields and the output column names are
//! configuration data passed into every entry point. Nothing here is global,
//! so several configurations can run side by side in one process.

use crate::errors::{IdMatchError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

// ---------------------------------------------------------------------------
// Defaults (emission-factor import)
// ---------------------------------------------------------------------------

const DEFAULT_NATURAL_KEY: &[&str] = &[
    "Nom",
    "Périmètre",
    "Localisation",
    "Source",
    "Date",
    "Unité donnée d'activité",
];

const DEFAULT_MONITORED_FIELDS: &[&str] = &[
    "FE",
    "Incertitude",
    "Commentaires",
    "Description",
    "Unité donnée d'activité",
];

const DEFAULT_CRITICAL_FIELDS: &[&str] = &["Nom", "Source"];

const DEFAULT_TEXT_FIELDS: &[&str] = &[
    "Méthodologie",
    "Méthodologie_en",
    "Commentaires",
    "Commentaires_en",
    "Description",
    "Description_en",
    "Nom",
    "Nom_en",
    "Périmètre",
    "Périmètre_en",
    "Secteur",
    "Secteur_en",
    "Sous-secteur",
    "Sous-secteur_en",
    "Localisation",
    "Localisation_en",
    "Source",
    "Contributeur",
    "Contributeur_en",
    "Type_de_données",
    "Type_de_données_en",
    "Unité donnée d'activité",
    "Unite_en",
    "Incertitude",
];

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchConfig {
    /// Ordered fields whose joined values identify a logical record.
    pub natural_key: Vec<String>,
    /// Fields whose change turns a match into an update.
    pub monitored_fields: Vec<String>,
    /// Fields checked for empty values after the run.
    pub critical_fields: Vec<String>,
    /// Identifier column of the prior snapshot.
    pub identifier_field: String,
    /// Columns loaders must keep as text even when cells look numeric.
    pub text_fields: Vec<String>,
    pub output: OutputColumns,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            natural_key: owned(DEFAULT_NATURAL_KEY),
            monitored_fields: owned(DEFAULT_MONITORED_FIELDS),
            critical_fields: owned(DEFAULT_CRITICAL_FIELDS),
            identifier_field: "ID".to_string(),
            text_fields: owned(DEFAULT_TEXT_FIELDS),
            output: OutputColumns::default(),
        }
    }
}

/// Names of the five metadata columns prepended to every output record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputColumns {
    pub identifier: String,
    pub fingerprint: String,
    pub classification: String,
    pub timestamp: String,
    pub provenance: String,
}

impl Default for OutputColumns {
    fn default() -> Self {
        Self {
            identifier: "ID".to_string(),
            fingerprint: "natural_key_hash".to_string(),
            classification: "operation".to_string(),
            timestamp: "import_timestamp".to_string(),
            provenance: "matched_by_natural_key".to_string(),
        }
    }
}

impl OutputColumns {
    /// Metadata column names in output order.
    pub fn names(&self) -> [&str; 5] {
        [
            &self.identifier,
            &self.fingerprint,
            &self.classification,
            &self.timestamp,
            &self.provenance,
        ]
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MatchConfig {
    /// Build a config with the given key and monitored fields and defaults elsewhere.
    ///
    /// Critical fields default to none; the identifier field stays `ID`.
    pub fn new<K, M, S>(natural_key: K, monitored_fields: M) -> Self
    where
        K: IntoIterator<Item = S>,
        M: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            natural_key: natural_key.into_iter().map(Into::into).collect(),
            monitored_fields: monitored_fields.into_iter().map(Into::into).collect(),
            critical_fields: Vec::new(),
            text_fields: Vec::new(),
            ..Self::default()
        }
    }

    pub fn with_critical_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.critical_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_identifier_field(mut self, field: impl Into<String>) -> Self {
        self.identifier_field = field.into();
        self
    }

    pub fn from_toml(input: &str) -> Result<Self> {
        let config: MatchConfig = toml::from_str(input).map_err(|e| IdMatchError::ConfigParse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| IdMatchError::Serialization {
            message: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.natural_key.is_empty() {
            return Err(invalid("natural_key must list at least one field"));
        }
        if let Some(name) = first_duplicate(&self.natural_key) {
            return Err(invalid(format!("natural_key lists '{}' twice", name)));
        }
        if let Some(name) = first_duplicate(&self.monitored_fields) {
            return Err(invalid(format!("monitored_fields lists '{}' twice", name)));
        }
        if self.natural_key.iter().any(|f| f.trim().is_empty())
            || self.monitored_fields.iter().any(|f| f.trim().is_empty())
        {
            return Err(invalid("field names must not be empty"));
        }
        if self.identifier_field.trim().is_empty() {
            return Err(invalid("identifier_field must not be empty"));
        }

        let names = self.output.names();
        if names.iter().any(|n| n.trim().is_empty()) {
            return Err(invalid("output column names must not be empty"));
        }
        if let Some(name) = first_duplicate(names.iter().copied()) {
            return Err(invalid(format!("output column '{}' is used twice", name)));
        }

        Ok(())
    }

    /// Columns a loader must decode as text: the configured text fields, the
    /// snapshot identifier and the text metadata columns of earlier outputs.
    pub fn text_columns(&self) -> Vec<String> {
        let mut columns = self.text_fields.clone();
        let extra = [
            self.identifier_field.as_str(),
            self.output.identifier.as_str(),
            self.output.fingerprint.as_str(),
            self.output.classification.as_str(),
            self.output.timestamp.as_str(),
        ];
        for name in extra {
            if !columns.iter().any(|c| c == name) {
                columns.push(name.to_string());
            }
        }
        columns
    }

    /// Every field the incoming batch must carry: natural key plus monitored fields.
    pub fn required_fields(&self) -> BTreeSet<&str> {
        self.natural_key
            .iter()
            .chain(self.monitored_fields.iter())
            .map(String::as_str)
            .collect()
    }
}

fn invalid(reason: impl Into<String>) -> IdMatchError {
    IdMatchError::InvalidConfig {
        reason: reason.into(),
    }
}

fn first_duplicate<I, S>(names: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    for name in names {
        let name = name.as_ref().to_string();
        if !seen.insert(name.clone()) {
            return Some(name);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Column resolution
// ---------------------------------------------------------------------------

/// Column positions of the configured fields within the incoming batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    /// Natural-key positions, in declared key order.
    pub key: Vec<usize>,
    /// `(field name, position)` of each monitored field, in declared order.
    pub monitored: Vec<(String, usize)>,
}

impl ResolvedColumns {
    /// Resolve the configured fields against a batch's columns.
    ///
    /// # Errors
    ///
    /// Returns `MissingColumns` listing every required field the batch lacks.
    /// This is the fatal configuration error: nothing has been processed yet.
    pub fn resolve(config: &MatchConfig, columns: &[String]) -> Result<Self> {
        let position = |name: &str| columns.iter().position(|c| c == name);

        let missing: Vec<String> = config
            .required_fields()
            .into_iter()
            .filter(|f| position(f).is_none())
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            let mut present = columns.to_vec();
            present.sort();
            return Err(IdMatchError::MissingColumns {
                table: "batch".to_string(),
                missing,
                present,
            });
        }

        let mut key = Vec::with_capacity(config.natural_key.len());
        for field in &config.natural_key {
            key.extend(position(field));
        }
        let mut monitored = Vec::with_capacity(config.monitored_fields.len());
        for field in &config.monitored_fields {
            if let Some(p) = position(field) {
                monitored.push((field.clone(), p));
            }
        }

        Ok(Self { key, monitored })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const CUSTOM: &str = r#"
natural_key = ["name", "scope", "location", "source", "date", "unit"]
monitored_fields = ["FE", "uncertainty"]
critical_fields = ["name"]
identifier_field = "uuid"

[output]
identifier = "uuid"
classification = "status"
"#;

    #[test]
    fn parse_custom_config() {
        let config = MatchConfig::from_toml(CUSTOM).unwrap();
        assert_eq!(config.natural_key.len(), 6);
        assert_eq!(config.natural_key[0], "name");
        assert_eq!(config.monitored_fields, vec!["FE", "uncertainty"]);
        assert_eq!(config.identifier_field, "uuid");
        assert_eq!(config.output.identifier, "uuid");
        assert_eq!(config.output.classification, "status");
        // unspecified output columns keep their defaults
        assert_eq!(config.output.fingerprint, "natural_key_hash");
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = MatchConfig::from_toml("").unwrap();
        assert_eq!(config, MatchConfig::default());
        assert_eq!(config.natural_key[5], "Unité donnée d'activité");
        assert!(config
            .monitored_fields
            .contains(&"Unité donnée d'activité".to_string()));
    }

    #[test]
    fn default_round_trips_through_toml() {
        let text = MatchConfig::default().to_toml().unwrap();
        let parsed = MatchConfig::from_toml(&text).unwrap();
        assert_eq!(parsed, MatchConfig::default());
    }

    #[test]
    fn reject_unknown_key() {
        let err = MatchConfig::from_toml("natural_keys = [\"a\"]").unwrap_err();
        assert!(matches!(err, IdMatchError::ConfigParse { .. }));
    }

    #[test]
    fn reject_empty_natural_key() {
        let err = MatchConfig::from_toml("natural_key = []").unwrap_err();
        assert!(err.to_string().contains("natural_key"));
    }

    #[test]
    fn reject_duplicate_key_field() {
        let err = MatchConfig::from_toml("natural_key = [\"a\", \"b\", \"a\"]").unwrap_err();
        assert!(err.to_string().contains("'a'"));
    }

    #[test]
    fn reject_colliding_output_columns() {
        let input = r#"
[output]
fingerprint = "ID"
"#;
        let err = MatchConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("'ID'"));
    }

    #[test]
    fn text_columns_include_metadata_once() {
        let config = MatchConfig::new(["name"], ["FE"]);
        assert_eq!(
            config.text_columns(),
            vec!["ID", "natural_key_hash", "operation", "import_timestamp"]
        );
        let defaults = MatchConfig::default().text_columns();
        assert!(defaults.contains(&"Nom".to_string()));
        assert_eq!(defaults.iter().filter(|c| *c == "ID").count(), 1);
    }

    #[test]
    fn resolve_reports_every_missing_column() {
        let config = MatchConfig::new(["name", "source"], ["FE", "notes"]);
        let columns = vec!["name".to_string(), "FE".to_string()];
        let err = ResolvedColumns::resolve(&config, &columns).unwrap_err();
        match err {
            IdMatchError::MissingColumns {
                missing, present, ..
            } => {
                assert_eq!(missing, vec!["notes", "source"]);
                assert_eq!(present, vec!["FE", "name"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn resolve_keeps_declared_order() {
        let config = MatchConfig::new(["b", "a"], ["c"]);
        let columns = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let resolved = ResolvedColumns::resolve(&config, &columns).unwrap();
        assert_eq!(resolved.key, vec![1, 0]);
        assert_eq!(resolved.monitored, vec![("c".to_string(), 2)]);
    }
}
