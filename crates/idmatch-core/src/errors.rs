use thiserror::Error;

/// Result type alias using IdMatchError
pub type Result<T> = std::result::Result<T, IdMatchError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and machine-readable run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Configuration (fatal, pre-processing)
    MissingColumns,
    InvalidConfig,

    // Input
    InvalidInput,

    // Identifier assignment
    IdGeneration,

    // Integration/IO
    Io,
    Serialization,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::MissingColumns => "ERR_MISSING_COLUMNS",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::IdGeneration => "ERR_ID_GENERATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether an error of this kind aborts a run before any output exists
    pub fn is_fatal_configuration(&self) -> bool {
        matches!(
            self,
            ExErrorKind::MissingColumns | ExErrorKind::InvalidConfig
        )
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling plus optional
/// context (operation, table, row) for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    table: Option<String>,
    row: Option<usize>,
    message: String,
    missing: Option<Vec<String>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            table: None,
            row: None,
            message: String::new(),
            missing: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add table context
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add row context
    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add the list of missing fields (populated on MissingColumns)
    pub fn with_missing(mut self, fields: Vec<String>) -> Self {
        self.missing = Some(fields);
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the table context, if any
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Get the row context, if any
    pub fn row(&self) -> Option<usize> {
        self.row
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the missing fields, if any
    pub fn missing(&self) -> Option<&[String]> {
        self.missing.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(table) = &self.table {
            write!(f, " (table: {})", table)?;
        }
        if let Some(row) = self.row {
            write!(f, " (row: {})", row)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for reconciliation operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IdMatchError {
    /// Required natural-key or monitored fields are absent from the batch schema
    #[error("Missing required columns in {table}: {missing:?} (present: {present:?})")]
    MissingColumns {
        table: String,
        missing: Vec<String>,
        present: Vec<String>,
    },

    /// Configuration failed validation
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Configuration text could not be parsed
    #[error("Failed to parse configuration: {reason}")]
    ConfigParse { reason: String },

    /// A record set is malformed (duplicate column, ragged row)
    #[error("Invalid record set: {reason}")]
    InvalidRecordSet { reason: String },

    /// The identifier generator kept returning identifiers already issued in this run
    #[error("Identifier generator produced {attempts} colliding identifiers in a row")]
    IdGenerationExhausted { attempts: u32 },

    /// Serialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<IdMatchError> for ExError {
    fn from(err: IdMatchError) -> Self {
        match err {
            IdMatchError::MissingColumns {
                table,
                missing,
                present,
            } => ExError::new(ExErrorKind::MissingColumns)
                .with_table(table)
                .with_message(format!(
                    "missing required columns {:?}; present columns: {:?}",
                    missing, present
                ))
                .with_missing(missing),

            IdMatchError::InvalidConfig { reason } => {
                ExError::new(ExErrorKind::InvalidConfig).with_message(reason)
            }

            IdMatchError::ConfigParse { reason } => ExError::new(ExErrorKind::InvalidConfig)
                .with_op("config_parse")
                .with_message(reason),

            IdMatchError::InvalidRecordSet { reason } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(reason)
            }

            IdMatchError::IdGenerationExhausted { attempts } => {
                ExError::new(ExErrorKind::IdGeneration)
                    .with_op("classify")
                    .with_message(format!(
                        "{} consecutive identifier collisions within one run",
                        attempts
                    ))
            }

            IdMatchError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for IdMatchError {
    fn from(err: serde_json::Error) -> Self {
        IdMatchError::Serialization {
            message: err.to_string(),
        }
    }
}
