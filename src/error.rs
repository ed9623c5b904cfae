//! Error taxonomy for the import pipeline.

use thiserror::Error;

/// Main error type for import operations.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Metadata query failure or unreachable store.
    #[error("Schema lookup failed for {table}: {message}")]
    SchemaLookup { table: String, message: String },

    /// Column/value count mismatch while assembling an INSERT.
    #[error(
        "Column names and values must have the same length building INSERT for '{table}' \
         ({columns} column(s), {values} value(s))"
    )]
    Build {
        table: String,
        columns: usize,
        values: usize,
    },

    /// Batch execute/commit failure.
    #[error("Batch execution failed: {0}")]
    Execution(String),

    /// Malformed job descriptor or invalid option.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ImportError {
    pub fn schema_lookup(table: impl Into<String>, message: impl Into<String>) -> Self {
        ImportError::SchemaLookup {
            table: table.into(),
            message: message.into(),
        }
    }

    pub fn execution(message: impl Into<String>) -> Self {
        ImportError::Execution(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        ImportError::Config(message.into())
    }
}

/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, ImportError>;
