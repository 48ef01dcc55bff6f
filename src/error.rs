//! Application error type.
//!
//! Every variant maps to a process exit code:
//! - 2: configuration or input files unusable
//! - 3: input files readable but not in the expected shape
//! - 4: output could not be produced

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to {action} '{}': {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV '{}': {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Source {0} is not available")]
    SourceUnavailable(String),

    /// An expected column is absent (e.g. the upstream file format changed).
    #[error("{table}: missing expected column `{column}`")]
    SchemaMismatch { table: String, column: String },

    #[error("{table}: column `{column}` has invalid value '{value}' for `{geo_key}`")]
    InvalidValue {
        table: String,
        column: String,
        geo_key: String,
        value: String,
    },

    #[error("{table}: geo unit `{geo_key}` appears more than once")]
    DuplicateKey { table: String, geo_key: String },

    #[error("{table}: split files disagree on row count ({expected} vs {found})")]
    RowCountMismatch {
        table: String,
        expected: usize,
        found: usize,
    },

    #[error("Failed to write {what}: {message}")]
    Export { what: &'static str, message: String },
}

impl AppError {
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    pub fn schema(table: impl Into<String>, column: impl Into<String>) -> Self {
        AppError::SchemaMismatch {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) | AppError::Io { .. } | AppError::Csv { .. } | AppError::SourceUnavailable(_) => 2,
            AppError::SchemaMismatch { .. }
            | AppError::InvalidValue { .. }
            | AppError::DuplicateKey { .. }
            | AppError::RowCountMismatch { .. } => 3,
            AppError::Export { .. } => 4,
        }
    }
}
