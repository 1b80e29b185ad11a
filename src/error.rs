//! Centralized error types for mailkv.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mailkv library.
#[derive(Error, Debug)]
pub enum MailKvError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified email file does not exist.
    #[error("Email file not found: {0}")]
    FileNotFound(PathBuf),

    /// A required header marker never appears in the file.
    #[error("Marker '{marker}' not found in '{path}'")]
    MissingMarker { path: PathBuf, marker: &'static str },

    /// The `Date:` line could not be normalized into a row key.
    #[error("Invalid date line '{line}': {reason}")]
    InvalidDate { line: String, reason: String },

    /// A cell was written to a column family the table does not declare.
    #[error("Unknown column family '{family}' in table '{table}'")]
    UnknownFamily { table: String, family: String },

    /// A table with this name already exists in the catalog.
    #[error("Table already exists: {0}")]
    TableExists(String),

    /// No table with this name exists in the catalog.
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// The scan combines options that cannot be used together.
    #[error("Invalid scan: {0}")]
    InvalidScan(String),

    /// A column identifier is not of the form `family:qualifier`.
    #[error("Invalid column '{0}', expected 'family:qualifier'")]
    InvalidColumn(String),

    /// The snapshot file is corrupt or was written by an incompatible version.
    #[error("Corrupt or incompatible snapshot '{path}': {reason}")]
    InvalidSnapshot { path: PathBuf, reason: String },

    /// The configuration is not usable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience alias for `Result<T, MailKvError>`.
pub type Result<T> = std::result::Result<T, MailKvError>;

impl MailKvError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
