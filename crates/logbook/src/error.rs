//! Error types for logbook.
//!
//! This module defines all error types used throughout the logbook crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for logbook operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// A required configuration value is missing or out of range.
    #[error("invalid configuration: {message}")]
    ConfigInvalid {
        /// Description of the validation failure.
        message: String,
    },

    // === Source Errors ===
    /// The flight data source could not be read.
    #[error("cannot read {origin}: {message}")]
    SourceUnavailable {
        /// Workbook path or spreadsheet id.
        origin: String,
        /// Description of what went wrong.
        message: String,
    },

    /// The source returned no rows.
    #[error("no data found in {origin}")]
    SourceEmpty {
        /// Workbook path or spreadsheet id.
        origin: String,
    },

    /// A row does not have the expected shape.
    #[error(
        "malformed row {row}, column {}: expected {expected}, found {found}",
        column_name(*column)
    )]
    MalformedRow {
        /// 1-based sheet row number.
        row: usize,
        /// 0-based column index.
        column: usize,
        /// What the column should hold.
        expected: &'static str,
        /// What it held instead.
        found: String,
    },

    // === Airport Database Errors ===
    /// The airport database could not be loaded.
    #[error("failed to load airport database {path}: {message}")]
    AirportDb {
        /// Path to the database file.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    // === Output Errors ===
    /// A PDF or PNG could not be produced.
    #[error("render error: {0}")]
    Render(String),

    /// Failed to write an output file.
    #[error("failed to write {path}: {source}")]
    OutputWrite {
        /// Path that couldn't be written.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for logbook operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

/// Spreadsheet column letter for a 0-based index (`0` is `A`, `26` is `AA`).
#[must_use]
pub fn column_name(column: usize) -> String {
    let mut n = column + 1;
    let mut name = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + u8::try_from(rem).unwrap_or(0));
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8(name).unwrap_or_default()
}

impl Error {
    /// Create a configuration validation error.
    #[must_use]
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            message: message.into(),
        }
    }

    /// Create a source unavailable error.
    #[must_use]
    pub fn source_unavailable(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// Create a source empty error.
    #[must_use]
    pub fn source_empty(origin: impl Into<String>) -> Self {
        Self::SourceEmpty {
            origin: origin.into(),
        }
    }

    /// Create a malformed row error.
    #[must_use]
    pub fn malformed_row(
        row: usize,
        column: usize,
        expected: &'static str,
        found: impl Into<String>,
    ) -> Self {
        Self::MalformedRow {
            row,
            column,
            expected,
            found: found.into(),
        }
    }

    /// Create an airport database error.
    #[must_use]
    pub fn airport_db(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::AirportDb {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a render error.
    #[must_use]
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Check if this error comes from loading or validating configuration.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigLoad(_) | Self::ConfigInvalid { .. })
    }

    /// Check if this error comes from the flight data source.
    #[must_use]
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable { .. } | Self::SourceEmpty { .. } | Self::MalformedRow { .. }
        )
    }
}
