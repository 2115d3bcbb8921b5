//! Domain error types
//!
//! This module defines the error hierarchy for the export service.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main export error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific failure classes and provides context for error handling.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Database/record-source errors
    #[error("Database error: {0}")]
    Database(String),

    /// Row-to-record mapping errors
    #[error("Record error: {0}")]
    Record(String),

    /// CSV/XLSX/ZIP serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors (cache files, publishing)
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err.to_string())
    }
}

// Conversion from csv writer/reader errors
impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Serialization(err.to_string())
    }
}

// Conversion from zip archive errors
impl From<zip::result::ZipError> for ExportError {
    fn from(err: zip::result::ZipError) -> Self {
        ExportError::Serialization(err.to_string())
    }
}

// Conversion from workbook errors
impl From<rust_xlsxwriter::XlsxError> for ExportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ExportError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ExportError {
    fn from(err: toml::de::Error) -> Self {
        ExportError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Serialization(err.to_string())
    }
}
