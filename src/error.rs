//! Error types for soundcomparisons
//!
//! This module provides the error handling for the library:
//! - Domain-specific error types (names, server listings, catalog, database, downloads)
//! - Machine-readable error codes for reports and logs
//! - Context information (file path, line number, object id, etc.)
//!
//! Data anomalies in the relational source and catalog objects with unparsable
//! names are deliberately *not* errors: they are logged as warnings and counted,
//! and processing continues.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for soundcomparisons operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for soundcomparisons
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "download.max_concurrent")
        key: Option<String>,
    },

    /// A string does not follow the sound-file naming grammar
    #[error(transparent)]
    InvalidName(#[from] InvalidNameError),

    /// A line of the server checksum listing could not be parsed
    #[error("malformed server listing line {line_number}: {line:?}")]
    MalformedServerLine {
        /// 1-based line number within the listing
        line_number: usize,
        /// The offending line
        line: String,
    },

    /// A required input file is absent
    #[error("missing {what}: {path} does not exist")]
    MissingInput {
        /// What kind of input was expected (e.g. "valid sound file paths")
        what: &'static str,
        /// Where it was expected
        path: PathBuf,
    },

    /// The catalog snapshot could not be read
    #[error("invalid catalog {path}: {reason}")]
    InvalidCatalog {
        /// Path of the catalog snapshot
        path: PathBuf,
        /// Why it was rejected
        reason: String,
    },

    /// Malformed row in the relational data
    #[error("data error: {0}")]
    Data(String),

    /// The same language carries different data in different studies
    #[error("language data differs across studies for LanguageIx {language_ixs:?}")]
    InconsistentLanguages {
        /// Conflicting language indices, sorted
        language_ixs: Vec<i64>,
    },

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Sound file download failed
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Zip archive error
    #[error("archive error: {0}")]
    Archive(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// A sound-file identifier that does not match the naming grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid SoundfileName: {input}")]
pub struct InvalidNameError {
    /// The rejected input
    pub input: String,
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create the schema
    #[error("failed to create schema: {0}")]
    MigrationFailed(String),
}

/// Sound file download errors
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The media store answered with a non-success status
    #[error("GET {url} returned HTTP {status}")]
    HttpStatus {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Downloaded content does not match the catalog checksum
    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Target path of the download
        path: PathBuf,
        /// Checksum recorded in the catalog
        expected: String,
        /// Checksum of the received content
        actual: String,
    },
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Error::Archive(e.to_string())
    }
}

impl Error {
    /// Machine-readable error code
    pub fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::InvalidName(_) => "invalid_name",
            Error::MalformedServerLine { .. } => "malformed_server_line",
            Error::MissingInput { .. } => "missing_input",
            Error::InvalidCatalog { .. } => "invalid_catalog",
            Error::Data(_) => "data_error",
            Error::InconsistentLanguages { .. } => "inconsistent_languages",
            Error::Database(_) | Error::Sqlx(_) => "database_error",
            Error::Download(e) => match e {
                DownloadError::HttpStatus { .. } => "http_status",
                DownloadError::ChecksumMismatch { .. } => "checksum_mismatch",
            },
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::Csv(_) => "csv_error",
            Error::Archive(_) => "archive_error",
            Error::Other(_) => "internal_error",
        }
    }

    /// Whether this error aborts a reconciliation run before any output is written
    pub fn is_fatal_input(&self) -> bool {
        matches!(
            self,
            Error::MissingInput { .. }
                | Error::MalformedServerLine { .. }
                | Error::InvalidCatalog { .. }
        )
    }
}
