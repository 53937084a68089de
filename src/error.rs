//! Error handling for taxi trip ingestion and query operations.
//!
//! Provides error types with context for source preconditions, per-chunk
//! ingestion failures, store access and query middleware.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

/// Error types for taxi trip processing operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Source file does not exist
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Upload rejected because the file is not tabular
    #[error("Only CSV files are supported: '{file_name}'")]
    UnsupportedFileType { file_name: String },

    /// Start of a date range lies after its end
    #[error("Start date must be before end date (start: {start}, end: {end})")]
    InvalidDateRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Coordinates outside the valid latitude/longitude bounds
    #[error("Invalid coordinates: {message}")]
    InvalidCoordinates { message: String },

    /// CSV structural parsing error
    #[error("CSV parsing error: {message}")]
    CsvParsing {
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// Row content failed validation or conversion
    #[error("Data validation error: {message}")]
    DataValidation { message: String },

    /// Record store rejected an operation
    #[error("Store error: {message}")]
    Store { message: String },

    /// Query or aggregate against the store failed
    #[error("Query failed ({operation}): {message}")]
    QueryFailed { operation: String, message: String },

    /// Client exceeded its request budget
    #[error("Too many requests from '{client}': limit is {limit} per minute")]
    RateLimited { client: String, limit: u32 },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// JSON (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Aggregation engine error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Metric registration failed
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create an unsupported file type error
    pub fn unsupported_file_type(file_name: impl Into<String>) -> Self {
        Self::UnsupportedFileType {
            file_name: file_name.into(),
        }
    }

    /// Create an invalid date range error
    pub fn invalid_date_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::InvalidDateRange { start, end }
    }

    /// Create an invalid coordinates error
    pub fn invalid_coordinates(message: impl Into<String>) -> Self {
        Self::InvalidCoordinates {
            message: message.into(),
        }
    }

    /// Create a CSV parsing error with context
    pub fn csv_parsing(message: impl Into<String>, source: Option<csv::Error>) -> Self {
        Self::CsvParsing {
            message: message.into(),
            source,
        }
    }

    /// Create a data validation error
    pub fn data_validation(message: impl Into<String>) -> Self {
        Self::DataValidation {
            message: message.into(),
        }
    }

    /// Create a store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a query failed error
    pub fn query_failed(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::QueryFailed {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a rate limited error
    pub fn rate_limited(client: impl Into<String>, limit: u32) -> Self {
        Self::RateLimited {
            client: client.into(),
            limit,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// True for errors raised before any work starts
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. }
                | Self::UnsupportedFileType { .. }
                | Self::InvalidDateRange { .. }
                | Self::InvalidCoordinates { .. }
                | Self::Configuration { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::CsvParsing {
            message: "CSV parsing failed".to_string(),
            source: Some(error),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
