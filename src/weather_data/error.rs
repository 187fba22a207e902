use crate::types::extraction_kind::ExtractionKind;
use polars::datatypes::DataType;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherDataError {
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Resource unresponsive after {attempts} attempts: {url}")]
    ResourceDown {
        url: String,
        attempts: u32,
        #[source]
        last_error: Box<WeatherDataError>,
    },

    #[error("Failed to decode {kind} payload from {url}")]
    Decode {
        kind: ExtractionKind,
        url: String,
        #[source]
        source: PolarsError,
    },
}

impl WeatherDataError {
    /// Whether a retry of the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            WeatherDataError::NetworkRequest(..) | WeatherDataError::HttpStatus { .. }
        )
    }
}

/// The fetched data no longer matches the canonical schema.
///
/// Never retried: it signals a contract break with the weather API.
#[derive(Debug, Error)]
pub enum SchemaValidationError {
    #[error("Expected columns {expected:?}, found {found:?}")]
    ColumnSet {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Column '{column}' has type {found}, expected {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
        found: DataType,
    },

    #[error("Column '{column}' contains unparseable timestamp '{value}'")]
    TimestampParse { column: String, value: String },

    #[error("Renaming column '{raw}' to '{canonical}' would duplicate an existing column")]
    DuplicateColumn { raw: String, canonical: &'static str },

    #[error("Polars operation failed while normalizing: {0}")]
    Polars(#[from] PolarsError),
}
