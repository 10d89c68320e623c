//! Unified error types for the data API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Unified error type for the data API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Upstream provider or local file error.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Reshaping error.
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while fetching or reading raw data.
#[derive(Error, Debug)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("{provider} returned HTTP {status}")]
    Status {
        /// Provider name.
        provider: &'static str,
        /// HTTP status code.
        status: u16,
    },

    /// Upstream answered with an error payload.
    #[error("{provider} error: {message}")]
    Upstream {
        /// Provider name.
        provider: &'static str,
        /// Message reported by the provider.
        message: String,
    },

    /// Upstream payload did not have the expected shape.
    #[error("malformed {provider} response: {reason}")]
    Malformed {
        /// Provider name.
        provider: &'static str,
        /// What was wrong.
        reason: String,
    },

    /// Invalid base URL.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// Failed to read a local file.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse delimited text.
    #[error("failed to parse {path}: {source}")]
    Csv {
        /// File path.
        path: String,
        /// Underlying CSV error.
        source: csv::Error,
    },
}

/// Errors raised while reshaping a dataset.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatasetError {
    /// A cell could not be converted to a number.
    #[error("invalid number {value:?} in column {column:?} at row {row}")]
    InvalidCell {
        /// Column name.
        column: String,
        /// Zero-based data row.
        row: usize,
        /// Offending cell text.
        value: String,
    },

    /// A record has the wrong number of fields.
    #[error("expected {expected} fields at row {row}, found {found}")]
    FieldCount {
        /// Zero-based data row.
        row: usize,
        /// Expected field count.
        expected: usize,
        /// Actual field count.
        found: usize,
    },

    /// A (category, date) pair appears more than once.
    #[error("duplicate entry for {key}")]
    Duplicate {
        /// The repeated key.
        key: String,
    },

    /// The input has no header row.
    #[error("input has no header row")]
    MissingHeader,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self, "Request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "internal server error" })),
        )
            .into_response()
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ApiError>;
