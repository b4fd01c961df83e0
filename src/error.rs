//! Typed errors for dataset loading and filtering.
//!
//! Loading errors are fatal: the binary reports them and exits, the server
//! refuses to start. An empty selection is never an error: aggregates over
//! an empty view degrade to zero counts and NaN averages instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// The source could not be read at all (missing file, HTTP failure,
    /// undecodable body).
    #[error("data unavailable from {source_name}: {reason}")]
    DataUnavailable { source_name: String, reason: String },

    /// A required column is absent from the source header.
    #[error("missing column '{column}' (accepted names: {accepted})")]
    MissingColumn { column: String, accepted: String },

    #[error("malformed date in row {row}, column '{column}': '{value}'")]
    MalformedDate {
        row: usize,
        column: String,
        value: String,
    },

    #[error("malformed value in row {row}, column '{column}': '{value}' ({expected})")]
    MalformedValue {
        row: usize,
        column: String,
        value: String,
        expected: &'static str,
    },

    /// A supplied sentiment score disagrees with the sentiment category.
    #[error("row {row}: sentiment '{category}' must have score {expected}, found {found}")]
    SentimentMismatch {
        row: usize,
        category: String,
        expected: i8,
        found: i64,
    },

    #[error("invalid filter: {0}")]
    InvalidFilter(String),
}

impl DashboardError {
    pub fn unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        DashboardError::DataUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    /// True for errors caused by the caller's input rather than the data source.
    pub fn is_client_error(&self) -> bool {
        matches!(self, DashboardError::InvalidFilter(_))
    }
}

pub type DashboardResult<T> = std::result::Result<T, DashboardError>;
