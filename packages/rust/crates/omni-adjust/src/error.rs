//! Error types for result adjustment.

use thiserror::Error;

/// Result alias for adjuster operations.
pub type AdjustResult<T> = Result<T, AdjustError>;

/// Failures raised by an external row source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The backend could not be reached or the connection could not be opened.
    #[error("connection error: {0}")]
    Connection(String),

    /// The backend rejected or failed to execute the query.
    #[error("query error: {0}")]
    Query(String),

    /// The backend answered with a payload that could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if err.is_status() {
            Self::Query(err.to_string())
        } else {
            Self::Connection(err.to_string())
        }
    }
}

impl From<rusqlite::Error> for SourceError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _)
                if code.code == rusqlite::ErrorCode::CannotOpen =>
            {
                Self::Connection(err.to_string())
            }
            _ => Self::Query(err.to_string()),
        }
    }
}

/// Errors surfaced to the caller of an adjuster.
#[derive(Error, Debug)]
pub enum AdjustError {
    /// A required request parameter is absent.
    #[error("the {parameter} parameter is required in {clause}")]
    MissingParameter {
        /// Clause the parameter belongs to (e.g. `gas-filter`).
        clause: &'static str,
        /// Parameter name.
        parameter: &'static str,
    },

    /// A fetched row lacks the configured result column.
    #[error("the {backend} query result must contain the {column} column name")]
    MissingColumn {
        /// Backend that produced the row.
        backend: &'static str,
        /// Column that was expected.
        column: String,
    },

    /// A request parameter is present but unusable.
    #[error("invalid {parameter} parameter: {reason}")]
    InvalidParameter {
        /// Parameter name.
        parameter: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// External source failure surfaced under the `reject` policy.
    #[error("external source error: {0}")]
    ExternalSource(#[from] SourceError),
}

impl AdjustError {
    /// True for request-rejecting configuration failures (never retried).
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::ExternalSource(_))
    }
}
