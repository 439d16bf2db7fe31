//! Error types for search backend operations

use crate::error::AppError;
use reqwest::StatusCode;

/// Result type for search backend operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur while talking to the search backend
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Transport failure (connect, TLS, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Backend answered with a non-success status
    #[error("Backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// One or more documents in an import batch were rejected
    #[error("Import rejected {failed} of {total} documents: {first_error}")]
    ImportRejected {
        failed: usize,
        total: usize,
        first_error: String,
    },

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl SearchError {
    pub fn status(status: StatusCode, body: impl Into<String>) -> Self {
        SearchError::Status {
            status,
            body: body.into(),
        }
    }

    /// True when the backend reported 404 for the addressed resource
    pub fn is_not_found(&self) -> bool {
        matches!(self, SearchError::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::InvalidResponse(err.to_string())
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidConfiguration(msg) => AppError::Configuration(msg),
            SearchError::Timeout(msg) => AppError::Timeout(msg),
            SearchError::Http(e) => AppError::Network(e.to_string()),
            SearchError::Status { status, .. } if status == StatusCode::NOT_FOUND => {
                AppError::NotFound(err.to_string())
            }
            _ => AppError::Internal(err.to_string()),
        }
    }
}
