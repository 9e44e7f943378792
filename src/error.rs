//! Error types for mail-assist.

use reqwest::StatusCode;

/// Top-level error type for the session.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the mail, blob download, and generation endpoints.
///
/// Benign no-data conditions (a message without content, a generation
/// response without text) are placeholder strings, never a `ServiceError`.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{service} request failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} service returned HTTP {status}")]
    Status {
        service: &'static str,
        status: StatusCode,
    },

    #[error("malformed {service} response: {reason}")]
    Malformed {
        service: &'static str,
        reason: String,
    },
}

/// Result type alias for the session.
pub type Result<T> = std::result::Result<T, Error>;
