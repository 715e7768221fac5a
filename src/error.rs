//! Error types for greenie-core

use std::collections::HashMap;
use thiserror::Error;

/// Result type for greenie-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Validation errors returned by the backend for a rejected write: a map of
/// field names to the list of messages for that field.
pub type Errors = HashMap<String, Vec<String>>;

/// Errors that can occur when using greenie-core
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input to a pure operation; prior state is left unchanged
    #[error("Validation error: {0}")]
    Validation(String),

    /// A wire payload could not be parsed into a typed record
    #[error("Decode error: {0}")]
    Decode(String),

    /// Unexpected HTTP status from the backend
    #[error("Invalid HTTP response: {status}")]
    Http { status: u16 },

    /// Transport-level failure (connection refused, timeout, TLS)
    #[error("Network error: {0}")]
    Network(String),

    /// Configuration file or environment problem
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Error::Http {
                status: status.as_u16(),
            },
            None => Error::Network(err.to_string()),
        }
    }
}
