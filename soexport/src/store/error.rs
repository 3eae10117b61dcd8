//! Store error types.

use std::io;
use thiserror::Error;

/// Failures raised by a saved-objects store.
///
/// The export engine never retries; these surface to the caller unchanged.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from a remote store
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// I/O error while reading a local store
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed JSON in a local store
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Store is not reachable or not configured
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Request could not be signed
    #[error("Signing error: {0}")]
    Signing(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
