//! API error handling
//!
//! Typed errors for the Notion document-store interface. Transport and
//! decode failures carry enough context to identify the failing endpoint.

use thiserror::Error;

/// Errors that can occur talking to the document store
#[derive(Error, Debug)]
pub enum ApiError {
    /// Network-level failure (connect, timeout, TLS)
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status from the API
    #[error("API returned {status} for {endpoint}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    /// Response body could not be decoded
    #[error("Failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for document-store operations
pub type ApiResult<T> = Result<T, ApiError>;
