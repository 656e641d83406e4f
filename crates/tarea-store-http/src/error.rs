//! Error types for the REST backend.

use thiserror::Error;

/// Errors that can occur during `HttpStore` operations.
#[derive(Error, Debug)]
pub enum HttpStoreError {
    /// Base URL or a derived resource URL is unusable.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Request never produced a response (DNS, connect, TLS, timeout).
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The service refused the credentials (401/403).
    #[error("Not authorized (HTTP {status})")]
    Unauthorized {
        /// Returned status code.
        status: u16,
    },

    /// The addressed resource does not exist (404).
    #[error("Resource not found: {url}")]
    NotFound {
        /// Requested URL.
        url: String,
    },

    /// The service rejected the payload (400/422).
    #[error("Request rejected (HTTP {status}): {body}")]
    Rejected {
        /// Returned status code.
        status: u16,
        /// Response body, usually field errors.
        body: String,
    },

    /// Any other non-success status.
    #[error("Unexpected HTTP {status}: {body}")]
    UnexpectedStatus {
        /// Returned status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// A request body could not be encoded before sending.
    #[error("Failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    /// Response body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Result alias for REST backend operations.
pub type Result<T> = std::result::Result<T, HttpStoreError>;
