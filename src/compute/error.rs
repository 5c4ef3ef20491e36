//! Error types for the Compute client.

use thiserror::Error;

/// Errors raised while listing instances.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ComputeError {
    /// Raised when the configured endpoint is not a usable base URL.
    #[error("invalid compute endpoint {endpoint:?}: {message}")]
    Endpoint {
        /// Endpoint as configured.
        endpoint: String,
        /// Parser error message.
        message: String,
    },
    /// Raised when the request never produced a response.
    #[error("request to {url} failed: {message}")]
    Http {
        /// Endpoint that was called.
        url: String,
        /// Transport error reported by the HTTP client.
        message: String,
    },
    /// Raised when the API answers with a non-success status.
    #[error("compute API returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, usually a JSON error document.
        body: String,
    },
    /// Raised when the response body cannot be decoded.
    #[error("failed to decode instance list: {message}")]
    Decode {
        /// Decoder error message.
        message: String,
    },
}
