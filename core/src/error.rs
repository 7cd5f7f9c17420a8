//! Error types for the HTTP client surface.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server returned an unexpected
//! status." All other non-2xx responses land in `Http` with the raw status
//! code and body for debugging.
//!
//! A `Query` never sees these variants directly: it stores the `Display`
//! output as its error message.

use thiserror::Error;

/// Errors returned by `ApiClient`, `HttpFetcher` and `ClientConfig`.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned an unexpected status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The host failed to execute the request at all.
    #[error("transport failed: {0}")]
    Transport(String),

    #[error("invalid client config: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_human_readable() {
        assert_eq!(ApiError::NotFound.to_string(), "resource not found");
        let err = ApiError::Http {
            status: 503,
            body: "maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503: maintenance");
        assert_eq!(
            ApiError::Transport("connection refused".to_string()).to_string(),
            "transport failed: connection refused"
        );
    }
}
