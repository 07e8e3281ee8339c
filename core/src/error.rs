//! Error types for the TickTick API client.
//!
//! # Design
//! The remote service has two failure surfaces: the token endpoint and the
//! task/project endpoints. Each gets its own variant so callers can tell a
//! credential problem from a rejected domain call. Neither variant carries the
//! response body.

use thiserror::Error;

/// Errors returned by `TickTickClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The token endpoint answered with a non-2xx status.
    #[error("authentication failed: {status_text}")]
    Authentication { status_text: String },

    /// A task or project endpoint answered with a non-2xx status.
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The transport failed before any response arrived.
    #[error("transport failed: {0}")]
    Transport(String),
}

impl ApiError {
    /// Status code of a rejected domain call, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_exposes_status() {
        let err = ApiError::Http { status: 404 };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "HTTP error! status: 404");
    }

    #[test]
    fn authentication_error_carries_status_text() {
        let err = ApiError::Authentication {
            status_text: "Unauthorized".to_string(),
        };
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "authentication failed: Unauthorized");
    }
}
