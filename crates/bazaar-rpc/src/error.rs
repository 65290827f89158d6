//! Error types for the RPC client.

use std::time::Duration;

use thiserror::Error;

/// A result type using `RpcError`.
pub type Result<T> = std::result::Result<T, RpcError>;

/// Errors that can occur while performing a remote call.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The endpoint name was empty.
    #[error("endpoint name must not be empty")]
    EmptyEndpoint,

    /// The endpoint is not in the shared registry.
    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),

    /// The broker could not be reached or rejected the operation.
    #[error("broker error: {0}")]
    Broker(String),

    /// No reply arrived within the timeout window.
    #[error("call to {endpoint} timed out after {}ms", timeout.as_millis())]
    Timeout {
        /// The endpoint that was called.
        endpoint: String,
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The reply stream is gone; no reply can arrive any more.
    #[error("reply channel disconnected")]
    Disconnected,

    /// An envelope could not be encoded or decoded.
    #[error("envelope codec error: {0}")]
    Codec(String),

    /// The backend answered with an error.
    #[error("{0}")]
    Remote(String),
}

impl RpcError {
    /// Returns `true` if the call timed out.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<redis::RedisError> for RpcError {
    fn from(err: redis::RedisError) -> Self {
        Self::Broker(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_endpoint() {
        let err = RpcError::Timeout {
            endpoint: "users.create".into(),
            timeout: Duration::from_millis(1500),
        };
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "call to users.create timed out after 1500ms");
    }

    #[test]
    fn remote_error_is_passed_through() {
        let err = RpcError::Remote("User with that username already exist".into());
        assert_eq!(err.to_string(), "User with that username already exist");
        assert!(!err.is_timeout());
    }
}
