//! Error types for the session store.

use thiserror::Error;

/// A result type using `SessionError`.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The token is unknown or has expired.
    #[error("session not found")]
    NotFound,

    /// A session must live for at least one millisecond.
    #[error("session TTL must be at least one millisecond")]
    InvalidTtl,

    /// The backing store could not be reached or rejected the command.
    #[error("session store unavailable: {0}")]
    Unavailable(String),

    /// No unique token could be allocated.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SessionError {
    /// Returns `true` for infrastructure failures, as opposed to an invalid token.
    #[must_use]
    pub const fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Internal(_))
    }
}

impl From<redis::RedisError> for SessionError {
    fn from(err: redis::RedisError) -> Self {
        Self::Unavailable(err.to_string())
    }
}
