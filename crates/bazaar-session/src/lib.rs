//! Expiring session-token store for bazaar.
//!
//! A session maps an opaque bearer token to the subject that logged in. Entries
//! live for a fixed time-to-live and are never refreshed on read.
//!
//! # Implementations
//!
//! - [`RedisSessionStore`]: production backend, `SET NX PX` / `GET` / `DEL`
//! - `MemorySessionStore`: in-process map driven by the tokio clock, available
//!   under the `test-utils` feature
//!
//! Tokens are stored under the blake3 digest of their value (see
//! [`SessionToken::storage_key`]), so the store never holds a usable credential.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use bazaar_core::SubjectId;
//! use bazaar_session::{RedisSessionStore, SessionStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RedisSessionStore::connect("redis://127.0.0.1:6379").await?;
//!
//! let subject = SubjectId::new("42")?;
//! let token = store.issue(&subject, Duration::from_secs(300)).await?;
//! assert_eq!(store.resolve(&token).await?, subject);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod redis_store;

use std::time::Duration;

use async_trait::async_trait;
use bazaar_core::{SessionToken, SubjectId};

pub use error::{Result, SessionError};
#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemorySessionStore;
pub use redis_store::RedisSessionStore;

/// Reference session lifetime.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(5 * 60);

/// How many fresh tokens `issue` tries before giving up on a key collision.
pub(crate) const MAX_ISSUE_ATTEMPTS: usize = 3;

/// Shortest TTL a store accepts. Redis expiry has millisecond resolution.
pub const MIN_SESSION_TTL: Duration = Duration::from_millis(1);

/// The session store trait.
///
/// Implementations must be safe to share across all in-flight requests.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Issue a new token for `subject`, valid for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTtl` for a TTL below [`MIN_SESSION_TTL`] and
    /// `SessionError::Unavailable` if the backing store cannot be reached.
    async fn issue(&self, subject: &SubjectId, ttl: Duration) -> Result<SessionToken>;

    /// Resolve a token to the subject it was issued for.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFound` if the token is unknown or expired.
    async fn resolve(&self, token: &SessionToken) -> Result<SubjectId>;

    /// Revoke a token before its expiry.
    ///
    /// Returns `true` if a live session was removed.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Unavailable` if the backing store cannot be reached.
    async fn revoke(&self, token: &SessionToken) -> Result<bool>;
}

pub(crate) fn validate_ttl(ttl: Duration) -> Result<()> {
    if ttl < MIN_SESSION_TTL {
        return Err(SessionError::InvalidTtl);
    }
    Ok(())
}
