//! Redis-backed session store.

use std::time::Duration;

use async_trait::async_trait;
use bazaar_core::{SessionToken, SubjectId};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::error::{Result, SessionError};
use crate::{validate_ttl, SessionStore, MAX_ISSUE_ATTEMPTS};

/// Session store backed by Redis key expiry.
///
/// Holds a single [`ConnectionManager`], which reconnects on its own and is
/// cheap to clone per command.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
}

impl RedisSessionStore {
    /// Connect to Redis.
    ///
    /// Supports both `redis://` and `rediss://` URLs.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Unavailable` if the URL is invalid or the server
    /// cannot be reached.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        tracing::info!("Connected session store to Redis");
        Ok(Self { conn })
    }

    /// Store a session under the first token from `next_token` whose key is
    /// free, giving up after `MAX_ISSUE_ATTEMPTS` collisions.
    async fn issue_with<F>(
        &self,
        subject: &SubjectId,
        ttl: Duration,
        mut next_token: F,
    ) -> Result<SessionToken>
    where
        F: FnMut() -> SessionToken + Send,
    {
        validate_ttl(ttl)?;
        let ttl_millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        let mut conn = self.conn.clone();

        for _ in 0..MAX_ISSUE_ATTEMPTS {
            let token = next_token();
            // NX: never overwrite a live session that happens to share the key.
            let stored: Option<String> = redis::cmd("SET")
                .arg(token.storage_key())
                .arg(subject.as_str())
                .arg("NX")
                .arg("PX")
                .arg(ttl_millis)
                .query_async(&mut conn)
                .await?;

            if stored.is_some() {
                tracing::info!(subject = %subject, ttl_ms = ttl_millis, "Issued session");
                return Ok(token);
            }
            tracing::warn!(subject = %subject, "Session key collision, regenerating token");
        }

        Err(SessionError::Internal(
            "could not allocate a unique session token".to_string(),
        ))
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn issue(&self, subject: &SubjectId, ttl: Duration) -> Result<SessionToken> {
        self.issue_with(subject, ttl, SessionToken::generate).await
    }

    async fn resolve(&self, token: &SessionToken) -> Result<SubjectId> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(token.storage_key()).await?;

        match value {
            Some(subject) => SubjectId::new(subject).map_err(|_| {
                tracing::warn!("Session entry holds an empty subject");
                SessionError::NotFound
            }),
            None => Err(SessionError::NotFound),
        }
    }

    async fn revoke(&self, token: &SessionToken) -> Result<bool> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(token.storage_key()).await?;
        if removed > 0 {
            tracing::info!("Revoked session");
        }
        Ok(removed > 0)
    }
}
