//! In-memory session store.
//!
//! Expiry is measured on the tokio clock, so tests can pause and advance time
//! instead of sleeping.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bazaar_core::{SessionToken, SubjectId};
use parking_lot::RwLock;
use tokio::time::Instant;

use crate::error::{Result, SessionError};
use crate::{validate_ttl, SessionStore, MAX_ISSUE_ATTEMPTS};

#[derive(Debug, Clone)]
struct StoredSession {
    subject: SubjectId,
    expires_at: Instant,
}

impl StoredSession {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Session store holding entries in a process-local map.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, StoredSession>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Check if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Drop expired entries. Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, session| session.is_live(now));
        before - sessions.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn issue(&self, subject: &SubjectId, ttl: Duration) -> Result<SessionToken> {
        validate_ttl(ttl)?;
        let now = Instant::now();
        let stored = StoredSession {
            subject: subject.clone(),
            expires_at: now + ttl,
        };

        let mut sessions = self.sessions.write();
        for _ in 0..MAX_ISSUE_ATTEMPTS {
            let token = SessionToken::generate();
            match sessions.entry(token.storage_key()) {
                Entry::Vacant(slot) => {
                    slot.insert(stored);
                    return Ok(token);
                }
                Entry::Occupied(mut slot) if !slot.get().is_live(now) => {
                    slot.insert(stored);
                    return Ok(token);
                }
                Entry::Occupied(_) => {}
            }
        }

        Err(SessionError::Internal(
            "could not allocate a unique session token".to_string(),
        ))
    }

    async fn resolve(&self, token: &SessionToken) -> Result<SubjectId> {
        let now = Instant::now();
        self.sessions
            .read()
            .get(&token.storage_key())
            .filter(|session| session.is_live(now))
            .map(|session| session.subject.clone())
            .ok_or(SessionError::NotFound)
    }

    async fn revoke(&self, token: &SessionToken) -> Result<bool> {
        let now = Instant::now();
        let removed = self.sessions.write().remove(&token.storage_key());
        Ok(removed.is_some_and(|session| session.is_live(now)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_SESSION_TTL;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn subject(id: &str) -> SubjectId {
        SubjectId::new(id).unwrap()
    }

    #[tokio::test]
    async fn issue_then_resolve() {
        let store = MemorySessionStore::new();
        let token = store.issue(&subject("u1"), DEFAULT_SESSION_TTL).await.unwrap();

        assert_eq!(store.resolve(&token).await.unwrap(), subject("u1"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn unknown_token_not_found() {
        let store = MemorySessionStore::new();
        let token = SessionToken::new("nope").unwrap();

        assert!(matches!(
            store.resolve(&token).await,
            Err(SessionError::NotFound)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn token_expires_after_ttl() {
        let store = MemorySessionStore::new();
        let token = store.issue(&subject("u1"), DEFAULT_SESSION_TTL).await.unwrap();

        // t + 4:59
        tokio::time::advance(Duration::from_secs(4 * 60 + 59)).await;
        assert_eq!(store.resolve(&token).await.unwrap(), subject("u1"));

        // t + 5:01
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(matches!(
            store.resolve(&token).await,
            Err(SessionError::NotFound)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn resolve_does_not_extend_ttl() {
        let store = MemorySessionStore::new();
        let token = store
            .issue(&subject("u1"), Duration::from_secs(10))
            .await
            .unwrap();

        for _ in 0..9 {
            tokio::time::advance(Duration::from_secs(1)).await;
            store.resolve(&token).await.unwrap();
        }
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(store.resolve(&token).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn purge_drops_only_expired() {
        let store = MemorySessionStore::new();
        store
            .issue(&subject("short"), Duration::from_secs(1))
            .await
            .unwrap();
        let long = store
            .issue(&subject("long"), Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.resolve(&long).await.unwrap(), subject("long"));
    }

    #[tokio::test]
    async fn revoke_removes_session() {
        let store = MemorySessionStore::new();
        let token = store.issue(&subject("u1"), DEFAULT_SESSION_TTL).await.unwrap();

        assert!(store.revoke(&token).await.unwrap());
        assert!(!store.revoke(&token).await.unwrap());
        assert!(matches!(
            store.resolve(&token).await,
            Err(SessionError::NotFound)
        ));
    }

    #[tokio::test]
    async fn zero_ttl_rejected() {
        let store = MemorySessionStore::new();
        let result = store.issue(&subject("u1"), Duration::ZERO).await;
        assert!(matches!(result, Err(SessionError::InvalidTtl)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn sub_millisecond_ttl_rejected() {
        let store = MemorySessionStore::new();
        let result = store.issue(&subject("u1"), Duration::from_micros(500)).await;
        assert!(matches!(result, Err(SessionError::InvalidTtl)));
        assert!(store.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_issues_never_share_a_token() {
        let store = Arc::new(MemorySessionStore::new());

        let handles: Vec<_> = (0..200)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .issue(&subject(&format!("u{i}")), DEFAULT_SESSION_TTL)
                        .await
                        .unwrap()
                })
            })
            .collect();

        let tokens: Vec<SessionToken> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(std::result::Result::unwrap)
            .collect();

        let unique: HashSet<&str> = tokens.iter().map(SessionToken::as_str).collect();
        assert_eq!(unique.len(), 200);
        assert_eq!(store.len(), 200);

        for (i, token) in tokens.iter().enumerate() {
            assert_eq!(store.resolve(token).await.unwrap(), subject(&format!("u{i}")));
        }
    }
}
