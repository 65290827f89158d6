//! Correlation table for in-flight calls.
//!
//! Each outstanding call owns one entry keyed by its correlation ID. The entry
//! holds the single-fire sender half of a oneshot channel:
//!
//! ```text
//! call()                       reply pump
//!   │ register(id) ──insert──▶ ┌────────────────┐
//!   │                          │ PendingCalls   │ ◀──remove(id)── resolve(reply)
//!   │ await receiver           └────────────────┘                     │
//!   │ ◀───────────────────────── oneshot::Sender::send ───────────────┘
//!   ▼
//! PendingGuard dropped ──remove(id)──▶ (no-op if already resolved)
//! ```
//!
//! Removal happens under the lock before the sender fires, so an entry is
//! resolved at most once and a late reply finds nothing to resolve.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bazaar_core::CorrelationId;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::envelope::ReplyEnvelope;

struct PendingCall {
    endpoint: String,
    deadline: Instant,
    sender: oneshot::Sender<ReplyEnvelope>,
}

/// Concurrency-safe table of calls awaiting a reply.
#[derive(Default)]
pub struct PendingCalls {
    calls: Mutex<HashMap<CorrelationId, PendingCall>>,
}

impl PendingCalls {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a call and return its cleanup guard and reply receiver.
    ///
    /// The entry is removed when the guard is dropped, whatever the outcome.
    #[must_use]
    pub fn register(
        self: &Arc<Self>,
        correlation_id: CorrelationId,
        endpoint: &str,
        timeout: Duration,
    ) -> (PendingGuard, oneshot::Receiver<ReplyEnvelope>) {
        let (sender, receiver) = oneshot::channel();
        let call = PendingCall {
            endpoint: endpoint.to_string(),
            deadline: Instant::now() + timeout,
            sender,
        };
        self.calls.lock().insert(correlation_id, call);

        let guard = PendingGuard {
            calls: Arc::clone(self),
            correlation_id,
        };
        (guard, receiver)
    }

    /// Deliver a reply to the call with the matching correlation ID.
    ///
    /// Returns `false` if no such call is pending.
    pub fn resolve(&self, reply: ReplyEnvelope) -> bool {
        let Some(call) = self.calls.lock().remove(&reply.correlation_id) else {
            return false;
        };

        let correlation_id = reply.correlation_id;
        let late = Instant::now() > call.deadline;
        if call.sender.send(reply).is_err() {
            tracing::debug!(
                correlation_id = %correlation_id,
                endpoint = %call.endpoint,
                late,
                "Caller went away before its reply arrived"
            );
        }
        true
    }

    /// Remove a call without resolving it.
    pub fn remove(&self, correlation_id: &CorrelationId) -> bool {
        self.calls.lock().remove(correlation_id).is_some()
    }

    /// Drop every pending call; their callers observe a disconnect.
    ///
    /// Returns the number of calls dropped.
    pub fn clear(&self) -> usize {
        let mut calls = self.calls.lock();
        let count = calls.len();
        calls.clear();
        count
    }

    /// Check if a call is pending.
    #[must_use]
    pub fn contains(&self, correlation_id: &CorrelationId) -> bool {
        self.calls.lock().contains_key(correlation_id)
    }

    /// Number of pending calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    /// Check if no call is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }
}

/// Removes its call from the table when dropped.
///
/// Dropping covers every exit from `call`: reply, timeout, publish failure
/// and cancellation of the calling future.
pub struct PendingGuard {
    calls: Arc<PendingCalls>,
    correlation_id: CorrelationId,
}

impl PendingGuard {
    /// The correlation ID this guard cleans up.
    #[must_use]
    pub const fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.calls.remove(&self.correlation_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn resolve_delivers_once() {
        let calls = Arc::new(PendingCalls::new());
        let id = CorrelationId::generate();
        let (_guard, receiver) = calls.register(id, "users.create", TIMEOUT);

        assert!(calls.resolve(ReplyEnvelope::ok(id, b"first".to_vec())));
        assert!(!calls.resolve(ReplyEnvelope::ok(id, b"second".to_vec())));

        let reply = receiver.await.unwrap();
        assert_eq!(reply.body, b"first");
        assert!(calls.is_empty());
    }

    #[test]
    fn unknown_correlation_id_is_ignored() {
        let calls = Arc::new(PendingCalls::new());
        let (_guard, _receiver) = calls.register(CorrelationId::generate(), "a", TIMEOUT);

        assert!(!calls.resolve(ReplyEnvelope::ok(CorrelationId::generate(), vec![])));
        assert_eq!(calls.len(), 1);
    }

    #[test]
    fn guard_drop_removes_entry() {
        let calls = Arc::new(PendingCalls::new());
        let id = CorrelationId::generate();
        let (guard, _receiver) = calls.register(id, "orders.list", TIMEOUT);

        assert!(calls.contains(&id));
        assert_eq!(guard.correlation_id(), id);
        drop(guard);
        assert!(!calls.contains(&id));
    }

    #[tokio::test]
    async fn clear_disconnects_waiters() {
        let calls = Arc::new(PendingCalls::new());
        let (_g1, r1) = calls.register(CorrelationId::generate(), "a", TIMEOUT);
        let (_g2, r2) = calls.register(CorrelationId::generate(), "b", TIMEOUT);

        assert_eq!(calls.clear(), 2);
        assert!(r1.await.is_err());
        assert!(r2.await.is_err());
    }

    #[test]
    fn resolve_after_receiver_dropped_still_removes() {
        let calls = Arc::new(PendingCalls::new());
        let id = CorrelationId::generate();
        let (_guard, receiver) = calls.register(id, "a", TIMEOUT);
        drop(receiver);

        assert!(calls.resolve(ReplyEnvelope::ok(id, vec![])));
        assert!(calls.is_empty());
    }
}
