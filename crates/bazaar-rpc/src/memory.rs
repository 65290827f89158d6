//! In-process broker for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::broker::Broker;
use crate::error::{Result, RpcError};

const TOPIC_CAPACITY: usize = 1024;

struct Topic {
    sender: mpsc::Sender<Vec<u8>>,
    receiver: Option<mpsc::Receiver<Vec<u8>>>,
}

impl Topic {
    fn new() -> Self {
        let (sender, receiver) = mpsc::channel(TOPIC_CAPACITY);
        Self {
            sender,
            receiver: Some(receiver),
        }
    }
}

/// A broker whose topics are bounded in-process queues.
///
/// Payloads published before a topic is consumed are buffered. Each topic
/// accepts a single consumer.
#[derive(Default)]
pub struct MemoryBroker {
    topics: Mutex<HashMap<String, Topic>>,
    unreachable: AtomicBool,
    published: AtomicUsize,
}

impl MemoryBroker {
    /// Create a broker with no topics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate losing the connection to the broker.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Number of payloads published so far.
    #[must_use]
    pub fn published(&self) -> usize {
        self.published.load(Ordering::SeqCst)
    }

    fn check_reachable(&self) -> Result<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(RpcError::Broker("broker unreachable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Broker for MemoryBroker {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()> {
        self.check_reachable()?;
        let sender = self
            .topics
            .lock()
            .entry(topic.to_string())
            .or_insert_with(Topic::new)
            .sender
            .clone();

        sender
            .send(payload)
            .await
            .map_err(|_| RpcError::Broker(format!("topic {topic} is closed")))?;
        self.published.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn consume(&self, topic: &str) -> Result<mpsc::Receiver<Vec<u8>>> {
        self.check_reachable()?;
        self.topics
            .lock()
            .entry(topic.to_string())
            .or_insert_with(Topic::new)
            .receiver
            .take()
            .ok_or_else(|| RpcError::Broker(format!("topic {topic} already has a consumer")))
    }
}
