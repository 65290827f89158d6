//! Message broker abstraction.
//!
//! The RPC layer only needs two primitives from the broker: publish an opaque
//! payload to a named topic, and consume a topic as a stream of payloads. Each
//! topic behaves as a work queue: every payload is delivered to one consumer.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;

/// Trait for broker transports.
///
/// This trait abstracts the broker interface, allowing for in-memory
/// implementations in tests.
#[async_trait]
pub trait Broker: Send + Sync + 'static {
    /// Publish a payload to a topic.
    ///
    /// # Errors
    ///
    /// Returns `RpcError::Broker` if the broker cannot be reached.
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()>;

    /// Start consuming a topic.
    ///
    /// Payloads are delivered on the returned channel until it is dropped.
    ///
    /// # Errors
    ///
    /// Returns `RpcError::Broker` if the broker cannot be reached.
    async fn consume(&self, topic: &str) -> Result<mpsc::Receiver<Vec<u8>>>;
}
