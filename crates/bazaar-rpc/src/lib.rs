//! Synchronous request/response calls over an asynchronous message broker.
//!
//! Callers see a plain `call(endpoint, body) -> reply` contract. Underneath,
//! every request is tagged with a fresh [`CorrelationId`](bazaar_core::CorrelationId)
//! and the reply topic of the calling client; backends echo the ID so the
//! reply can be routed back to the one call waiting for it.
//!
//! # Components
//!
//! - [`Broker`]: publish/consume transport, implemented by [`RedisBroker`]
//! - [`BrokerRpcClient`]: the [`RpcClient`] implementation, with its
//!   correlation table in [`PendingCalls`]
//! - [`RpcServer`]: the responder side, used by backend services
//! - `MemoryBroker`: in-process broker under the `test-utils` feature
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use bazaar_rpc::{BrokerRpcClient, RedisBroker, RedisBrokerConfig, RpcClient, RpcConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let broker = Arc::new(RedisBroker::connect(RedisBrokerConfig::new("redis://127.0.0.1:6379")).await?);
//! let client = BrokerRpcClient::connect(broker, RpcConfig::default()).await?;
//!
//! let products = client.call("products.list", b"{}".to_vec()).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod broker;
pub mod client;
pub mod envelope;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod pending;
pub mod redis_broker;
pub mod server;

use std::time::Duration;

use async_trait::async_trait;

pub use broker::Broker;
pub use client::{BrokerRpcClient, RpcConfig};
pub use envelope::{ReplyEnvelope, RequestEnvelope};
pub use error::{Result, RpcError};
#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryBroker;
pub use pending::{PendingCalls, PendingGuard};
pub use redis_broker::{RedisBroker, RedisBrokerConfig};
pub use server::RpcServer;

/// The RPC client trait.
///
/// Implementations must support any number of concurrent calls from
/// different tasks.
#[async_trait]
pub trait RpcClient: Send + Sync {
    /// Timeout used by [`call`](Self::call).
    fn default_timeout(&self) -> Duration;

    /// Call `endpoint` with the default timeout.
    ///
    /// # Errors
    ///
    /// See [`call_with_timeout`](Self::call_with_timeout).
    async fn call(&self, endpoint: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        self.call_with_timeout(endpoint, body, self.default_timeout())
            .await
    }

    /// Publish a request to `endpoint` and wait for its correlated reply.
    ///
    /// # Errors
    ///
    /// Returns `RpcError::EmptyEndpoint` for an empty endpoint name,
    /// `RpcError::Broker` if the request cannot be published,
    /// `RpcError::Timeout` if no reply arrives within `timeout`, and
    /// `RpcError::Remote` if the backend answered with an error.
    async fn call_with_timeout(
        &self,
        endpoint: &str,
        body: Vec<u8>,
        timeout: Duration,
    ) -> Result<Vec<u8>>;
}
