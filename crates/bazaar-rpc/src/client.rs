//! Broker-backed RPC client.
//!
//! Presents a blocking call/response contract on top of a publish/consume
//! broker. Every client owns a private reply topic; a background pump drains
//! it and hands each reply to the call waiting on its correlation ID.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bazaar_core::{endpoints, CorrelationId};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::broker::Broker;
use crate::envelope::{self, ReplyEnvelope, RequestEnvelope};
use crate::error::{Result, RpcError};
use crate::pending::PendingCalls;
use crate::RpcClient;

/// Configuration for a [`BrokerRpcClient`].
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Timeout applied by [`RpcClient::call`].
    pub default_timeout: Duration,
    /// Prefix of the per-client reply topic; a random suffix is appended.
    pub reply_topic_prefix: String,
    /// Refuse endpoints missing from [`bazaar_core::endpoints::ALL`].
    pub registered_only: bool,
}

impl RpcConfig {
    /// Create a configuration with a custom default timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            default_timeout: timeout,
            ..Self::default()
        }
    }

    /// Only allow calls to endpoints in the shared registry.
    #[must_use]
    pub fn registered_only(mut self) -> Self {
        self.registered_only = true;
        self
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(30),
            reply_topic_prefix: "reply.".to_string(),
            registered_only: false,
        }
    }
}

/// RPC client correlating requests and replies over a [`Broker`].
pub struct BrokerRpcClient<B: Broker> {
    broker: Arc<B>,
    pending: Arc<PendingCalls>,
    reply_topic: String,
    config: RpcConfig,
    pump: JoinHandle<()>,
}

impl<B: Broker> BrokerRpcClient<B> {
    /// Subscribe to a fresh reply topic and start the reply pump.
    ///
    /// # Errors
    ///
    /// Returns `RpcError::Broker` if the reply topic cannot be consumed.
    pub async fn connect(broker: Arc<B>, config: RpcConfig) -> Result<Self> {
        let reply_topic = format!("{}{}", config.reply_topic_prefix, uuid::Uuid::new_v4());
        let replies = broker.consume(&reply_topic).await?;

        let pending = Arc::new(PendingCalls::new());
        let pump = tokio::spawn(pump_replies(replies, Arc::clone(&pending)));

        tracing::info!(
            reply_topic = %reply_topic,
            default_timeout_ms = config.default_timeout.as_millis(),
            "RPC client connected"
        );

        Ok(Self {
            broker,
            pending,
            reply_topic,
            config,
            pump,
        })
    }

    /// The correlation table, for inspection.
    #[must_use]
    pub fn pending(&self) -> &PendingCalls {
        &self.pending
    }

    /// The topic this client receives replies on.
    #[must_use]
    pub fn reply_topic(&self) -> &str {
        &self.reply_topic
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &RpcConfig {
        &self.config
    }
}

impl<B: Broker> Drop for BrokerRpcClient<B> {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

#[async_trait]
impl<B: Broker> RpcClient for BrokerRpcClient<B> {
    fn default_timeout(&self) -> Duration {
        self.config.default_timeout
    }

    async fn call_with_timeout(
        &self,
        endpoint: &str,
        body: Vec<u8>,
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        if endpoint.is_empty() {
            return Err(RpcError::EmptyEndpoint);
        }
        if self.config.registered_only && !endpoints::is_known(endpoint) {
            tracing::error!(endpoint = %endpoint, "Refusing call to unregistered endpoint");
            return Err(RpcError::UnknownEndpoint(endpoint.to_string()));
        }
        if self.pump.is_finished() {
            return Err(RpcError::Disconnected);
        }

        let correlation_id = CorrelationId::generate();
        // Register before publishing so a fast reply always finds its entry.
        let (_guard, reply) = self.pending.register(correlation_id, endpoint, timeout);

        let request = RequestEnvelope {
            correlation_id,
            reply_to: self.reply_topic.clone(),
            endpoint: endpoint.to_string(),
            body,
        };
        self.broker
            .publish(endpoint, envelope::encode(&request)?)
            .await?;

        tracing::debug!(
            correlation_id = %correlation_id,
            endpoint = %endpoint,
            "Published RPC request"
        );

        match tokio::time::timeout(timeout, reply).await {
            Ok(Ok(reply)) => reply.into_result(),
            Ok(Err(_)) => Err(RpcError::Disconnected),
            Err(_) => {
                tracing::warn!(
                    correlation_id = %correlation_id,
                    endpoint = %endpoint,
                    timeout_ms = timeout.as_millis(),
                    "RPC call timed out"
                );
                Err(RpcError::Timeout {
                    endpoint: endpoint.to_string(),
                    timeout,
                })
            }
        }
    }
}

/// Drain the reply topic into the correlation table.
async fn pump_replies(mut replies: mpsc::Receiver<Vec<u8>>, pending: Arc<PendingCalls>) {
    while let Some(raw) = replies.recv().await {
        let reply: ReplyEnvelope = match envelope::decode(&raw) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, bytes = raw.len(), "Dropping malformed reply");
                continue;
            }
        };

        let correlation_id = reply.correlation_id;
        if !pending.resolve(reply) {
            tracing::warn!(
                correlation_id = %correlation_id,
                "Dropping reply for unknown or expired call"
            );
        }
    }

    let abandoned = pending.clear();
    tracing::error!(abandoned, "Reply stream closed");
}
