//! Responder side of the RPC protocol.
//!
//! Backend services use [`RpcServer`] to answer calls on an endpoint topic.
//! Each request is handled on its own task, so replies may be published in a
//! different order than requests arrived.

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::broker::Broker;
use crate::envelope::{self, ReplyEnvelope, RequestEnvelope};
use crate::error::Result;

/// Serves endpoints over a [`Broker`].
pub struct RpcServer<B: Broker> {
    broker: Arc<B>,
}

impl<B: Broker> RpcServer<B> {
    /// Create a server publishing replies through `broker`.
    #[must_use]
    pub fn new(broker: Arc<B>) -> Self {
        Self { broker }
    }

    /// Answer calls to `endpoint` with `handler`.
    ///
    /// The handler receives the request body and returns either the reply
    /// body or an error message relayed to the caller. The returned task runs
    /// until the endpoint topic closes or it is aborted.
    ///
    /// # Errors
    ///
    /// Returns `RpcError::Broker` if the endpoint topic cannot be consumed.
    pub async fn serve<F, Fut>(&self, endpoint: &str, handler: F) -> Result<JoinHandle<()>>
    where
        F: Fn(Vec<u8>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Vec<u8>, String>> + Send + 'static,
    {
        let mut requests = self.broker.consume(endpoint).await?;
        let broker = Arc::clone(&self.broker);
        let handler = Arc::new(handler);
        let endpoint = endpoint.to_string();

        tracing::info!(endpoint = %endpoint, "Serving RPC endpoint");

        Ok(tokio::spawn(async move {
            while let Some(raw) = requests.recv().await {
                let request: RequestEnvelope = match envelope::decode(&raw) {
                    Ok(request) => request,
                    Err(e) => {
                        tracing::warn!(endpoint = %endpoint, error = %e, "Dropping malformed request");
                        continue;
                    }
                };

                let broker = Arc::clone(&broker);
                let handler = Arc::clone(&handler);
                tokio::spawn(async move {
                    let RequestEnvelope {
                        correlation_id,
                        reply_to,
                        body,
                        ..
                    } = request;

                    let reply = match (*handler)(body).await {
                        Ok(body) => ReplyEnvelope::ok(correlation_id, body),
                        Err(message) => ReplyEnvelope::failed(correlation_id, message),
                    };

                    let published = match envelope::encode(&reply) {
                        Ok(bytes) => broker.publish(&reply_to, bytes).await,
                        Err(e) => Err(e),
                    };
                    if let Err(e) = published {
                        tracing::warn!(
                            correlation_id = %correlation_id,
                            reply_to = %reply_to,
                            error = %e,
                            "Failed to publish reply"
                        );
                    }
                });
            }
        }))
    }
}
