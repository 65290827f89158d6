//! Redis list-backed broker.
//!
//! Each topic maps to a Redis list under a common key prefix. Publishing is
//! an `LPUSH`; consuming is a `BRPOP` loop on a dedicated connection, so every
//! payload is delivered to exactly one consumer in FIFO order.
//!
//! A payload popped after the consumer's receiver was dropped is pushed back
//! onto the tail of the list, so the next consumer of the topic pops it first.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, MultiplexedConnection};
use redis::AsyncCommands;
use tokio::sync::mpsc;

use crate::broker::Broker;
use crate::error::Result;

/// Configuration for a [`RedisBroker`].
#[derive(Debug, Clone)]
pub struct RedisBrokerConfig {
    /// Redis connection URL.
    pub url: String,
    /// Prefix prepended to every topic to form the list key.
    pub key_prefix: String,
    /// How long a single `BRPOP` blocks before the loop checks for shutdown.
    pub poll_timeout: Duration,
    /// Delay before reconnecting after a consumer connection fails.
    pub reconnect_delay: Duration,
    /// Capacity of the channel handed to consumers.
    pub channel_capacity: usize,
}

impl RedisBrokerConfig {
    /// Create a configuration for the given URL with default settings.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

impl Default for RedisBrokerConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: "rpc:".to_string(),
            poll_timeout: Duration::from_secs(1),
            reconnect_delay: Duration::from_secs(1),
            channel_capacity: 1024,
        }
    }
}

/// Broker using Redis lists as work queues.
pub struct RedisBroker {
    client: redis::Client,
    publisher: ConnectionManager,
    config: RedisBrokerConfig,
}

impl RedisBroker {
    /// Connect to Redis.
    ///
    /// # Errors
    ///
    /// Returns `RpcError::Broker` if the URL is invalid or the server cannot
    /// be reached.
    pub async fn connect(config: RedisBrokerConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let publisher = ConnectionManager::new(client.clone()).await?;
        tracing::info!(key_prefix = %config.key_prefix, "Connected RPC broker to Redis");
        Ok(Self {
            client,
            publisher,
            config,
        })
    }

    fn key(&self, topic: &str) -> String {
        format!("{}{topic}", self.config.key_prefix)
    }
}

#[async_trait]
impl Broker for RedisBroker {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()> {
        let mut conn = self.publisher.clone();
        let _: i64 = conn.lpush(self.key(topic), payload).await?;
        Ok(())
    }

    async fn consume(&self, topic: &str) -> Result<mpsc::Receiver<Vec<u8>>> {
        let key = self.key(topic);
        // Fail fast if Redis is unreachable when the subscription is made.
        let conn = self.client.get_multiplexed_async_connection().await?;
        let (tx, rx) = mpsc::channel(self.config.channel_capacity);

        tokio::spawn(consume_loop(
            self.client.clone(),
            conn,
            key,
            tx,
            self.config.clone(),
        ));
        Ok(rx)
    }
}

/// Pop payloads off `key` until the receiving side is dropped.
async fn consume_loop(
    client: redis::Client,
    mut conn: MultiplexedConnection,
    key: String,
    tx: mpsc::Sender<Vec<u8>>,
    config: RedisBrokerConfig,
) {
    tracing::debug!(key = %key, "Starting consumer");

    while !tx.is_closed() {
        let popped: redis::RedisResult<Option<(String, Vec<u8>)>> = redis::cmd("BRPOP")
            .arg(&key)
            .arg(config.poll_timeout.as_secs_f64())
            .query_async(&mut conn)
            .await;

        match popped {
            Ok(Some((_, payload))) => {
                if let Err(mpsc::error::SendError(payload)) = tx.send(payload).await {
                    requeue(&mut conn, &key, payload).await;
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Consumer connection failed, reconnecting");
                tokio::time::sleep(config.reconnect_delay).await;
                match client.get_multiplexed_async_connection().await {
                    Ok(fresh) => conn = fresh,
                    Err(e) => tracing::warn!(key = %key, error = %e, "Reconnect failed"),
                }
            }
        }
    }

    tracing::debug!(key = %key, "Consumer stopped");
}

/// Return a popped payload to the end `BRPOP` reads from.
async fn requeue(conn: &mut MultiplexedConnection, key: &str, payload: Vec<u8>) {
    let bytes = payload.len();
    let pushed: redis::RedisResult<i64> = conn.rpush(key, payload).await;
    match pushed {
        Ok(_) => tracing::debug!(key = %key, bytes, "Requeued payload for closed consumer"),
        Err(e) => tracing::error!(key = %key, bytes, error = %e, "Lost payload for closed consumer"),
    }
}
