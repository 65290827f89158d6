//! HTTP gateway for the bazaar backend services.
//!
//! The gateway owns no business data. It:
//!
//! - authenticates callers with expiring bearer session tokens
//! - validates and relays JSON requests as synchronous RPC calls over the
//!   message broker
//! - translates replies and failures into HTTP responses
//!
//! # Architecture
//!
//! ```text
//!        HTTP clients
//!             │
//!             ▼
//! ┌────────────────────────────────────┐
//! │           bazaar-gateway           │
//! │  AuthUser ─▶ ApiJson ─▶ handlers   │
//! └────────────────────────────────────┘
//!        │                    │
//!        ▼                    ▼
//! ┌──────────────┐   ┌─────────────────┐      ┌────────────────────┐
//! │ SessionStore │   │ BrokerRpcClient │ ◀──▶ │ users / products / │
//! │   (Redis)    │   │  (Redis lists)  │      │  orders services   │
//! └──────────────┘   └─────────────────┘      └────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use bazaar_gateway::{create_router, GatewayConfig, GatewayState};
//! use bazaar_rpc::{BrokerRpcClient, RedisBroker, RedisBrokerConfig, RpcConfig};
//! use bazaar_session::RedisSessionStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GatewayConfig::from_env()?;
//!
//! let broker = Arc::new(RedisBroker::connect(RedisBrokerConfig::new(&config.redis_url)).await?);
//! let rpc = BrokerRpcClient::connect(broker, RpcConfig::with_timeout(config.rpc_timeout())).await?;
//! let sessions = RedisSessionStore::connect(&config.redis_url).await?;
//!
//! let listen_addr = config.listen_addr.clone();
//! let app = create_router(GatewayState::new(Arc::new(rpc), Arc::new(sessions), config));
//!
//! let listener = tokio::net::TcpListener::bind(listen_addr).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

pub use auth::AuthUser;
pub use config::{ConfigError, GatewayConfig};
pub use error::ApiError;
pub use extract::ApiJson;
pub use routes::create_router;
pub use state::GatewayState;
