//! Bazaar gateway binary.
//!
//! Configuration is read from the environment; see [`GatewayConfig::from_env`].
//! The broker and the session store share one Redis deployment.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bazaar_gateway::{create_router, GatewayConfig, GatewayState};
use bazaar_rpc::{BrokerRpcClient, RedisBroker, RedisBrokerConfig, RpcConfig};
use bazaar_session::RedisSessionStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,bazaar=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Bazaar Gateway");

    let config = GatewayConfig::from_env()?;
    tracing::info!(
        listen_addr = %config.listen_addr,
        session_ttl_seconds = config.session_ttl_seconds,
        rpc_timeout_seconds = config.rpc_timeout_seconds,
        max_body_bytes = config.max_body_bytes,
        "Gateway configuration loaded"
    );

    let broker = Arc::new(RedisBroker::connect(RedisBrokerConfig::new(&config.redis_url)).await?);
    let rpc_config = RpcConfig::with_timeout(config.rpc_timeout()).registered_only();
    let rpc = BrokerRpcClient::connect(broker, rpc_config).await?;
    tracing::info!(reply_topic = %rpc.reply_topic(), "RPC client ready");

    let sessions = RedisSessionStore::connect(&config.redis_url).await?;

    let listen_addr = config.listen_addr.clone();
    let state = GatewayState::new(Arc::new(rpc), Arc::new(sessions), config);
    let app = create_router(state);

    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
