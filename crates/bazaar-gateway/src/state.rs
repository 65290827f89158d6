//! Gateway application state.
//!
//! Shared handles are injected once at startup and cloned into every request.

use std::sync::Arc;

use bazaar_rpc::RpcClient;
use bazaar_session::SessionStore;

use crate::config::GatewayConfig;

/// Shared application state for the gateway.
pub struct GatewayState<R, S>
where
    R: RpcClient,
    S: SessionStore,
{
    /// Client used to reach backend services.
    pub rpc: Arc<R>,
    /// Store of issued session tokens.
    pub sessions: Arc<S>,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl<R, S> GatewayState<R, S>
where
    R: RpcClient,
    S: SessionStore,
{
    /// Create a new gateway state.
    #[must_use]
    pub fn new(rpc: Arc<R>, sessions: Arc<S>, config: GatewayConfig) -> Self {
        Self {
            rpc,
            sessions,
            config,
        }
    }
}

impl<R, S> Clone for GatewayState<R, S>
where
    R: RpcClient,
    S: SessionStore,
{
    fn clone(&self) -> Self {
        Self {
            rpc: Arc::clone(&self.rpc),
            sessions: Arc::clone(&self.sessions),
            config: self.config.clone(),
        }
    }
}
