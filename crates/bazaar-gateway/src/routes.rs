//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use bazaar_rpc::RpcClient;
use bazaar_session::SessionStore;

use crate::handlers::{health, orders, products, users};
use crate::state::GatewayState;

/// Create the gateway router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `POST /register` - Create an account
/// - `POST /login` - Exchange credentials for a session token
/// - `GET /products` - List products
/// - `POST /products` - Create a product
///
/// ## Authenticated
/// - `GET /profile` - The caller's account
/// - `POST /logout` - Revoke the caller's token
/// - `GET /orders` - The caller's orders
/// - `POST /orders` - Place an order
pub fn create_router<R, S>(state: GatewayState<R, S>) -> Router
where
    R: RpcClient + 'static,
    S: SessionStore + 'static,
{
    let cors = build_cors_layer(&state.config.cors_origins);
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout = state.config.request_timeout();

    let state = Arc::new(state);

    Router::new()
        .route("/health", get(health::health))
        // Accounts
        .route("/register", post(users::register::<R, S>))
        .route("/login", post(users::login::<R, S>))
        .route("/profile", get(users::profile::<R, S>))
        .route("/logout", post(users::logout::<R, S>))
        // Catalogue
        .route(
            "/products",
            get(products::list_products::<R, S>).post(products::create_product::<R, S>),
        )
        // Orders
        .route(
            "/orders",
            get(orders::list_orders::<R, S>).post(orders::create_order::<R, S>),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring unparsable CORS origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
