//! Order endpoints.
//!
//! Orders always belong to the authenticated caller: the gateway overwrites
//! any `user_id` supplied by the client.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use bazaar_core::{endpoints, Order};
use bazaar_rpc::RpcClient;
use bazaar_session::SessionStore;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::handlers::dispatch;
use crate::state::GatewayState;

/// Payload for `orders.list`.
#[derive(Debug, Serialize)]
struct OrdersOf<'a> {
    user_id: &'a str,
}

/// Place an order for the caller.
///
/// # Errors
///
/// Returns 400 without a product, 401 without a live session.
pub async fn create_order<R, S>(
    State(state): State<Arc<GatewayState<R, S>>>,
    user: AuthUser,
    ApiJson(mut order): ApiJson<Order>,
) -> Result<impl IntoResponse, ApiError>
where
    R: RpcClient + 'static,
    S: SessionStore + 'static,
{
    if order.product_id.is_empty() {
        return Err(ApiError::BadRequest("product_id is required".to_string()));
    }
    order.user_id = user.subject().to_string();

    let created: Order = dispatch(state.rpc.as_ref(), endpoints::ORDERS_CREATE, &order).await?;
    tracing::info!(order_id = %created.id, user_id = %order.user_id, "Created order");

    Ok((StatusCode::CREATED, Json(created)))
}

/// List the caller's orders.
///
/// # Errors
///
/// Returns 401 without a live session, 500 if the orders backend fails.
pub async fn list_orders<R, S>(
    State(state): State<Arc<GatewayState<R, S>>>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError>
where
    R: RpcClient + 'static,
    S: SessionStore + 'static,
{
    let query = OrdersOf {
        user_id: user.subject().as_str(),
    };
    let orders: Vec<Order> = dispatch(state.rpc.as_ref(), endpoints::ORDERS_LIST, &query).await?;

    Ok(Json(orders))
}
