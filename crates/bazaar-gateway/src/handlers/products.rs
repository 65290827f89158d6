//! Catalogue endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use bazaar_core::{endpoints, Product};
use bazaar_rpc::RpcClient;
use bazaar_session::SessionStore;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::handlers::dispatch;
use crate::state::GatewayState;

/// Message returned when a product has no name.
pub const MISSING_NAME: &str = "Please write name";

/// Create a product.
///
/// # Errors
///
/// Returns 400 if the name is blank; backend failures become 500.
pub async fn create_product<R, S>(
    State(state): State<Arc<GatewayState<R, S>>>,
    ApiJson(product): ApiJson<Product>,
) -> Result<impl IntoResponse, ApiError>
where
    R: RpcClient + 'static,
    S: SessionStore + 'static,
{
    if product.name.trim().is_empty() {
        return Err(ApiError::BadRequest(MISSING_NAME.to_string()));
    }

    let created: Product =
        dispatch(state.rpc.as_ref(), endpoints::PRODUCTS_CREATE, &product).await?;
    tracing::info!(product_id = %created.id, "Created product");

    Ok((StatusCode::CREATED, Json(created)))
}

/// List the catalogue.
///
/// # Errors
///
/// Returns 500 if the products backend fails.
pub async fn list_products<R, S>(
    State(state): State<Arc<GatewayState<R, S>>>,
) -> Result<impl IntoResponse, ApiError>
where
    R: RpcClient + 'static,
    S: SessionStore + 'static,
{
    let products: Vec<Product> =
        dispatch(state.rpc.as_ref(), endpoints::PRODUCTS_LIST, &json!({})).await?;

    Ok(Json(products))
}
