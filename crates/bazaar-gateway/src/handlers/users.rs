//! Account endpoints: registration, login, profile and logout.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use bazaar_core::{endpoints, Credentials, LoginResponse, SubjectId, User};
use bazaar_rpc::{RpcClient, RpcError};
use bazaar_session::SessionStore;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::handlers::{decode, dispatch, encode};
use crate::state::GatewayState;

/// Message returned when a username or password is missing.
pub const EMPTY_CREDENTIALS: &str = "Fields username or password is empty";

/// Message returned when a login lookup fails.
pub const INVALID_CREDENTIALS: &str = "invalid username or password";

/// Payload for `users.getById`.
#[derive(Debug, Serialize)]
struct UserLookup<'a> {
    id: &'a str,
}

/// Register a new user.
///
/// # Errors
///
/// Returns 400 if username or password is empty; backend failures become 500.
pub async fn register<R, S>(
    State(state): State<Arc<GatewayState<R, S>>>,
    ApiJson(user): ApiJson<User>,
) -> Result<impl IntoResponse, ApiError>
where
    R: RpcClient + 'static,
    S: SessionStore + 'static,
{
    if user.has_empty_credentials() {
        return Err(ApiError::BadRequest(EMPTY_CREDENTIALS.to_string()));
    }

    let created: User = dispatch(state.rpc.as_ref(), endpoints::USERS_CREATE, &user).await?;
    tracing::info!(user_id = %created.id, username = %created.username, "Registered user");

    Ok((StatusCode::CREATED, Json(created.redacted())))
}

/// Exchange credentials for a session token.
///
/// # Errors
///
/// Returns 400 for missing fields, 401 if the backend rejects the
/// credentials, and 500 if the backend or session store is unreachable.
pub async fn login<R, S>(
    State(state): State<Arc<GatewayState<R, S>>>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<impl IntoResponse, ApiError>
where
    R: RpcClient + 'static,
    S: SessionStore + 'static,
{
    if credentials.is_incomplete() {
        return Err(ApiError::BadRequest(EMPTY_CREDENTIALS.to_string()));
    }

    let request = encode(&credentials)?;
    let reply = match state
        .rpc
        .call(endpoints::USERS_GET_BY_CREDENTIALS, request)
        .await
    {
        Ok(reply) => reply,
        Err(RpcError::Remote(reason)) => {
            tracing::info!(username = %credentials.username, reason = %reason, "Login rejected");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
        Err(err) => return Err(err.into()),
    };
    let user: User = decode(endpoints::USERS_GET_BY_CREDENTIALS, &reply)?;

    let subject = SubjectId::new(user.id).map_err(|_| {
        tracing::error!(username = %credentials.username, "Users backend returned a user without id");
        ApiError::Unauthorized(INVALID_CREDENTIALS.to_string())
    })?;

    let token = state
        .sessions
        .issue(&subject, state.config.session_ttl())
        .await?;
    tracing::info!(subject = %subject, "Logged in");

    Ok(Json(LoginResponse {
        access_key: token.into(),
    }))
}

/// Return the authenticated user's profile.
///
/// # Errors
///
/// Returns 401 without a live session, 404 if the backend has no such user.
pub async fn profile<R, S>(
    State(state): State<Arc<GatewayState<R, S>>>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError>
where
    R: RpcClient + 'static,
    S: SessionStore + 'static,
{
    let lookup = UserLookup {
        id: user.subject().as_str(),
    };
    let profile: User = dispatch(state.rpc.as_ref(), endpoints::USERS_GET_BY_ID, &lookup).await?;

    if profile.id.is_empty() {
        return Err(ApiError::NotFound(format!("user {}", user.subject())));
    }

    Ok(Json(profile.redacted()))
}

/// Revoke the caller's session token.
///
/// # Errors
///
/// Returns 401 without a live session, 500 if the session store fails.
pub async fn logout<R, S>(
    State(state): State<Arc<GatewayState<R, S>>>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError>
where
    R: RpcClient + 'static,
    S: SessionStore + 'static,
{
    state.sessions.revoke(user.token()).await?;
    tracing::info!(subject = %user.subject(), "Logged out");

    Ok(StatusCode::NO_CONTENT)
}
