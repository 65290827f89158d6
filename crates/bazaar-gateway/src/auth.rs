//! Authentication extractor.
//!
//! This module provides the `AuthUser` extractor that resolves a bearer
//! session token to the subject it was issued for.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use bazaar_core::{SessionToken, SubjectId};
use bazaar_rpc::RpcClient;
use bazaar_session::{SessionError, SessionStore};

use crate::error::ApiError;
use crate::state::GatewayState;

/// An authenticated caller.
///
/// Only obtainable by extracting it from a request carrying a live
/// `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    subject: SubjectId,
    token: SessionToken,
}

impl AuthUser {
    /// The subject the session was issued for.
    #[must_use]
    pub const fn subject(&self) -> &SubjectId {
        &self.subject
    }

    /// The token the caller presented.
    #[must_use]
    pub const fn token(&self) -> &SessionToken {
        &self.token
    }
}

/// Extract the bearer token from request headers.
///
/// The scheme is matched case-insensitively.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<SessionToken> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    SessionToken::new(token.trim()).ok()
}

#[async_trait]
impl<R, S> FromRequestParts<Arc<GatewayState<R, S>>> for AuthUser
where
    R: RpcClient + 'static,
    S: SessionStore + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<GatewayState<R, S>>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(ApiError::unauthorized)?;

        let subject = match state.sessions.resolve(&token).await {
            Ok(subject) => subject,
            Err(SessionError::NotFound) => {
                tracing::debug!("Rejected unknown or expired session token");
                return Err(ApiError::unauthorized());
            }
            Err(err) => return Err(err.into()),
        };

        Ok(Self { subject, token })
    }
}
