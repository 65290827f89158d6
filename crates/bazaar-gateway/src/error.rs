//! API error types and responses.
//!
//! Every failure leaves the gateway as `{ "message": ..., "status_code": ... }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use bazaar_rpc::RpcError;
use bazaar_session::SessionError;

/// API error type that implements `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request body or parameters.
    #[error("{0}")]
    BadRequest(String),

    /// Missing, unknown or expired credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// The requested resource was not found.
    #[error("{0}")]
    NotFound(String),

    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: String,
    status_code: u16,
}

impl ApiError {
    /// Unauthorized with the generic message.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::Unauthorized("unauthorized".to_string())
    }

    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            message: self.to_string(),
            status_code: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<RpcError> for ApiError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::EmptyEndpoint
            | RpcError::UnknownEndpoint(_)
            | RpcError::Codec(_)
            | RpcError::Disconnected => {
                tracing::error!(error = %err, "RPC client error");
            }
            RpcError::Broker(_) | RpcError::Timeout { .. } => {
                tracing::error!(error = %err, "Backend unreachable");
            }
            RpcError::Remote(_) => {
                tracing::warn!(error = %err, "Backend reported an error");
            }
        }
        Self::Internal(err.to_string())
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound => Self::unauthorized(),
            SessionError::InvalidTtl | SessionError::Unavailable(_) | SessionError::Internal(_) => {
                tracing::error!(error = %err, "Session store error");
                Self::Internal(err.to_string())
            }
        }
    }
}
