//! Wire envelopes exchanged over the broker.
//!
//! Envelopes are CBOR-encoded. The body is opaque to this layer.

use bazaar_core::CorrelationId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RpcError};

/// A request published to an endpoint topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Identifier the backend must echo in its reply.
    pub correlation_id: CorrelationId,
    /// Topic the reply must be published to.
    pub reply_to: String,
    /// Logical endpoint being called.
    pub endpoint: String,
    /// Serialized request payload.
    pub body: Vec<u8>,
}

/// A reply published by a backend to the caller's reply topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyEnvelope {
    /// Identifier copied from the request.
    pub correlation_id: CorrelationId,
    /// Serialized response payload.
    #[serde(default)]
    pub body: Vec<u8>,
    /// Set when the backend failed to handle the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReplyEnvelope {
    /// A successful reply.
    #[must_use]
    pub fn ok(correlation_id: CorrelationId, body: Vec<u8>) -> Self {
        Self {
            correlation_id,
            body,
            error: None,
        }
    }

    /// A failed reply carrying the backend's error message.
    #[must_use]
    pub fn failed(correlation_id: CorrelationId, message: impl Into<String>) -> Self {
        Self {
            correlation_id,
            body: Vec::new(),
            error: Some(message.into()),
        }
    }

    /// Convert into the caller-facing result.
    ///
    /// # Errors
    ///
    /// Returns `RpcError::Remote` if the backend reported an error.
    pub fn into_result(self) -> Result<Vec<u8>> {
        match self.error {
            Some(message) => Err(RpcError::Remote(message)),
            None => Ok(self.body),
        }
    }
}

/// Serialize an envelope using CBOR.
///
/// # Errors
///
/// Returns `RpcError::Codec` if serialization fails.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| RpcError::Codec(e.to_string()))?;
    Ok(buf)
}

/// Deserialize an envelope from CBOR.
///
/// # Errors
///
/// Returns `RpcError::Codec` if the bytes are not a valid envelope.
pub fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T> {
    ciborium::from_reader(data).map_err(|e| RpcError::Codec(e.to_string()))
}
