//! HTTP request handlers.
//!
//! Handlers validate what they must, relay the payload to the owning backend
//! endpoint and translate the reply.

pub mod health;
pub mod orders;
pub mod products;
pub mod users;

use serde::de::DeserializeOwned;
use serde::Serialize;

use bazaar_rpc::RpcClient;

use crate::error::ApiError;

/// Encode a backend request body.
pub(crate) fn encode<T: Serialize>(request: &T) -> Result<Vec<u8>, ApiError> {
    serde_json::to_vec(request)
        .map_err(|e| ApiError::Internal(format!("failed to encode request: {e}")))
}

/// Decode a backend reply body.
pub(crate) fn decode<T: DeserializeOwned>(endpoint: &str, reply: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(reply).map_err(|e| {
        tracing::error!(endpoint = %endpoint, error = %e, "Undecodable backend reply");
        ApiError::Internal(format!("invalid reply from {endpoint}"))
    })
}

/// Call `endpoint` with a JSON-encoded request and decode the JSON reply.
pub(crate) async fn dispatch<R, Req, Resp>(
    rpc: &R,
    endpoint: &str,
    request: &Req,
) -> Result<Resp, ApiError>
where
    R: RpcClient + ?Sized,
    Req: Serialize + Sync,
    Resp: DeserializeOwned,
{
    let reply = rpc.call(endpoint, encode(request)?).await?;
    decode(endpoint, &reply)
}
