//! The `RpcTransport` trait: anything that can carry a JSON-RPC request.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use chainhistory_core::TransportError;

use crate::request::{JsonRpcRequest, JsonRpcResponse};

/// An async JSON-RPC transport.
///
/// Implementations must be `Send + Sync`; a source issues concurrent calls
/// through a shared reference.
#[async_trait]
pub trait RpcTransport: Send + Sync + 'static {
    /// Send a single JSON-RPC request and return the response.
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError>;

    /// Return the transport's identifier (URL or name).
    fn url(&self) -> &str;

    /// Call `method` with named `params` and deserialize the result.
    ///
    /// JSON-RPC error objects become [`TransportError::Rpc`].
    async fn call<T: DeserializeOwned>(
        &self,
        id: u64,
        method: &str,
        params: Value,
    ) -> Result<T, TransportError>
    where
        Self: Sized,
    {
        let req = JsonRpcRequest::new(id, method, params);
        let resp = self.send(req).await?;
        let result = resp
            .into_result()
            .map_err(|e| TransportError::Rpc { code: e.code, message: e.message })?;
        serde_json::from_value(result).map_err(TransportError::Deserialization)
    }
}
