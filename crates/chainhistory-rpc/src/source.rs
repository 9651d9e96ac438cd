//! `BlockSource` over the factomd v2 JSON-RPC API.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::json;

use chainhistory_core::{Block, BlockSource, ChainHead, Hash, RawRecord, TransportError};

use crate::client::HttpRpcClient;
use crate::config::RpcSourceConfig;
use crate::transport::RpcTransport;
use crate::wire::{ChainHeadResponse, EntryBlockResponse};

/// factomd: requested block or entry does not exist.
pub const CODE_NOT_FOUND: i64 = -32008;
/// factomd: the chain has no head.
pub const CODE_MISSING_CHAIN_HEAD: i64 = -32009;

/// Reads chain heads, entry blocks and entries from a factomd node.
pub struct FactomdSource<T> {
    transport: T,
    next_id: AtomicU64,
}

impl FactomdSource<HttpRpcClient> {
    /// Connect over HTTP using `config`.
    pub fn http(config: RpcSourceConfig) -> Result<Self, TransportError> {
        Ok(Self::new(HttpRpcClient::new(config)?))
    }
}

impl<T: RpcTransport> FactomdSource<T> {
    pub fn new(transport: T) -> Self {
        Self { transport, next_id: AtomicU64::new(0) }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn call<R: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
        what: impl FnOnce() -> String,
    ) -> Result<R, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.transport
            .call(id, method, params)
            .await
            .map_err(|e| not_found_as(e, what))
    }
}

/// Turn factomd's "not found" error codes into [`TransportError::NotFound`].
fn not_found_as(err: TransportError, what: impl FnOnce() -> String) -> TransportError {
    match err {
        TransportError::Rpc { code, .. }
            if code == CODE_NOT_FOUND || code == CODE_MISSING_CHAIN_HEAD =>
        {
            TransportError::NotFound { what: what() }
        }
        other => other,
    }
}

#[async_trait]
impl<T: RpcTransport> BlockSource for FactomdSource<T> {
    async fn chain_head(&self, chain_id: &Hash) -> Result<ChainHead, TransportError> {
        let resp: ChainHeadResponse = self
            .call("chain-head", json!({ "chainid": chain_id.to_hex() }), || {
                format!("chain {chain_id}")
            })
            .await?;
        resp.into_chain_head()
    }

    async fn block(&self, keymr: &Hash) -> Result<Block, TransportError> {
        let resp: EntryBlockResponse = self
            .call("entry-block", json!({ "keymr": keymr.to_hex() }), || {
                format!("entry block {keymr}")
            })
            .await?;
        resp.into_block(*keymr)
    }

    async fn record(&self, hash: &Hash) -> Result<RawRecord, TransportError> {
        self.call("entry", json!({ "hash": hash.to_hex() }), || format!("entry {hash}"))
            .await
    }

    fn name(&self) -> &str {
        self.transport.url()
    }
}
