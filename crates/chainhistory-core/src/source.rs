//! The `BlockSource` trait: the remote node a traversal reads from.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::hash::Hash;
use crate::types::{Block, ChainHead, RawRecord};

/// Read access to a node holding entry chains.
///
/// Every call is a remote read; the source owns request-level timeouts and
/// reports them as [`TransportError::Timeout`]. Sources are treated as
/// side-effect free and infinitely re-readable.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` so record fetches can run concurrently.
#[async_trait]
pub trait BlockSource: Send + Sync {
    /// Current head of `chain_id`.
    async fn chain_head(&self, chain_id: &Hash) -> Result<ChainHead, TransportError>;

    /// The block identified by `keymr`.
    async fn block(&self, keymr: &Hash) -> Result<Block, TransportError>;

    /// The undecoded entry identified by `hash`.
    async fn record(&self, hash: &Hash) -> Result<RawRecord, TransportError>;

    /// Identifier of this source (URL or name), used in logs.
    fn name(&self) -> &str;
}

