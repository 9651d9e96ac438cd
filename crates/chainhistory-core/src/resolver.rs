//! Chain head resolution.

use std::sync::Arc;

use crate::error::{HistoryError, TransportError};
use crate::hash::Hash;
use crate::source::BlockSource;
use crate::types::{ChainHead, ChainHeadState, Position};

/// Looks up the current head of a chain and classifies it.
pub struct ChainHeadResolver<S: ?Sized> {
    source: Arc<S>,
}

impl<S: BlockSource + ?Sized> ChainHeadResolver<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Fetch the head of `chain_id`. Only fails if the source does.
    pub async fn resolve(&self, chain_id: &Hash) -> Result<ChainHead, HistoryError> {
        let head = self
            .source
            .chain_head(chain_id)
            .await
            .map_err(|e| HistoryError::transport(Position::chain(*chain_id), e))?;
        tracing::debug!(
            chain = %chain_id,
            state = %head.state(),
            source = self.source.name(),
            "resolved chain head"
        );
        Ok(head)
    }

    /// Fetch the head of `chain_id` and require that it points at a confirmed block.
    pub async fn resolve_confirmed(&self, chain_id: &Hash) -> Result<Hash, HistoryError> {
        let head = self.resolve(chain_id).await?;
        match (head.state(), head.head) {
            (ChainHeadState::Settled, Some(keymr)) => Ok(keymr),
            (ChainHeadState::Pending, _) => Err(HistoryError::ChainPending { chain_id: *chain_id }),
            _ => Err(HistoryError::transport(
                Position::chain(*chain_id),
                TransportError::NotFound { what: format!("chain {chain_id}") },
            )),
        }
    }
}
