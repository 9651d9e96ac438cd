//! `ChainReader`: the public read surface.
//!
//! ```text
//! ChainHeadResolver → BlockWalker → BlockEntryFetcher (per block) → OrderingReconciler
//! ```

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::cancel::until_cancelled;
use crate::config::ReaderConfig;
use crate::error::{HistoryError, MalformedReason};
use crate::fetcher::BlockEntryFetcher;
use crate::hash::Hash;
use crate::reconciler::OrderingReconciler;
use crate::resolver::ChainHeadResolver;
use crate::source::BlockSource;
use crate::types::{Block, BlockRecords, ChainHead, Position, Record};
use crate::walker::BlockWalker;

/// Reconstructs chain history from a [`BlockSource`].
pub struct ChainReader<S: ?Sized> {
    source: Arc<S>,
    config: ReaderConfig,
    resolver: ChainHeadResolver<S>,
    walker: BlockWalker<S>,
    fetcher: BlockEntryFetcher<S>,
}

impl<S: BlockSource + ?Sized> ChainReader<S> {
    pub fn new(source: Arc<S>, config: ReaderConfig) -> Self {
        Self {
            resolver: ChainHeadResolver::new(Arc::clone(&source)),
            walker: BlockWalker::new(Arc::clone(&source), config.max_depth),
            fetcher: BlockEntryFetcher::new(Arc::clone(&source), config.fetch_concurrency),
            source,
            config,
        }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Current head of `chain_id`, including pending and empty heads.
    pub async fn chain_head(&self, chain_id: &Hash) -> Result<ChainHead, HistoryError> {
        self.resolver.resolve(chain_id).await
    }

    /// Every entry of `chain_id`, oldest first.
    pub async fn full_history(&self, chain_id: &Hash) -> Result<Vec<Record>, HistoryError> {
        self.full_history_with(chain_id, &CancellationToken::new()).await
    }

    /// [`full_history`](Self::full_history), aborting at the next fetch once `cancel` fires.
    pub async fn full_history_with(
        &self,
        chain_id: &Hash,
        cancel: &CancellationToken,
    ) -> Result<Vec<Record>, HistoryError> {
        let origin = Position::chain(*chain_id);
        let head = until_cancelled(cancel, origin, self.resolver.resolve_confirmed(chain_id)).await?;

        let mut walk = self
            .walker
            .walk(head)
            .for_chain(*chain_id)
            .with_cancellation(cancel.clone());
        let mut reconciler = OrderingReconciler::new();

        loop {
            let depth = walk.cursor().depth;
            let Some(block) = walk.next_block().await? else {
                break;
            };
            let at = origin.at_block(block.keymr, depth);
            let BlockRecords { records, .. } =
                self.fetcher.fetch_block_records(&block, at, cancel).await?;
            reconciler.push_block(records);
        }

        tracing::info!(
            chain = %chain_id,
            blocks = reconciler.blocks(),
            records = reconciler.len(),
            "reconstructed chain history"
        );
        Ok(reconciler.finish())
    }

    /// The first entry ever written to `chain_id`.
    ///
    /// Walks the whole chain: there is no forward index from the origin.
    pub async fn first_record(&self, chain_id: &Hash) -> Result<Record, HistoryError> {
        self.first_record_with(chain_id, &CancellationToken::new()).await
    }

    /// [`first_record`](Self::first_record), aborting at the next fetch once `cancel` fires.
    pub async fn first_record_with(
        &self,
        chain_id: &Hash,
        cancel: &CancellationToken,
    ) -> Result<Record, HistoryError> {
        let origin = Position::chain(*chain_id);
        let head = until_cancelled(cancel, origin, self.resolver.resolve_confirmed(chain_id)).await?;

        let mut walk = self
            .walker
            .walk(head)
            .for_chain(*chain_id)
            .with_cancellation(cancel.clone());
        let mut oldest: Option<(Block, usize)> = None;

        loop {
            let depth = walk.cursor().depth;
            match walk.next_block().await? {
                Some(block) => oldest = Some((block, depth)),
                None => break,
            }
        }

        let Some((block, depth)) = oldest else {
            return Err(HistoryError::MalformedChain {
                at: origin.at_block(head, 0),
                reason: MalformedReason::NoRecords,
            });
        };
        let at = origin.at_block(block.keymr, depth);

        tracing::debug!(chain = %chain_id, oldest = %block.keymr, blocks = depth + 1, "reached chain origin");

        self.fetcher
            .fetch_first_record(&block, at, cancel)
            .await?
            .ok_or(HistoryError::MalformedChain { at, reason: MalformedReason::NoRecords })
    }

    /// All entries of a single block, in block order.
    pub async fn block_records(&self, keymr: &Hash) -> Result<BlockRecords, HistoryError> {
        let at = Position::default().at_block(*keymr, 0);
        let block = self
            .source
            .block(keymr)
            .await
            .map_err(|e| HistoryError::transport(at, e))?;
        self.fetcher
            .fetch_block_records(&block, at, &CancellationToken::new())
            .await
    }

    /// A single entry by hash.
    pub async fn record(&self, hash: &Hash) -> Result<Record, HistoryError> {
        self.fetcher.fetch_record(hash, Position::default()).await
    }
}
