//! Per-block entry fetcher.
//!
//! Entry fetches for one block run concurrently (bounded by
//! `fetch_concurrency`) and are reassembled in the block's declared order.
//! A block is resolved completely or not at all.

use std::sync::Arc;

use futures::{stream, StreamExt, TryStreamExt};
use tokio_util::sync::CancellationToken;

use crate::cancel::until_cancelled;
use crate::codec::decode_record;
use crate::error::HistoryError;
use crate::hash::Hash;
use crate::source::BlockSource;
use crate::types::{Block, BlockRecords, Position, Record};

pub struct BlockEntryFetcher<S: ?Sized> {
    source: Arc<S>,
    concurrency: usize,
}

impl<S: BlockSource + ?Sized> BlockEntryFetcher<S> {
    pub fn new(source: Arc<S>, concurrency: usize) -> Self {
        Self { source, concurrency: concurrency.max(1) }
    }

    /// Fetch and decode every entry of `block`, in block order.
    pub async fn fetch_block_records(
        &self,
        block: &Block,
        at: Position,
        cancel: &CancellationToken,
    ) -> Result<BlockRecords, HistoryError> {
        let fetches = stream::iter(block.entries.iter())
            .map(|hash| self.fetch_record(hash, at))
            .buffered(self.concurrency)
            .try_collect::<Vec<_>>();

        let records = until_cancelled(cancel, at, fetches).await?;

        tracing::debug!(
            block = %block.keymr,
            records = records.len(),
            "fetched block entries"
        );

        Ok(BlockRecords { records, prev_keymr: block.prev_keymr })
    }

    /// Fetch only the first entry of `block`.
    pub async fn fetch_first_record(
        &self,
        block: &Block,
        at: Position,
        cancel: &CancellationToken,
    ) -> Result<Option<Record>, HistoryError> {
        let Some(first) = block.entries.first() else {
            return Ok(None);
        };
        until_cancelled(cancel, at, self.fetch_record(first, at))
            .await
            .map(Some)
    }

    /// Fetch and decode a single entry.
    pub async fn fetch_record(&self, hash: &Hash, at: Position) -> Result<Record, HistoryError> {
        let raw = self
            .source
            .record(hash)
            .await
            .map_err(|e| HistoryError::transport(at, e))?;
        decode_record(&raw).map_err(|source| HistoryError::Decode { at, record: *hash, source })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::memory::MemorySource;
    use crate::types::RawRecord;

    fn chain() -> Hash {
        Hash::new([0x33; 32])
    }

    fn raw(content: &str) -> RawRecord {
        RawRecord::encode(&chain(), &[], content.as_bytes())
    }

    fn contents(records: &[Record]) -> Vec<String> {
        records.iter().map(|r| r.content_lossy()).collect()
    }

    #[tokio::test]
    async fn reassembles_in_declared_order() {
        let mut src = MemorySource::new();
        let keymr = src.append_block(chain(), vec![raw("a"), raw("b"), raw("c"), raw("d")]);
        let block = src.get_block(&keymr).unwrap().clone();
        // Earlier entries finish last.
        src.delay_record(block.entries[0], Duration::from_millis(60));
        src.delay_record(block.entries[1], Duration::from_millis(40));
        src.delay_record(block.entries[2], Duration::from_millis(20));

        let fetcher = BlockEntryFetcher::new(Arc::new(src), 4);
        let out = fetcher
            .fetch_block_records(&block, Position::chain(chain()), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(contents(&out.records), vec!["a", "b", "c", "d"]);
        assert_eq!(out.prev_keymr, block.prev_keymr);
    }

    #[tokio::test]
    async fn one_failed_entry_fails_the_block() {
        let mut src = MemorySource::new();
        let keymr = src.append_block(chain(), vec![raw("a"), raw("b"), raw("c")]);
        let block = src.get_block(&keymr).unwrap().clone();
        src.fail_record(block.entries[1]);

        let fetcher = BlockEntryFetcher::new(Arc::new(src), 2);
        let err = fetcher
            .fetch_block_records(&block, Position::default(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, HistoryError::Transport { .. }));
    }

    #[tokio::test]
    async fn undecodable_entry_names_the_entry() {
        let mut src = MemorySource::new();
        let keymr = src.append_block(chain(), vec![]);
        let bad = Hash::new([0xee; 32]);
        src.insert_record(
            bad,
            RawRecord { chain_id: chain().to_hex(), ext_ids: vec!["xyz".into()], content: String::new() },
        );
        src.block_mut(&keymr).unwrap().entries.push(bad);
        let block = src.get_block(&keymr).unwrap().clone();

        let fetcher = BlockEntryFetcher::new(Arc::new(src), 2);
        let err = fetcher
            .fetch_block_records(&block, Position::default(), &CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            HistoryError::Decode { record, .. } => assert_eq!(record, bad),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn first_record_only_reads_one_entry() {
        let mut src = MemorySource::new();
        let keymr = src.append_block(chain(), vec![raw("first"), raw("second")]);
        let block = src.get_block(&keymr).unwrap().clone();
        let src = Arc::new(src);

        let fetcher = BlockEntryFetcher::new(Arc::clone(&src), 8);
        let first = fetcher
            .fetch_first_record(&block, Position::default(), &CancellationToken::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.content, b"first");
        assert_eq!(src.record_reads(), 1);
    }

    #[tokio::test]
    async fn cancellation_aborts_in_flight_fetches() {
        let mut src = MemorySource::new();
        let keymr = src.append_block(chain(), vec![raw("slow")]);
        let block = src.get_block(&keymr).unwrap().clone();
        src.delay_record(block.entries[0], Duration::from_secs(30));

        let fetcher = BlockEntryFetcher::new(Arc::new(src), 1);
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let err = fetcher
            .fetch_block_records(&block, Position::default(), &token)
            .await
            .unwrap_err();
        assert!(matches!(err, HistoryError::Cancelled { .. }));
    }
}
