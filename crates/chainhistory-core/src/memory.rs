//! In-memory block source: for tests and offline fixtures.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::hash::{Hash, NULL_HASH};
use crate::source::BlockSource;
use crate::types::{Block, ChainHead, RawRecord};

/// A [`BlockSource`] backed by hash maps.
///
/// Supports injected per-entry latency and failures so concurrency and
/// error paths can be exercised without a node.
#[derive(Default)]
pub struct MemorySource {
    heads: HashMap<Hash, ChainHead>,
    blocks: HashMap<Hash, Block>,
    records: HashMap<Hash, RawRecord>,
    delays: HashMap<Hash, Duration>,
    failing: HashSet<Hash>,
    next_id: u64,
    block_reads: AtomicUsize,
    record_reads: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_head(&mut self, chain_id: Hash, head: ChainHead) {
        self.heads.insert(chain_id, head);
    }

    pub fn insert_block(&mut self, block: Block) {
        self.blocks.insert(block.keymr, block);
    }

    pub fn insert_record(&mut self, hash: Hash, record: RawRecord) {
        self.records.insert(hash, record);
    }

    /// Append a new block holding `records` to `chain_id` and move the head to it.
    ///
    /// Returns the new block's KeyMR. Identifiers are synthetic but unique.
    pub fn append_block(&mut self, chain_id: Hash, records: Vec<RawRecord>) -> Hash {
        let (prev_keymr, sequence) = match self.heads.get(&chain_id).and_then(|h| h.head) {
            Some(prev) => {
                let seq = self.blocks.get(&prev).map(|b| b.sequence + 1).unwrap_or(0);
                (prev, seq)
            }
            None => (NULL_HASH, 0),
        };

        let entries = records
            .into_iter()
            .map(|record| {
                let hash = self.fresh_id(0xe0);
                self.records.insert(hash, record);
                hash
            })
            .collect();

        let keymr = self.fresh_id(0xb0);
        self.insert_block(Block { keymr, prev_keymr, chain_id, sequence, entries });
        self.insert_head(chain_id, ChainHead::settled(keymr));
        keymr
    }

    /// Delay every read of entry `hash` by `delay`.
    pub fn delay_record(&mut self, hash: Hash, delay: Duration) {
        self.delays.insert(hash, delay);
    }

    /// Make every read of entry `hash` fail with an HTTP error.
    pub fn fail_record(&mut self, hash: Hash) {
        self.failing.insert(hash);
    }

    pub fn block_mut(&mut self, keymr: &Hash) -> Option<&mut Block> {
        self.blocks.get_mut(keymr)
    }

    pub fn get_block(&self, keymr: &Hash) -> Option<&Block> {
        self.blocks.get(keymr)
    }

    /// Number of `block` calls served so far.
    pub fn block_reads(&self) -> usize {
        self.block_reads.load(Ordering::Relaxed)
    }

    /// Number of `record` calls served so far.
    pub fn record_reads(&self) -> usize {
        self.record_reads.load(Ordering::Relaxed)
    }

    fn fresh_id(&mut self, tag: u8) -> Hash {
        self.next_id += 1;
        let mut bytes = [0u8; 32];
        bytes[0] = tag;
        bytes[24..].copy_from_slice(&self.next_id.to_be_bytes());
        Hash::new(bytes)
    }
}

#[async_trait]
impl BlockSource for MemorySource {
    async fn chain_head(&self, chain_id: &Hash) -> Result<ChainHead, TransportError> {
        self.heads
            .get(chain_id)
            .copied()
            .ok_or_else(|| TransportError::NotFound { what: format!("chain {chain_id}") })
    }

    async fn block(&self, keymr: &Hash) -> Result<Block, TransportError> {
        self.block_reads.fetch_add(1, Ordering::Relaxed);
        self.blocks
            .get(keymr)
            .cloned()
            .ok_or_else(|| TransportError::NotFound { what: format!("block {keymr}") })
    }

    async fn record(&self, hash: &Hash) -> Result<RawRecord, TransportError> {
        self.record_reads.fetch_add(1, Ordering::Relaxed);
        if let Some(delay) = self.delays.get(hash) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(hash) {
            return Err(TransportError::Http(format!("injected failure for entry {hash}")));
        }
        self.records
            .get(hash)
            .cloned()
            .ok_or_else(|| TransportError::NotFound { what: format!("entry {hash}") })
    }

    fn name(&self) -> &str {
        "memory"
    }
}
