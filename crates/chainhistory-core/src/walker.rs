//! Backward block walk: from a head KeyMR down to the sentinel.
//!
//! Each step's target is only known once the previous block has been read,
//! so the walk keeps exactly one block fetch outstanding. It is an explicit
//! loop over a [`WalkCursor`]; stack depth stays constant on long chains.

use std::collections::HashSet;
use std::sync::Arc;

use futures::Stream;
use tokio_util::sync::CancellationToken;

use crate::cancel::until_cancelled;
use crate::error::{HistoryError, MalformedReason};
use crate::hash::Hash;
use crate::source::BlockSource;
use crate::types::{Block, Position};

/// The walk's position: the next block to fetch and how many were visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkCursor {
    /// KeyMR of the next block to fetch; the sentinel once the walk is complete.
    pub next: Hash,
    /// Number of blocks already yielded.
    pub depth: usize,
}

impl WalkCursor {
    pub fn new(start: Hash) -> Self {
        Self { next: start, depth: 0 }
    }

    /// Move past the block just yielded.
    pub fn advance(&mut self, prev_keymr: Hash) {
        self.next = prev_keymr;
        self.depth += 1;
    }

    /// Returns `true` once the cursor reached the chain origin.
    pub fn is_done(&self) -> bool {
        self.next.is_null()
    }
}

/// Starts backward walks against a [`BlockSource`].
pub struct BlockWalker<S: ?Sized> {
    source: Arc<S>,
    max_depth: usize,
}

impl<S: BlockSource + ?Sized> BlockWalker<S> {
    /// `max_depth` bounds the number of blocks a single walk may visit.
    pub fn new(source: Arc<S>, max_depth: usize) -> Self {
        Self { source, max_depth }
    }

    /// Begin a walk at `start`. Nothing is fetched until the walk is polled.
    pub fn walk(&self, start: Hash) -> BlockWalk<S> {
        BlockWalk {
            source: Arc::clone(&self.source),
            cursor: WalkCursor::new(start),
            visited: HashSet::new(),
            max_depth: self.max_depth,
            origin: Position::default(),
            cancel: CancellationToken::new(),
            finished: false,
        }
    }
}

/// A single, non-restartable backward walk yielding blocks newest first.
pub struct BlockWalk<S: ?Sized> {
    source: Arc<S>,
    cursor: WalkCursor,
    visited: HashSet<Hash>,
    max_depth: usize,
    origin: Position,
    cancel: CancellationToken,
    finished: bool,
}

impl<S: BlockSource + ?Sized> BlockWalk<S> {
    /// Tag errors from this walk with `chain_id`.
    pub fn for_chain(mut self, chain_id: Hash) -> Self {
        self.origin.chain_id = Some(chain_id);
        self
    }

    /// Abort at the next block fetch once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cursor(&self) -> WalkCursor {
        self.cursor
    }

    /// Fetch the next (older) block, or `None` once the sentinel is reached.
    ///
    /// After an error the walk is finished and keeps returning `Ok(None)`.
    pub async fn next_block(&mut self) -> Result<Option<Block>, HistoryError> {
        if self.finished || self.cursor.is_done() {
            self.finished = true;
            return Ok(None);
        }

        let keymr = self.cursor.next;
        let at = self.origin.at_block(keymr, self.cursor.depth);

        if self.cursor.depth >= self.max_depth {
            self.finished = true;
            return Err(HistoryError::MalformedChain {
                at,
                reason: MalformedReason::DepthExceeded { max: self.max_depth },
            });
        }
        if !self.visited.insert(keymr) {
            self.finished = true;
            tracing::warn!(block = %keymr, depth = self.cursor.depth, "cycle in chain back-links");
            return Err(HistoryError::MalformedChain { at, reason: MalformedReason::Cycle });
        }

        let source = &self.source;
        let fetched = until_cancelled(&self.cancel, at, async {
            source
                .block(&keymr)
                .await
                .map_err(|e| HistoryError::transport(at, e))
        })
        .await;

        let block = match fetched {
            Ok(block) => block,
            Err(e) => {
                self.finished = true;
                return Err(e);
            }
        };

        tracing::debug!(
            block = %keymr,
            prev = %block.prev_keymr,
            depth = self.cursor.depth,
            entries = block.entries.len(),
            "visited block"
        );

        self.cursor.advance(block.prev_keymr);
        Ok(Some(block))
    }

    /// Adapt the walk into a `Stream` of blocks.
    pub fn into_stream(self) -> impl Stream<Item = Result<Block, HistoryError>> {
        futures::stream::try_unfold(self, |mut walk| async move {
            let next = walk.next_block().await?;
            Ok::<_, HistoryError>(next.map(|block| (block, walk)))
        })
    }
}
