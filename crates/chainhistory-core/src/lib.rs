//! chainhistory-core: chain traversal and history reconstruction.
//!
//! # Overview
//!
//! An entry chain is stored as immutable blocks, each pointing at its
//! predecessor, with a mutable head pointer at the newest block. This crate
//! rebuilds a chain's full history in append order from that head:
//!
//! - [`ChainHeadResolver`]: resolve and classify the head
//! - [`BlockWalker`]: walk back-links down to [`NULL_HASH`]
//! - [`BlockEntryFetcher`]: fetch one block's entries concurrently
//! - [`OrderingReconciler`]: restore chronological order in one pass
//! - [`ChainReader`]: the public facade tying them together
//!
//! Nodes are reached through the [`BlockSource`] trait; [`memory::MemorySource`]
//! is an in-memory implementation.

mod cancel;

pub mod codec;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod hash;
pub mod memory;
pub mod reader;
pub mod reconciler;
pub mod resolver;
pub mod source;
pub mod types;
pub mod walker;

pub use codec::decode_record;
pub use config::ReaderConfig;
pub use error::{DecodeError, HistoryError, MalformedReason, TransportError};
pub use fetcher::BlockEntryFetcher;
pub use hash::{Hash, ParseHashError, NULL_HASH};
pub use reader::ChainReader;
pub use reconciler::OrderingReconciler;
pub use resolver::ChainHeadResolver;
pub use source::BlockSource;
pub use types::{Block, BlockRecords, ChainHead, ChainHeadState, Position, RawRecord, Record};
pub use walker::{BlockWalk, BlockWalker, WalkCursor};

pub use tokio_util::sync::CancellationToken;
