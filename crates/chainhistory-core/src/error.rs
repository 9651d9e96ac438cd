//! Error types for chain traversal.

use thiserror::Error;

use crate::hash::{Hash, ParseHashError};
use crate::types::Position;

/// Errors reported by a [`BlockSource`](crate::BlockSource).
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, non-2xx status, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON-RPC protocol-level error returned by the node.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The requested chain, block or entry does not exist.
    #[error("{what} not found")]
    NotFound { what: String },

    /// Request timed out after the configured duration.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// The node answered, but the response does not have the expected shape.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Response could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Returns `true` if this error is transient and a retry may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors produced while normalizing a raw record.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid hex in field '{field}': {source}")]
    InvalidHex {
        field: String,
        #[source]
        source: hex::FromHexError,
    },

    #[error("invalid hash in field '{field}': {source}")]
    InvalidHash {
        field: String,
        #[source]
        source: ParseHashError,
    },
}

/// Why a chain was rejected as malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("block already visited (cycle in back-links)")]
    Cycle,

    #[error("walk exceeded the maximum depth of {max} blocks")]
    DepthExceeded { max: usize },

    #[error("oldest block has no records")]
    NoRecords,
}

/// Errors returned by history reads.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The chain exists but no block containing it has been confirmed yet.
    #[error("chain {chain_id} exists but is not yet included in a confirmed block")]
    ChainPending { chain_id: Hash },

    #[error("malformed chain ({at}): {reason}")]
    MalformedChain { at: Position, reason: MalformedReason },

    #[error("transport failure ({at}): {source}")]
    Transport {
        at: Position,
        #[source]
        source: TransportError,
    },

    #[error("failed to decode entry {record} ({at}): {source}")]
    Decode {
        at: Position,
        record: Hash,
        #[source]
        source: DecodeError,
    },

    #[error("traversal cancelled ({at})")]
    Cancelled { at: Position },
}

impl HistoryError {
    pub fn transport(at: Position, source: TransportError) -> Self {
        Self::Transport { at, source }
    }

    /// Returns `true` for the expected "not yet confirmed" condition.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::ChainPending { .. })
    }

    /// Returns `true` if the data source served a broken chain.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedChain { .. })
    }

    /// Position in the walk where the error happened, if any.
    pub fn position(&self) -> Option<&Position> {
        match self {
            Self::ChainPending { .. } => None,
            Self::MalformedChain { at, .. }
            | Self::Transport { at, .. }
            | Self::Decode { at, .. }
            | Self::Cancelled { at } => Some(at),
        }
    }
}
