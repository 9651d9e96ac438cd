//! 32-byte identifiers for chains, blocks and records.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Sentinel stored as the previous-block pointer of the oldest block in a chain.
pub const NULL_HASH: Hash = Hash([0u8; 32]);

/// A 32-byte content identifier (chain ID, block KeyMR, entry hash).
///
/// The text form is 64 lowercase hex characters with no prefix.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash([u8; 32]);

/// Errors produced when parsing a [`Hash`] from its hex form.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseHashError {
    #[error("expected 64 hex characters, got {0}")]
    InvalidLength(usize),

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

impl Hash {
    /// Length of a hash in bytes.
    pub const LEN: usize = 32;

    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns `true` if this is the chain-origin sentinel.
    pub fn is_null(&self) -> bool {
        *self == NULL_HASH
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for Hash {
    type Err = ParseHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != Self::LEN * 2 {
            return Err(ParseHashError::InvalidLength(s.len()));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}
