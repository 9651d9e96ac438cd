//! Shared types for chain traversal.

use serde::{Deserialize, Deserializer, Serialize};

use crate::hash::Hash;

// ─── ChainHead ────────────────────────────────────────────────────────────────

/// The current head pointer of a chain, as reported by the node.
///
/// Produced fresh on every resolution; never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainHead {
    /// KeyMR of the newest confirmed block, `None` if no block is confirmed yet.
    pub head: Option<Hash>,
    /// `true` if the chain (or new entries in it) is waiting in the process list.
    pub in_process_list: bool,
}

/// Classification of a [`ChainHead`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainHeadState {
    /// At least one block is confirmed and can be walked.
    Settled,
    /// The chain exists but is not yet included in a confirmed block.
    Pending,
    /// The node knows nothing about the chain.
    Nonexistent,
}

impl ChainHead {
    pub fn settled(head: Hash) -> Self {
        Self { head: Some(head), in_process_list: false }
    }

    pub fn pending() -> Self {
        Self { head: None, in_process_list: true }
    }

    pub fn state(&self) -> ChainHeadState {
        match (self.head, self.in_process_list) {
            (Some(_), _) => ChainHeadState::Settled,
            (None, true) => ChainHeadState::Pending,
            (None, false) => ChainHeadState::Nonexistent,
        }
    }
}

impl std::fmt::Display for ChainHeadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Settled => write!(f, "settled"),
            Self::Pending => write!(f, "pending"),
            Self::Nonexistent => write!(f, "nonexistent"),
        }
    }
}

// ─── Block ────────────────────────────────────────────────────────────────────

/// An entry block: an immutable batch of entry hashes plus a back pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Identifier (KeyMR) of this block.
    pub keymr: Hash,
    /// KeyMR of the previous block; [`NULL_HASH`](crate::NULL_HASH) for the oldest block.
    pub prev_keymr: Hash,
    /// Chain this block belongs to.
    pub chain_id: Hash,
    /// Position of the block within its chain, starting at 0.
    pub sequence: u32,
    /// Member entry hashes, oldest first.
    pub entries: Vec<Hash>,
}

impl Block {
    /// Returns `true` if this is the first block of its chain.
    pub fn is_oldest(&self) -> bool {
        self.prev_keymr.is_null()
    }
}

// ─── Records ──────────────────────────────────────────────────────────────────

/// An entry as it travels on the wire: every field hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "chainid")]
    pub chain_id: String,
    #[serde(rename = "extids", default, deserialize_with = "null_as_default")]
    pub ext_ids: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
}

/// Nodes send `null` for empty lists and strings; treat it like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl RawRecord {
    /// Hex-encode the given fields into wire form.
    pub fn encode(chain_id: &Hash, ext_ids: &[&[u8]], content: &[u8]) -> Self {
        Self {
            chain_id: chain_id.to_hex(),
            ext_ids: ext_ids.iter().map(hex::encode).collect(),
            content: hex::encode(content),
        }
    }
}

/// A decoded chain entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Chain that owns the entry.
    pub chain_id: Hash,
    /// External IDs, in their original order.
    pub ext_ids: Vec<Vec<u8>>,
    /// Entry payload.
    pub content: Vec<u8>,
}

impl Record {
    /// External IDs rendered as (lossy) UTF-8.
    pub fn ext_ids_lossy(&self) -> Vec<String> {
        self.ext_ids
            .iter()
            .map(|id| String::from_utf8_lossy(id).into_owned())
            .collect()
    }

    pub fn content_lossy(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

/// All records of one block, in block order, plus the pointer to continue the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRecords {
    pub records: Vec<Record>,
    pub prev_keymr: Hash,
}

// ─── Position ─────────────────────────────────────────────────────────────────

/// Where in a traversal an error occurred.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    /// Chain being read, if the traversal started from a chain ID.
    pub chain_id: Option<Hash>,
    /// Block being fetched or processed.
    pub block: Option<Hash>,
    /// Number of blocks already visited (0 = head).
    pub depth: usize,
}

impl Position {
    pub fn chain(chain_id: Hash) -> Self {
        Self { chain_id: Some(chain_id), ..Default::default() }
    }

    pub fn at_block(self, block: Hash, depth: usize) -> Self {
        Self { block: Some(block), depth, ..self }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.chain_id {
            Some(id) => write!(f, "chain {id}")?,
            None => write!(f, "chain -")?,
        }
        match &self.block {
            Some(b) => write!(f, ", block {b}")?,
            None => write!(f, ", block -")?,
        }
        write!(f, ", depth {}", self.depth)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::NULL_HASH;

    #[test]
    fn chain_head_states() {
        let h = Hash::new([7; 32]);
        assert_eq!(ChainHead::settled(h).state(), ChainHeadState::Settled);
        assert_eq!(ChainHead::pending().state(), ChainHeadState::Pending);
        let missing = ChainHead { head: None, in_process_list: false };
        assert_eq!(missing.state(), ChainHeadState::Nonexistent);
        // New entries pending on a chain that already has blocks.
        let both = ChainHead { head: Some(h), in_process_list: true };
        assert_eq!(both.state(), ChainHeadState::Settled);
    }

    #[test]
    fn oldest_block_points_at_sentinel() {
        let block = Block {
            keymr: Hash::new([1; 32]),
            prev_keymr: NULL_HASH,
            chain_id: Hash::new([9; 32]),
            sequence: 0,
            entries: vec![],
        };
        assert!(block.is_oldest());
    }

    #[test]
    fn raw_record_encode_hexes_fields() {
        let raw = RawRecord::encode(&Hash::new([2; 32]), &[b"hi".as_slice()], b"");
        assert_eq!(raw.chain_id, "02".repeat(32));
        assert_eq!(raw.ext_ids, vec!["6869".to_string()]);
        assert_eq!(raw.content, "");
    }

    #[test]
    fn raw_record_accepts_null_fields() {
        let raw: RawRecord = serde_json::from_str(&format!(
            r#"{{"chainid":"{}","extids":null,"content":null}}"#,
            "ab".repeat(32)
        ))
        .unwrap();
        assert!(raw.ext_ids.is_empty());
        assert_eq!(raw.content, "");

        let raw: RawRecord =
            serde_json::from_str(&format!(r#"{{"chainid":"{}"}}"#, "ab".repeat(32))).unwrap();
        assert!(raw.ext_ids.is_empty());
    }

    #[test]
    fn position_display() {
        let chain = Hash::new([0xab; 32]);
        let pos = Position::chain(chain).at_block(NULL_HASH, 3);
        let s = pos.to_string();
        assert!(s.starts_with(&format!("chain {chain}")));
        assert!(s.ends_with("depth 3"));
        assert_eq!(Position::default().to_string(), "chain -, block -, depth 0");
    }
}
