//! Ordering reconciliation.
//!
//! Blocks arrive newest first, each with its records oldest first. Every
//! block's records are reversed on arrival and appended; one reversal of the
//! whole accumulator at the end restores block-internal order and flips the
//! block order to oldest first. The chain length need not be known up front.

use crate::types::Record;

#[derive(Debug, Default)]
pub struct OrderingReconciler {
    acc: Vec<Record>,
    blocks: usize,
}

impl OrderingReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the records of the next (older) block, given oldest first.
    pub fn push_block(&mut self, mut records: Vec<Record>) {
        records.reverse();
        self.acc.append(&mut records);
        self.blocks += 1;
    }

    /// Number of blocks pushed so far.
    pub fn blocks(&self) -> usize {
        self.blocks
    }

    pub fn len(&self) -> usize {
        self.acc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.acc.is_empty()
    }

    /// All records, oldest first.
    pub fn finish(mut self) -> Vec<Record> {
        self.acc.reverse();
        self.acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Hash;

    fn rec(label: &str) -> Record {
        Record {
            chain_id: Hash::new([4; 32]),
            ext_ids: vec![],
            content: label.as_bytes().to_vec(),
        }
    }

    fn labels(records: &[Record]) -> Vec<String> {
        records.iter().map(|r| r.content_lossy()).collect()
    }

    #[test]
    fn newest_first_blocks_become_chronological() {
        let mut r = OrderingReconciler::new();
        // visitation order: block3, block2, block1
        r.push_block(vec![rec("b3.0"), rec("b3.1"), rec("b3.2")]);
        r.push_block(vec![rec("b2.0")]);
        r.push_block(vec![rec("b1.0"), rec("b1.1")]);
        assert_eq!(r.blocks(), 3);
        assert_eq!(r.len(), 6);

        assert_eq!(
            labels(&r.finish()),
            vec!["b1.0", "b1.1", "b2.0", "b3.0", "b3.1", "b3.2"]
        );
    }

    #[test]
    fn single_block_is_unchanged() {
        let mut r = OrderingReconciler::new();
        r.push_block(vec![rec("x"), rec("y"), rec("z")]);
        assert_eq!(labels(&r.finish()), vec!["x", "y", "z"]);
    }

    #[test]
    fn empty_blocks_contribute_nothing() {
        let mut r = OrderingReconciler::new();
        r.push_block(vec![]);
        r.push_block(vec![rec("only")]);
        r.push_block(vec![]);
        assert_eq!(labels(&r.finish()), vec!["only"]);
    }
}
