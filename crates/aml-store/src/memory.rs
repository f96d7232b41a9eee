use std::sync::RwLock;

use aml_types::{Block, BlockHash, GENESIS_PREVIOUS_HASH};

use crate::error::StoreError;
use crate::traits::{ChainReader, ChainWriter};

/// In-memory chain store for tests, local demos, and embedding.
#[derive(Default)]
pub struct MemoryChainStore {
    blocks: RwLock<Vec<Block>>,
}

impl MemoryChainStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Reject `block` unless it extends a chain whose tail is `head`.
pub(crate) fn check_linkage(head: Option<&Block>, block: &Block) -> Result<(), StoreError> {
    if block.records.is_empty() {
        return Err(StoreError::EmptyBlock);
    }

    let (expected_index, expected_previous) = match head {
        Some(h) => (h.index + 1, h.hash),
        None => (0, GENESIS_PREVIOUS_HASH),
    };

    if block.index != expected_index || block.previous_hash != expected_previous {
        return Err(StoreError::Linkage {
            expected_index,
            expected_previous,
        });
    }
    Ok(())
}

pub(crate) fn slice_range(blocks: &[Block], start: u64, end: u64) -> Result<Vec<Block>, StoreError> {
    if start > end {
        return Err(StoreError::InvalidRange { start, end });
    }
    let len = blocks.len() as u64;
    if start >= len {
        return Ok(vec![]);
    }
    let end_exclusive = end.saturating_add(1).min(len) as usize;
    Ok(blocks[start as usize..end_exclusive].to_vec())
}

impl ChainReader for MemoryChainStore {
    fn head(&self) -> Result<Option<Block>, StoreError> {
        let blocks = self.blocks.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(blocks.last().cloned())
    }

    fn get(&self, index: u64) -> Result<Block, StoreError> {
        let blocks = self.blocks.read().map_err(|_| StoreError::LockPoisoned)?;
        blocks
            .get(index as usize)
            .cloned()
            .ok_or(StoreError::NotFound { index })
    }

    fn range(&self, start: u64, end: u64) -> Result<Vec<Block>, StoreError> {
        let blocks = self.blocks.read().map_err(|_| StoreError::LockPoisoned)?;
        slice_range(&blocks, start, end)
    }

    fn len(&self) -> Result<u64, StoreError> {
        let blocks = self.blocks.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(blocks.len() as u64)
    }
}

impl ChainWriter for MemoryChainStore {
    fn append(&self, block: Block) -> Result<(), StoreError> {
        let mut blocks = self.blocks.write().map_err(|_| StoreError::LockPoisoned)?;
        check_linkage(blocks.last(), &block)?;
        blocks.push(block);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use aml_types::{BlockSignature, EvaluationRecord};

    use super::*;

    fn test_block(index: u64, previous_hash: BlockHash) -> Block {
        let record = EvaluationRecord {
            external_id: format!("tx-{index}"),
            amount: 1_000 * (index + 1),
            fraud_probability: 500,
            is_fraud: false,
            rule_flags: BTreeSet::new(),
            submitted_at: 1_700_000_000_000 + index,
        };
        Block {
            index,
            timestamp: 1_700_000_000_000 + index,
            records: vec![record],
            merkle_root: BlockHash::new([index as u8 + 1; 32]),
            previous_hash,
            hash: BlockHash::new([index as u8 + 100; 32]),
            signature: BlockSignature::new([0; 64]),
        }
    }

    #[test]
    fn append_and_read_back() {
        let store = MemoryChainStore::new();
        assert!(store.head().unwrap().is_none());

        let b0 = test_block(0, GENESIS_PREVIOUS_HASH);
        store.append(b0.clone()).unwrap();
        let b1 = test_block(1, b0.hash);
        store.append(b1.clone()).unwrap();

        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(store.head().unwrap(), Some(b1.clone()));
        assert_eq!(store.get(0).unwrap(), b0);
        assert_eq!(store.get(1).unwrap(), b1);
    }

    #[test]
    fn append_rejects_wrong_previous_hash() {
        let store = MemoryChainStore::new();
        let b0 = test_block(0, GENESIS_PREVIOUS_HASH);
        store.append(b0.clone()).unwrap();

        let stray = test_block(1, BlockHash::new([9; 32]));
        let err = store.append(stray).unwrap_err();
        assert_eq!(
            err,
            StoreError::Linkage {
                expected_index: 1,
                expected_previous: b0.hash,
            }
        );
    }

    #[test]
    fn append_rejects_wrong_index() {
        let store = MemoryChainStore::new();
        let b0 = test_block(0, GENESIS_PREVIOUS_HASH);
        store.append(b0.clone()).unwrap();

        let skipped = test_block(2, b0.hash);
        assert!(matches!(
            store.append(skipped),
            Err(StoreError::Linkage { .. })
        ));
    }

    #[test]
    fn genesis_must_use_well_known_previous() {
        let store = MemoryChainStore::new();
        let bad = test_block(0, BlockHash::new([1; 32]));
        assert!(matches!(store.append(bad), Err(StoreError::Linkage { .. })));
    }

    #[test]
    fn empty_block_rejected() {
        let store = MemoryChainStore::new();
        let mut b0 = test_block(0, GENESIS_PREVIOUS_HASH);
        b0.records.clear();
        assert_eq!(store.append(b0), Err(StoreError::EmptyBlock));
    }

    #[test]
    fn get_missing_index() {
        let store = MemoryChainStore::new();
        assert_eq!(store.get(0), Err(StoreError::NotFound { index: 0 }));
    }

    #[test]
    fn range_is_inclusive_and_clamped() {
        let store = MemoryChainStore::new();
        let b0 = test_block(0, GENESIS_PREVIOUS_HASH);
        store.append(b0.clone()).unwrap();
        store.append(test_block(1, b0.hash)).unwrap();

        assert_eq!(store.range(0, 1).unwrap().len(), 2);
        assert_eq!(store.range(0, 99).unwrap().len(), 2);
        assert_eq!(store.range(1, 1).unwrap().len(), 1);
        assert!(store.range(5, 9).unwrap().is_empty());
        assert_eq!(
            store.range(2, 1),
            Err(StoreError::InvalidRange { start: 2, end: 1 })
        );
    }
}
