use aml_crypto::{MerkleProof, MerkleTree, Signature, VerifyingKey};
use aml_store::ChainReader;
use aml_types::{Block, EvaluationRecord, GENESIS_PREVIOUS_HASH};

use crate::error::LedgerError;
use crate::seal::{compute_block_hash, leaf_hash, records_merkle_root};

/// Certifies end-to-end integrity of a stored chain.
///
/// The validator needs only the public key; the signing key never leaves
/// the sealer. Validation is fail-fast: it halts at the first divergent
/// block and never continues past known corruption.
pub struct ChainValidator {
    verifying_key: VerifyingKey,
}

impl ChainValidator {
    pub fn new(verifying_key: VerifyingKey) -> Self {
        Self { verifying_key }
    }

    /// Validate the full stored chain.
    pub fn validate_chain(&self, reader: &dyn ChainReader) -> Result<(), LedgerError> {
        let len = reader.len()?;
        if len == 0 {
            return Ok(());
        }
        self.validate_range(reader, 0, len - 1)
    }

    /// Validate the contiguous subrange `start..=end` of the stored chain.
    ///
    /// When `start > 0` the predecessor block is fetched so the first link
    /// of the range is checked too.
    pub fn validate_range(
        &self,
        reader: &dyn ChainReader,
        start: u64,
        end: u64,
    ) -> Result<(), LedgerError> {
        let blocks = reader.range(start, end)?;
        let predecessor = if start > 0 {
            Some(reader.get(start - 1)?)
        } else {
            None
        };
        self.validate_blocks(predecessor.as_ref(), &blocks)
    }

    /// Validate an in-memory block sequence against `predecessor` (the block
    /// immediately before the sequence, or `None` when it starts at genesis).
    pub fn validate_blocks(
        &self,
        predecessor: Option<&Block>,
        blocks: &[Block],
    ) -> Result<(), LedgerError> {
        let mut prev = predecessor;
        for block in blocks {
            self.validate_block(prev, block)?;
            prev = Some(block);
        }
        Ok(())
    }

    fn validate_block(&self, prev: Option<&Block>, block: &Block) -> Result<(), LedgerError> {
        let violation = |reason: String| LedgerError::IntegrityViolation {
            at_index: block.index,
            reason,
        };

        if block.records.is_empty() {
            return Err(violation("block has no records".into()));
        }
        for record in &block.records {
            record
                .validate()
                .map_err(|e| violation(format!("malformed record: {e}")))?;
        }

        let (expected_index, expected_previous) = match prev {
            Some(p) => (p.index + 1, p.hash),
            None => (0, GENESIS_PREVIOUS_HASH),
        };
        if block.index != expected_index {
            return Err(violation(format!(
                "expected index {expected_index}, found {}",
                block.index
            )));
        }
        if block.previous_hash != expected_previous {
            return Err(violation("previous hash link mismatch".into()));
        }

        let computed_root = records_merkle_root(&block.records)?;
        if computed_root != block.merkle_root {
            return Err(violation("merkle root mismatch".into()));
        }

        let computed_hash = compute_block_hash(
            block.index,
            block.timestamp,
            block.merkle_root,
            block.previous_hash,
        )?;
        if computed_hash != block.hash {
            return Err(violation("block hash mismatch".into()));
        }

        let signature: Signature = block.signature.into();
        if self
            .verifying_key
            .verify(block.hash.as_bytes(), &signature)
            .is_err()
        {
            return Err(violation("invalid block signature".into()));
        }

        Ok(())
    }
}

/// Build an inclusion proof for the record at `record_index` of `block`.
pub fn record_proof(block: &Block, record_index: usize) -> Result<Option<MerkleProof>, LedgerError> {
    let leaves = block
        .records
        .iter()
        .map(leaf_hash)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(MerkleTree::build(leaves).proof(record_index))
}

/// Check that `record` is part of `block` using an inclusion proof, without
/// re-deriving the whole Merkle tree.
pub fn verify_record_inclusion(
    block: &Block,
    record: &EvaluationRecord,
    proof: &MerkleProof,
) -> bool {
    match leaf_hash(record) {
        Ok(leaf) => proof.leaf == leaf && proof.root == block.merkle_root && proof.verify(),
        Err(_) => false,
    }
}
