use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use aml_crypto::{merkle_root, LedgerHasher, SigningKey, VerifyingKey};
use aml_store::{ChainStore, StoreError};
use aml_types::{
    now_ms, Block, BlockHash, EvaluationRecord, GENESIS_PREVIOUS_HASH,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::LedgerError;

/// Leaf hash of a record: domain-separated digest over its full field set.
pub fn leaf_hash(record: &EvaluationRecord) -> Result<BlockHash, LedgerError> {
    LedgerHasher::LEAF
        .hash_json(record)
        .map_err(|e| LedgerError::Hashing(e.to_string()))
}

/// Merkle root over record leaf hashes, in record (arrival) order.
pub fn records_merkle_root(records: &[EvaluationRecord]) -> Result<BlockHash, LedgerError> {
    let leaves = records
        .iter()
        .map(leaf_hash)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(merkle_root(&leaves))
}

/// Header fields covered by the block hash. The signature is absent by
/// construction: it is computed over the resulting hash afterwards.
#[derive(Serialize)]
struct HeaderFields {
    index: u64,
    timestamp: u64,
    merkle_root: BlockHash,
    previous_hash: BlockHash,
}

/// Hash of a block header, signature absent.
pub fn compute_block_hash(
    index: u64,
    timestamp: u64,
    merkle_root: BlockHash,
    previous_hash: BlockHash,
) -> Result<BlockHash, LedgerError> {
    LedgerHasher::HEADER
        .hash_json(&HeaderFields {
            index,
            timestamp,
            merkle_root,
            previous_hash,
        })
        .map_err(|e| LedgerError::Hashing(e.to_string()))
}

/// Seal a batch of records into a block extending `head`.
///
/// All fields are fixed before `hash` is computed, and `hash` before
/// `signature`; the result is immutable from the caller's viewpoint.
pub fn seal_block(
    records: Vec<EvaluationRecord>,
    head: Option<&Block>,
    timestamp: u64,
    signing_key: &SigningKey,
) -> Result<Block, LedgerError> {
    let (index, previous_hash) = match head {
        Some(h) => (h.index + 1, h.hash),
        None => (0, GENESIS_PREVIOUS_HASH),
    };

    let merkle_root = records_merkle_root(&records)?;
    let hash = compute_block_hash(index, timestamp, merkle_root, previous_hash)?;
    let signature = signing_key.sign(hash.as_bytes());

    Ok(Block {
        index,
        timestamp,
        records,
        merkle_root,
        previous_hash,
        hash,
        signature: signature.into(),
    })
}

/// Batching policy for the sealer.
#[derive(Clone, Debug)]
pub struct SealerConfig {
    /// Seal as soon as this many records are pending.
    pub max_records_per_block: usize,
    /// Seal a non-empty batch once it has been open this long. Enforced by
    /// [`BlockSealer::seal_if_due`], which a periodic tick drives.
    pub max_batch_delay: Duration,
}

impl Default for SealerConfig {
    fn default() -> Self {
        Self {
            max_records_per_block: 32,
            max_batch_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Default)]
struct PendingBatch {
    records: Vec<EvaluationRecord>,
    opened_at: Option<Instant>,
}

/// Turns pending evaluation records into sealed, appended blocks.
///
/// The pending batch and the seal-and-append sequence share one mutex, so at
/// most one seal/append is in flight per sealer — the single-writer
/// discipline for its chain instance. The signing key lives here and is
/// never handed to readers.
pub struct BlockSealer {
    store: Arc<dyn ChainStore>,
    signing_key: SigningKey,
    config: SealerConfig,
    pending: Mutex<PendingBatch>,
}

impl BlockSealer {
    pub fn new(store: Arc<dyn ChainStore>, signing_key: SigningKey, config: SealerConfig) -> Self {
        Self {
            store,
            signing_key,
            config,
            pending: Mutex::new(PendingBatch::default()),
        }
    }

    /// Public key for verifying blocks sealed by this sealer.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Queue a record; seals and appends when the size threshold is reached.
    ///
    /// Returns the sealed block when this submission triggered a seal.
    pub fn submit(&self, record: EvaluationRecord) -> Result<Option<Block>, LedgerError> {
        record.validate()?;

        let mut pending = self.pending.lock().map_err(|_| StoreError::LockPoisoned)?;
        if pending.records.is_empty() {
            pending.opened_at = Some(Instant::now());
        }
        pending.records.push(record);

        if pending.records.len() >= self.config.max_records_per_block {
            return self.seal_pending(&mut pending).map(Some);
        }
        Ok(None)
    }

    /// Seal whatever is pending immediately. `None` if nothing is pending.
    pub fn flush(&self) -> Result<Option<Block>, LedgerError> {
        let mut pending = self.pending.lock().map_err(|_| StoreError::LockPoisoned)?;
        if pending.records.is_empty() {
            return Ok(None);
        }
        self.seal_pending(&mut pending).map(Some)
    }

    /// Seal the pending batch if it has exceeded the time threshold.
    pub fn seal_if_due(&self) -> Result<Option<Block>, LedgerError> {
        let mut pending = self.pending.lock().map_err(|_| StoreError::LockPoisoned)?;
        let due = match pending.opened_at {
            Some(opened_at) if !pending.records.is_empty() => {
                opened_at.elapsed() >= self.config.max_batch_delay
            }
            _ => false,
        };
        if !due {
            return Ok(None);
        }
        self.seal_pending(&mut pending).map(Some)
    }

    /// Number of records waiting for the next seal.
    pub fn pending_len(&self) -> usize {
        self.pending.lock().map(|p| p.records.len()).unwrap_or(0)
    }

    /// Drain the batch, seal it against the current head, and append.
    ///
    /// If the append loses a race against another writer the head is
    /// re-read and the same records are re-sealed — they are never dropped
    /// or duplicated across retries.
    fn seal_pending(&self, pending: &mut PendingBatch) -> Result<Block, LedgerError> {
        let records = std::mem::take(&mut pending.records);
        pending.opened_at = None;

        loop {
            let head = self.store.head()?;
            let block = seal_block(
                records.clone(),
                head.as_ref(),
                now_ms(),
                &self.signing_key,
            )?;

            match self.store.append(block.clone()) {
                Ok(()) => {
                    debug!(
                        index = block.index,
                        records = block.records.len(),
                        hash = %block.hash.short_hex(),
                        "block sealed"
                    );
                    return Ok(block);
                }
                Err(StoreError::Linkage { expected_index, .. }) => {
                    warn!(
                        attempted = block.index,
                        expected = expected_index,
                        "append lost head race; re-sealing"
                    );
                    continue;
                }
                Err(other) => {
                    // The batch is not lost: requeue so a later flush retries.
                    pending.records = records;
                    pending.opened_at = Some(Instant::now());
                    return Err(other.into());
                }
            }
        }
    }
}
