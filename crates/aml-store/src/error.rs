use aml_types::BlockHash;

/// Errors produced by chain store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The appended block does not extend the current head. A sealer that
    /// lost an append race re-reads the head and retries.
    #[error("chain linkage: head expects index {expected_index} with previous hash {expected_previous}")]
    Linkage {
        expected_index: u64,
        expected_previous: BlockHash,
    },

    #[error("block {index} not found")]
    NotFound { index: u64 },

    #[error("invalid block range: start={start}, end={end}")]
    InvalidRange { start: u64, end: u64 },

    /// A sealed block must carry at least one record.
    #[error("refusing to append a block with no records")]
    EmptyBlock,

    /// Durable-write failure after bounded retries. Fatal to the append
    /// attempt; prior chain state is untouched.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// The persisted log is damaged. Fatal: surfaced on recovery, never
    /// silently truncated.
    #[error("corrupt chain log at offset {offset}: {reason}")]
    Corrupt { offset: u64, reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("store lock poisoned")]
    LockPoisoned,
}
