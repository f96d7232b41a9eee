use aml_store::StoreError;
use aml_types::ValidationError;

/// Errors produced by sealing and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Hash, signature, Merkle, or linkage mismatch found in stored data.
    /// Fatal for the affected range; reported at the first divergent index
    /// and never auto-repaired.
    #[error("integrity violation at block {at_index}: {reason}")]
    IntegrityViolation { at_index: u64, reason: String },

    /// Malformed record rejected before sealing; never enters the chain.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("hashing failed: {0}")]
    Hashing(String),
}
