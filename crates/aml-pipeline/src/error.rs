use thiserror::Error;

/// Failure inside a fraud scorer implementation.
#[derive(Debug, Error)]
#[error("scoring failed: {0}")]
pub struct ScoreError(pub String);

/// Stage-tagged pipeline rejection.
///
/// A rejected transaction never reaches the sealer, so callers can tell
/// "rejected, not recorded" apart from downstream ledger errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("KYC verification failed for party {party}")]
    Kyc { party: String },

    #[error("compliance rule violated: {reason}")]
    Rules { reason: String },

    #[error(transparent)]
    Scoring(#[from] ScoreError),

    #[error("record validation failed: {0}")]
    Validation(#[from] aml_types::ValidationError),
}
