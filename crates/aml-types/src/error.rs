use crate::record::PROBABILITY_SCALE;

/// Errors from parsing or constructing core types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// A malformed evaluation record. Rejected before sealing; never enters the chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("external id must not be empty")]
    EmptyExternalId,

    #[error("fraud probability {value} exceeds the fixed-point scale {PROBABILITY_SCALE}")]
    ProbabilityOutOfRange { value: u16 },

    #[error("rule flag must not be empty")]
    EmptyRuleFlag,
}
