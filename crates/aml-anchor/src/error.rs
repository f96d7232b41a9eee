use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnchorError {
    #[error("network error: {0}")]
    Network(String),

    #[error("anchoring attempt timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("external network rejected the write: {0}")]
    Rejected(String),

    #[error("no commitment for external id {0}")]
    UnknownCommitment(String),
}

pub type AnchorResult<T> = Result<T, AnchorError>;
