use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("page_size must be nonzero")]
    ZeroPageSize,

    #[error("store error: {0}")]
    Store(#[from] aml_store::StoreError),

    #[error("export serialization failed: {0}")]
    Serialization(String),
}
