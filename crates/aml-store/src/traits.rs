use aml_types::Block;

use crate::error::StoreError;

/// Read boundary over a stored chain.
///
/// Reads may run concurrently with appends and observe either the pre- or
/// post-append state, never a partially written block.
pub trait ChainReader: Send + Sync {
    /// The most recently appended block, or `None` for an empty chain.
    fn head(&self) -> Result<Option<Block>, StoreError>;

    /// The block at `index`, or [`StoreError::NotFound`].
    fn get(&self, index: u64) -> Result<Block, StoreError>;

    /// Blocks in `start..=end`, clamped to the current length.
    fn range(&self, start: u64, end: u64) -> Result<Vec<Block>, StoreError>;

    /// Number of blocks in the chain.
    fn len(&self) -> Result<u64, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

/// Write boundary over a stored chain.
pub trait ChainWriter: Send + Sync {
    /// Append a sealed block. Rejects with [`StoreError::Linkage`] unless
    /// `block.index` and `block.previous_hash` extend the current head.
    /// On success the write is durable before the call returns.
    fn append(&self, block: Block) -> Result<(), StoreError>;
}

/// A full chain store: readable and appendable.
pub trait ChainStore: ChainReader + ChainWriter {}

impl<T: ChainReader + ChainWriter> ChainStore for T {}
