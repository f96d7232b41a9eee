//! Durable, append-only block storage for the Ledger-Lock AML audit ledger.
//!
//! This crate owns the chain: an ordered sequence of sealed blocks with the
//! head as the single piece of mutable shared state. It provides:
//! - [`ChainReader`] / [`ChainWriter`] trait boundaries
//! - [`MemoryChainStore`] for tests and embedding
//! - [`FileChainStore`]: a crash-recoverable, CRC-framed block log where an
//!   append is durable before the call returns
//!
//! Structural linkage (index continuity, previous-hash match) is enforced at
//! append time; cryptographic validation of stored chains lives in
//! `aml-ledger`.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::StoreError;
pub use file::FileChainStore;
pub use memory::MemoryChainStore;
pub use traits::{ChainReader, ChainStore, ChainWriter};
