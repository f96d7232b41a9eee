//! Block sealing and chain validation for the Ledger-Lock AML audit ledger.
//!
//! This crate is the write path and the audit path of the system:
//! - [`BlockSealer`]: batches evaluation records, seals them into signed
//!   blocks, and appends them behind a single-writer discipline
//! - [`ChainValidator`]: certifies end-to-end integrity of a stored chain
//!   and checks record inclusion via Merkle proofs
//! - [`Ledger`]: the opening facade that re-validates the persisted tail
//!   before accepting new appends

pub mod error;
pub mod ledger;
pub mod seal;
pub mod validation;

pub use error::LedgerError;
pub use ledger::{Ledger, RecoveryConfig};
pub use seal::{
    compute_block_hash, leaf_hash, records_merkle_root, seal_block, BlockSealer, SealerConfig,
};
pub use validation::{record_proof, verify_record_inclusion, ChainValidator};
