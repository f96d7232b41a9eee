//! Core data model for the Ledger-Lock AML audit ledger.
//!
//! This crate defines the entities shared by every layer:
//! - [`EvaluationRecord`]: one scored transaction, immutable once produced
//! - [`Block`]: a sealed, signed batch of records with Merkle commitment
//! - [`AnchorCommitment`]: per-record external anchoring state
//! - [`BlockHash`]: 32-byte content hash used for chain linkage

pub mod anchor;
pub mod block;
pub mod error;
pub mod hash;
pub mod record;
pub mod time;

pub use anchor::{AnchorCommitment, AnchorStatus, AnchoredEvaluation};
pub use block::{Block, BlockSignature, GENESIS_PREVIOUS_HASH};
pub use error::{TypeError, ValidationError};
pub use hash::BlockHash;
pub use record::{EvaluationRecord, PROBABILITY_SCALE};
pub use time::now_ms;
