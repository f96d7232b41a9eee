//! Cryptographic primitives for the Ledger-Lock AML audit ledger.
//!
//! Provides domain-separated BLAKE3 hashing, Ed25519 signing/verification,
//! and binary Merkle trees with inclusion proofs.
//!
//! All crypto operations wrap established libraries — no custom cryptography.

pub mod hasher;
pub mod merkle;
pub mod signer;

pub use hasher::{HasherError, LedgerHasher};
pub use merkle::{merkle_root, MerkleProof, MerkleTree, Side};
pub use signer::{KeyError, Signature, SigningKey, VerifyingKey};
