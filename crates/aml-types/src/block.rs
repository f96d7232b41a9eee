use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hash::BlockHash;
use crate::record::EvaluationRecord;

/// Well-known predecessor hash of the genesis block.
pub const GENESIS_PREVIOUS_HASH: BlockHash = BlockHash::zero();

/// Raw Ed25519 signature bytes carried inside a block.
///
/// Kept as raw bytes here so the data model does not depend on the crypto
/// crate; `aml-crypto` converts to and from its typed `Signature`.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSignature(#[serde(with = "signature_bytes")] [u8; 64]);

impl BlockSignature {
    pub const fn new(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Debug for BlockSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockSignature({}...)", hex::encode(&self.0[..8]))
    }
}

/// A sealed unit of the ledger.
///
/// `hash` covers the header fields (`index`, `timestamp`, `merkle_root`,
/// `previous_hash`); `signature` covers `hash`. Both are computed only after
/// every other field is fixed, and a block is immutable once sealed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Position in the chain; the genesis block has index 0.
    pub index: u64,
    /// Sealing time, epoch milliseconds.
    pub timestamp: u64,
    /// Records in arrival order. Never empty in a sealed block.
    pub records: Vec<EvaluationRecord>,
    /// Merkle root over the record leaf hashes, in record order.
    pub merkle_root: BlockHash,
    /// Hash of the prior block's header; [`GENESIS_PREVIOUS_HASH`] at index 0.
    pub previous_hash: BlockHash,
    /// Hash of this block's header fields, signature absent.
    pub hash: BlockHash,
    /// Ed25519 signature over `hash`, produced by the ledger's signing key.
    pub signature: BlockSignature,
}

impl Block {
    /// Returns `true` if this block claims the genesis position.
    pub fn is_genesis(&self) -> bool {
        self.index == 0 && self.previous_hash == GENESIS_PREVIOUS_HASH
    }

    /// Look up a record by its external id.
    pub fn record(&self, external_id: &str) -> Option<&EvaluationRecord> {
        self.records.iter().find(|r| r.external_id == external_id)
    }
}

mod signature_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 64], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(bytes)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 64], D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes: Vec<u8> = Vec::deserialize(deserializer)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 64-byte signature"))
    }
}
