use aml_types::BlockHash;

/// Domain-separated BLAKE3 hasher.
///
/// Each hasher carries a domain tag that is prepended to every computation,
/// so a record leaf and a block header with identical serialized bytes can
/// never collide.
pub struct LedgerHasher {
    domain: &'static str,
}

impl LedgerHasher {
    /// Hasher for evaluation-record Merkle leaves.
    pub const LEAF: Self = Self {
        domain: "aml-leaf-v1",
    };
    /// Hasher for block headers.
    pub const HEADER: Self = Self {
        domain: "aml-header-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> BlockHash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        BlockHash::new(*hasher.finalize().as_bytes())
    }

    /// Hash a serializable value over its canonical JSON encoding.
    ///
    /// Field order follows the struct definition and set fields use ordered
    /// containers, so the encoding — and therefore the hash — is
    /// deterministic for a given value.
    pub fn hash_json<T: serde::Serialize>(&self, value: &T) -> Result<BlockHash, HasherError> {
        let data =
            serde_json::to_vec(value).map_err(|e| HasherError::Serialization(e.to_string()))?;
        Ok(self.hash(&data))
    }

    /// Verify that data hashes to the expected digest under this domain.
    pub fn verify(&self, data: &[u8], expected: &BlockHash) -> bool {
        self.hash(data) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),
}
