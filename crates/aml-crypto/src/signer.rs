use std::fs;
use std::path::Path;

use aml_types::BlockSignature;

/// Ed25519 signing key. The process-wide ledger identity; held exclusively
/// by the block sealer and never exposed to readers.
pub struct SigningKey(ed25519_dalek::SigningKey);

/// Ed25519 verifying key (public). Distributed to validators.
#[derive(Clone, PartialEq, Eq)]
pub struct VerifyingKey(ed25519_dalek::VerifyingKey);

/// Ed25519 signature over a block hash.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(ed25519_dalek::Signature);

impl SigningKey {
    /// Generate a new random signing key.
    pub fn generate() -> Self {
        let mut csprng = rand::thread_rng();
        Self(ed25519_dalek::SigningKey::generate(&mut csprng))
    }

    /// Create from a raw 32-byte secret.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(&bytes))
    }

    /// Load the key from `path`, or generate and persist a fresh one.
    ///
    /// The keypair is created once at process start; rotating it mid-chain
    /// breaks signature verification for earlier blocks, so an existing key
    /// file is always preferred.
    pub fn load_or_generate(path: &Path) -> Result<Self, KeyError> {
        if path.exists() {
            let bytes = fs::read(path).map_err(|e| KeyError::Io(e.to_string()))?;
            let arr: [u8; 32] = bytes.try_into().map_err(|_| KeyError::InvalidKey)?;
            return Ok(Self::from_bytes(arr));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| KeyError::Io(e.to_string()))?;
        }
        let key = Self::generate();
        fs::write(path, key.0.as_bytes()).map_err(|e| KeyError::Io(e.to_string()))?;
        Ok(key)
    }

    /// The corresponding public verifying key.
    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey(self.0.verifying_key())
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Signature {
        use ed25519_dalek::Signer;
        Signature(self.0.sign(message))
    }
}

impl VerifyingKey {
    /// Verify a signature on a message. Pure function of key, message, and
    /// signature bytes.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), KeyError> {
        use ed25519_dalek::Verifier;
        self.0
            .verify(message, &signature.0)
            .map_err(|_| KeyError::InvalidSignature)
    }

    /// Raw public key bytes.
    pub fn as_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Create from raw 32-byte public key.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, KeyError> {
        let key =
            ed25519_dalek::VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidKey)?;
        Ok(Self(key))
    }
}

impl Signature {
    /// Raw 64-byte signature.
    pub fn to_bytes(self) -> [u8; 64] {
        self.0.to_bytes()
    }

    /// Create from raw 64-byte signature.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(ed25519_dalek::Signature::from_bytes(&bytes))
    }
}

impl From<Signature> for BlockSignature {
    fn from(sig: Signature) -> Self {
        BlockSignature::new(sig.to_bytes())
    }
}

impl From<BlockSignature> for Signature {
    fn from(sig: BlockSignature) -> Self {
        Signature::from_bytes(*sig.as_bytes())
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningKey(<redacted>)")
    }
}

impl std::fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VerifyingKey({})", hex::encode(self.0.to_bytes()))
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({}...)", hex::encode(&self.0.to_bytes()[..8]))
    }
}

/// Errors from key and signature operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("invalid key material")]
    InvalidKey,
    #[error("key file io: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify() {
        let sk = SigningKey::generate();
        let sig = sk.sign(b"block hash");
        assert!(sk.verifying_key().verify(b"block hash", &sig).is_ok());
    }

    #[test]
    fn verify_fails_on_altered_message() {
        let sk = SigningKey::generate();
        let sig = sk.sign(b"sealed header");
        assert_eq!(
            sk.verifying_key().verify(b"altered header", &sig),
            Err(KeyError::InvalidSignature)
        );
    }

    #[test]
    fn verify_fails_with_foreign_key() {
        let sk = SigningKey::generate();
        let other = SigningKey::generate();
        let sig = sk.sign(b"message");
        assert!(other.verifying_key().verify(b"message", &sig).is_err());
    }

    #[test]
    fn block_signature_roundtrip() {
        let sk = SigningKey::generate();
        let sig = sk.sign(b"hash");
        let stored: BlockSignature = sig.into();
        let restored: Signature = stored.into();
        assert!(sk.verifying_key().verify(b"hash", &restored).is_ok());
    }

    #[test]
    fn load_or_generate_persists_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys/ledger.key");

        let first = SigningKey::load_or_generate(&path).unwrap();
        let second = SigningKey::load_or_generate(&path).unwrap();
        assert_eq!(first.verifying_key(), second.verifying_key());
    }

    #[test]
    fn load_rejects_short_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.key");
        fs::write(&path, [1u8; 5]).unwrap();
        assert_eq!(
            SigningKey::load_or_generate(&path).unwrap_err(),
            KeyError::InvalidKey
        );
    }

    #[test]
    fn public_key_bytes_roundtrip() {
        let sk = SigningKey::generate();
        let vk = sk.verifying_key();
        let restored = VerifyingKey::from_bytes(vk.as_bytes()).unwrap();
        assert_eq!(vk, restored);
    }

    #[test]
    fn debug_redacts_signing_key() {
        let sk = SigningKey::generate();
        assert!(format!("{sk:?}").contains("redacted"));
    }
}
