// Shared Cryptographic Primitives
// Hashing and signing functions shared across the capture core.

//! # Crypto Primitives
//!
//! The single place the rest of the workspace reaches for SHA-256 hashing
//! and Ed25519 signing, so every crate gets the same tested implementation
//! instead of rolling its own.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
    #[error("signature verification failed")]
    SignatureVerificationFailed,
}

/// SHA-256 over arbitrary bytes. The collaborator interface named in the
/// capture core's spec as "a SHA-256 function producing 32 bytes"; this is
/// the one implementation every other crate calls through.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Lowercase hex encoding, used for manifest/policy/artifact hash fields.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Ed25519 key pair used to sign WAL audit-log entries.
#[derive(Clone)]
pub struct Ed25519KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl Ed25519KeyPair {
    /// Generate a new key pair from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        let signing_key = SigningKey::generate(&mut csprng);
        let verifying_key = signing_key.verifying_key();
        Ed25519KeyPair {
            signing_key,
            verifying_key,
        }
    }

    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(bytes);
        let verifying_key = signing_key.verifying_key();
        Ed25519KeyPair {
            signing_key,
            verifying_key,
        }
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey {
            bytes: self.verifying_key.to_bytes(),
        }
    }

    /// Sign `data`, returning the 64-byte signature.
    pub fn sign(&self, data: &[u8]) -> [u8; 64] {
        self.signing_key.sign(data).to_bytes()
    }
}

/// Ed25519 public key, serializable as raw 32 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ed25519PublicKey {
    bytes: [u8; 32],
}

impl Ed25519PublicKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut key_bytes = [0u8; 32];
        key_bytes.copy_from_slice(bytes);
        VerifyingKey::from_bytes(&key_bytes).map_err(|_| CryptoError::InvalidKeyLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        Ok(Self { bytes: key_bytes })
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.bytes
    }

    /// Verify a signature produced by the matching private key.
    pub fn verify(&self, data: &[u8], signature: &[u8; 64]) -> Result<(), CryptoError> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.bytes).map_err(|_| CryptoError::InvalidKeyLength {
                expected: 32,
                actual: 32,
            })?;
        let signature = Signature::from_bytes(signature);
        verifying_key
            .verify(data, &signature)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_length_and_stability() {
        let a = sha256(b"test data");
        let b = sha256(b"test data");
        assert_eq!(a.len(), 32);
        assert_eq!(a, b);
        assert_ne!(a, sha256(b"other data"));
    }

    #[test]
    fn test_ed25519_round_trip() {
        let keypair = Ed25519KeyPair::generate();
        let data = b"wal entry bytes";
        let signature = keypair.sign(data);

        let public = keypair.public_key();
        public.verify(data, &signature).unwrap();
        assert!(public.verify(b"different data", &signature).is_err());
    }

    #[test]
    fn test_public_key_from_bytes_rejects_short_input() {
        let err = Ed25519PublicKey::from_bytes(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidKeyLength { .. }));
    }
}
