//! Cryptographic primitives for node records.
//!
//! Wraps secp256k1 ECDSA (k256), Ed25519 (ed25519-dalek) and Keccak-256
//! hashing with strong types. Identity schemes take raw secret bytes; these
//! wrappers are the typed way to produce and hold them.

use ed25519_dalek::{Signer, SigningKey as Ed25519SigningKey};
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};
use std::fmt;

use crate::error::RecordError;

/// Compute the Keccak-256 hash of the given data.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// A secp256k1 keypair.
///
/// Signatures are deterministic (RFC 6979) and low-S normalized.
#[derive(Clone)]
pub struct Secp256k1Keypair {
    signing_key: SigningKey,
}

impl Secp256k1Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from 32 secret key bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RecordError> {
        if bytes.len() != 32 {
            return Err(RecordError::InvalidPrivateKey);
        }
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|_| RecordError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Compressed SEC1 public key (33 bytes).
    pub fn public_key(&self) -> [u8; 33] {
        let point = self.signing_key.verifying_key().to_encoded_point(true);
        let mut out = [0u8; 33];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Sign a 32-byte digest, returning `r || s`.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<[u8; 64], RecordError> {
        let signature: Signature = self
            .signing_key
            .sign_prehash(digest)
            .map_err(|_| RecordError::InvalidPrivateKey)?;
        let mut out = [0u8; 64];
        out.copy_from_slice(&signature.to_bytes());
        Ok(out)
    }

    /// Get the raw secret key bytes.
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }
}

impl fmt::Debug for Secp256k1Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Secp256k1Keypair({})",
            &hex::encode(self.public_key())[..16]
        )
    }
}

/// Parse a compressed (33-byte) or uncompressed (65-byte) secp256k1 key.
pub(crate) fn secp256k1_verifying_key(bytes: &[u8]) -> Option<VerifyingKey> {
    VerifyingKey::from_sec1_bytes(bytes).ok()
}

/// Verify an `r || s` signature over a 32-byte digest.
pub(crate) fn secp256k1_verify(key: &VerifyingKey, digest: &[u8; 32], signature: &[u8]) -> bool {
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    key.verify_prehash(digest, &signature).is_ok()
}

/// Uncompressed SEC1 encoding without the `0x04` tag (64 bytes).
pub(crate) fn secp256k1_uncompressed_xy(key: &VerifyingKey) -> Vec<u8> {
    key.to_encoded_point(false).as_bytes()[1..].to_vec()
}

/// An Ed25519 keypair.
#[derive(Clone)]
pub struct Ed25519Keypair {
    signing_key: Ed25519SigningKey,
}

impl Ed25519Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = Ed25519SigningKey::generate(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = Ed25519SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Create from a seed slice, failing unless it is exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RecordError> {
        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|_| RecordError::InvalidPrivateKey)?;
        Ok(Self::from_seed(&seed))
    }

    /// Get the public key.
    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Get the raw seed bytes (secret key material).
    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl fmt::Debug for Ed25519Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Keypair({})", &hex::encode(self.public_key())[..16])
    }
}
