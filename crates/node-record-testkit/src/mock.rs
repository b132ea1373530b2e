//! A deterministic identity scheme for tests.
//!
//! The mock scheme uses Blake3 only: the public key is a hash of the secret
//! and the signature is a keyed hash of the content under the public key.
//! Anyone holding the public key can forge a signature, so it must never be
//! registered outside tests.

use bytes::Bytes;
use node_record_core::error::Result;
use node_record_core::{
    keys, FieldValue, IdentityScheme, NodeId, NodeRecord, RecordError, ValidationError,
};

/// Field holding the mock public key.
pub const MOCK_KEY_FIELD: &str = "mock";

const SIGNATURE_LEN: usize = 32;

#[derive(Debug, Clone, Copy, Default)]
pub struct MockScheme;

impl MockScheme {
    pub const ID: &'static str = "mock";

    pub fn new() -> Self {
        Self
    }

    /// The mock public key for a secret.
    pub fn public_key(secret: &[u8]) -> [u8; 32] {
        *blake3::hash(secret).as_bytes()
    }

    fn key_of(record: &NodeRecord) -> Option<[u8; 32]> {
        record
            .get(MOCK_KEY_FIELD)
            .and_then(FieldValue::as_bytes)
            .and_then(|b| b.as_ref().try_into().ok())
    }
}

impl IdentityScheme for MockScheme {
    fn scheme_id(&self) -> &'static str {
        Self::ID
    }

    fn public_key_field(&self) -> &'static str {
        MOCK_KEY_FIELD
    }

    fn signature_len(&self) -> usize {
        SIGNATURE_LEN
    }

    fn public_key_from_private(&self, private_key: &[u8]) -> Result<Bytes> {
        if private_key.is_empty() {
            return Err(RecordError::InvalidPrivateKey);
        }
        Ok(Bytes::copy_from_slice(&Self::public_key(private_key)))
    }

    fn verify(&self, record: &NodeRecord) -> std::result::Result<(), ValidationError> {
        let found = record.get(keys::ID).and_then(FieldValue::as_text);
        if found != Some(Self::ID) {
            return Err(ValidationError::SchemeMismatch {
                expected: Self::ID,
                found: found.map(str::to_string),
            });
        }
        let key = Self::key_of(record).ok_or(ValidationError::MissingField(MOCK_KEY_FIELD))?;
        let content = record.serialize_no_signature()?;
        if blake3::keyed_hash(&key, &content).as_bytes()[..] != *record.signature() {
            return Err(ValidationError::SignatureFailed);
        }
        Ok(())
    }

    fn sign(&self, record: &mut NodeRecord, private_key: &[u8]) -> Result<()> {
        let key = Self::public_key(private_key);
        let content = record.serialize_no_signature()?;
        let signature = blake3::keyed_hash(&key, &content);
        record.set_signature(Bytes::copy_from_slice(signature.as_bytes()));
        Ok(())
    }

    fn node_id(&self, record: &NodeRecord) -> Result<NodeId> {
        let key = Self::key_of(record)
            .ok_or_else(|| RecordError::MissingRequiredField(MOCK_KEY_FIELD.into()))?;
        Ok(NodeId(*blake3::hash(&key).as_bytes()))
    }
}
