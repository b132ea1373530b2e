//! The `v4` identity scheme: secp256k1 over Keccak-256.
//!
//! - Public key: compressed secp256k1 point under `secp256k1` (33 bytes)
//! - Signature: 64-byte `r || s` over `keccak256(content)`, low-S
//! - Node id: `keccak256` of the uncompressed point without its tag byte

use bytes::Bytes;

use super::{check_scheme_id, check_signature_len, public_key_bytes, IdentityScheme};
use crate::crypto::{
    keccak256, secp256k1_uncompressed_xy, secp256k1_verify, secp256k1_verifying_key,
    Secp256k1Keypair,
};
use crate::error::{RecordError, Result, ValidationError};
use crate::field::keys;
use crate::record::NodeRecord;
use crate::types::NodeId;

const SIGNATURE_LEN: usize = 64;

#[derive(Debug, Clone, Copy, Default)]
pub struct V4Scheme;

impl V4Scheme {
    pub const ID: &'static str = "v4";

    pub fn new() -> Self {
        Self
    }
}

impl IdentityScheme for V4Scheme {
    fn scheme_id(&self) -> &'static str {
        Self::ID
    }

    fn public_key_field(&self) -> &'static str {
        keys::SECP256K1
    }

    fn signature_len(&self) -> usize {
        SIGNATURE_LEN
    }

    fn public_key_from_private(&self, private_key: &[u8]) -> Result<Bytes> {
        let keypair = Secp256k1Keypair::from_bytes(private_key)?;
        Ok(Bytes::copy_from_slice(&keypair.public_key()))
    }

    fn verify(&self, record: &NodeRecord) -> std::result::Result<(), ValidationError> {
        check_scheme_id(record, Self::ID)?;
        let key = public_key_bytes(record, keys::SECP256K1).and_then(|bytes| {
            secp256k1_verifying_key(bytes).ok_or(ValidationError::InvalidPublicKey)
        })?;
        check_signature_len(record, SIGNATURE_LEN)?;

        let digest = keccak256(&record.serialize_no_signature()?);
        if !secp256k1_verify(&key, &digest, record.signature()) {
            return Err(ValidationError::SignatureFailed);
        }
        Ok(())
    }

    fn sign(&self, record: &mut NodeRecord, private_key: &[u8]) -> Result<()> {
        let keypair = Secp256k1Keypair::from_bytes(private_key)?;
        let digest = keccak256(&record.serialize_no_signature()?);
        let signature = keypair.sign_digest(&digest)?;
        record.set_signature(Bytes::copy_from_slice(&signature));
        Ok(())
    }

    fn node_id(&self, record: &NodeRecord) -> Result<NodeId> {
        let bytes = public_key_bytes(record, keys::SECP256K1).map_err(|e| match e {
            ValidationError::MissingField(field) => RecordError::MissingRequiredField(field.into()),
            _ => RecordError::InvalidPublicKey,
        })?;
        let key = secp256k1_verifying_key(bytes).ok_or(RecordError::InvalidPublicKey)?;
        Ok(NodeId(keccak256(&secp256k1_uncompressed_xy(&key))))
    }
}
