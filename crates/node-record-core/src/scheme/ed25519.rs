//! The `ed25519` identity scheme.
//!
//! - Public key: 32-byte Ed25519 key under `ed25519`
//! - Signature: 64-byte Ed25519 signature over the raw content bytes
//! - Node id: Blake3 hash of the public key

use bytes::Bytes;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};

use super::{check_scheme_id, check_signature_len, public_key_bytes, IdentityScheme};
use crate::crypto::Ed25519Keypair;
use crate::error::{RecordError, Result, ValidationError};
use crate::field::keys;
use crate::record::NodeRecord;
use crate::types::NodeId;

const SIGNATURE_LEN: usize = 64;

#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Scheme;

impl Ed25519Scheme {
    pub const ID: &'static str = "ed25519";

    pub fn new() -> Self {
        Self
    }
}

fn verifying_key(bytes: &[u8]) -> Option<VerifyingKey> {
    let bytes: &[u8; 32] = bytes.try_into().ok()?;
    VerifyingKey::from_bytes(bytes).ok()
}

impl IdentityScheme for Ed25519Scheme {
    fn scheme_id(&self) -> &'static str {
        Self::ID
    }

    fn public_key_field(&self) -> &'static str {
        keys::ED25519
    }

    fn signature_len(&self) -> usize {
        SIGNATURE_LEN
    }

    fn public_key_from_private(&self, private_key: &[u8]) -> Result<Bytes> {
        let keypair = Ed25519Keypair::from_bytes(private_key)?;
        Ok(Bytes::copy_from_slice(&keypair.public_key()))
    }

    fn verify(&self, record: &NodeRecord) -> std::result::Result<(), ValidationError> {
        check_scheme_id(record, Self::ID)?;
        let key = public_key_bytes(record, keys::ED25519)
            .and_then(|bytes| verifying_key(bytes).ok_or(ValidationError::InvalidPublicKey))?;
        check_signature_len(record, SIGNATURE_LEN)?;

        let signature = Signature::from_slice(record.signature())
            .map_err(|_| ValidationError::SignatureFailed)?;
        let content = record.serialize_no_signature()?;
        key.verify(&content, &signature)
            .map_err(|_| ValidationError::SignatureFailed)
    }

    fn sign(&self, record: &mut NodeRecord, private_key: &[u8]) -> Result<()> {
        let keypair = Ed25519Keypair::from_bytes(private_key)?;
        let signature = keypair.sign(&record.serialize_no_signature()?);
        record.set_signature(Bytes::copy_from_slice(&signature));
        Ok(())
    }

    fn node_id(&self, record: &NodeRecord) -> Result<NodeId> {
        let bytes = public_key_bytes(record, keys::ED25519).map_err(|e| match e {
            ValidationError::MissingField(field) => RecordError::MissingRequiredField(field.into()),
            _ => RecordError::InvalidPublicKey,
        })?;
        if verifying_key(bytes).is_none() {
            return Err(RecordError::InvalidPublicKey);
        }
        Ok(NodeId(*blake3::hash(bytes).as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::DefaultFieldCodec;
    use crate::record::NodeRecordBuilder;
    use std::net::Ipv6Addr;
    use std::sync::Arc;

    const SEED: [u8; 32] = [0x42; 32];

    fn signed() -> NodeRecord {
        NodeRecordBuilder::new(
            Arc::new(Ed25519Scheme::new()),
            Arc::new(DefaultFieldCodec::new()),
            3,
        )
        .ip6(Ipv6Addr::LOCALHOST)
        .udp6(9000)
        .sign(&SEED)
        .unwrap()
    }

    #[test]
    fn test_sign_verify() {
        let record = signed();
        assert_eq!(record.verify(), Ok(()));
        assert_eq!(record.scheme_id(), "ed25519");
        assert_eq!(record.udp_address(), Some("[::1]:9000".parse().unwrap()));
    }

    #[test]
    fn test_node_id_is_blake3_of_key() {
        let record = signed();
        let public_key = Ed25519Keypair::from_seed(&SEED).public_key();
        assert_eq!(
            record.node_id().unwrap(),
            NodeId(*blake3::hash(&public_key).as_bytes())
        );
    }

    #[test]
    fn test_other_key_fails() {
        let record = signed();
        let mut forged = record.next_version().unwrap();
        forged.sign(&[0x43; 32]).unwrap();
        assert_eq!(forged.verify(), Err(ValidationError::SignatureFailed));
    }

    #[test]
    fn test_v4_record_rejected() {
        let record = signed();
        let mut relabeled = record.next_version().unwrap();
        relabeled.set(keys::ID, "v4").unwrap();
        relabeled.sign(&SEED).unwrap();
        assert!(matches!(
            relabeled.verify(),
            Err(ValidationError::SchemeMismatch { expected: "ed25519", .. })
        ));
    }

    #[test]
    fn test_update_keeps_identity() {
        let record = signed();
        let updated = record
            .with_new_address("[::2]:9001".parse().unwrap(), Some(9002), &SEED)
            .unwrap();
        assert!(updated.is_valid());
        assert_eq!(updated.seq(), 4);
        assert_eq!(updated.node_id().unwrap(), record.node_id().unwrap());
        assert_eq!(updated.tcp_address(), Some("[::2]:9002".parse().unwrap()));
    }
}
