//! Identity schemes.
//!
//! A scheme owns everything cryptographic about a record: how it is signed
//! and verified, how the node id is derived, and which fields carry its
//! public key. Records name their scheme in the `id` field; the
//! [`SchemeRegistry`] maps those names to implementations.
//!
//! Both built-in schemes resolve addresses the same way: the IPv4 pair
//! (`ip` with `udp`/`tcp`) is preferred, then the IPv6 pair (`ip6` with
//! `udp6`/`tcp6`).

mod ed25519;
mod registry;
mod v4;

pub use ed25519::Ed25519Scheme;
pub use registry::SchemeRegistry;
pub use v4::V4Scheme;

use bytes::Bytes;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::error::{Result, ValidationError};
use crate::field::{keys, FieldValue};
use crate::record::NodeRecord;
use crate::types::NodeId;

/// A pluggable identity scheme.
pub trait IdentityScheme: Send + Sync + fmt::Debug {
    /// The value of the `id` field for records of this scheme.
    fn scheme_id(&self) -> &'static str;

    /// The field holding the public key.
    fn public_key_field(&self) -> &'static str;

    /// Length of a signature, and of the unsigned placeholder.
    fn signature_len(&self) -> usize;

    /// Encoded public key for a secret key, as stored in the record.
    fn public_key_from_private(&self, private_key: &[u8]) -> Result<Bytes>;

    /// Check scheme id, public key and signature.
    fn verify(&self, record: &NodeRecord) -> std::result::Result<(), ValidationError>;

    fn is_valid(&self, record: &NodeRecord) -> bool {
        self.verify(record).is_ok()
    }

    /// Sign the record's content and store the signature.
    fn sign(&self, record: &mut NodeRecord, private_key: &[u8]) -> Result<()>;

    /// Derive the node id from the public key field.
    fn node_id(&self, record: &NodeRecord) -> Result<NodeId>;

    fn tcp_address(&self, record: &NodeRecord) -> Option<SocketAddr> {
        socket_address(record, keys::TCP, keys::TCP6)
    }

    fn udp_address(&self, record: &NodeRecord) -> Option<SocketAddr> {
        socket_address(record, keys::UDP, keys::UDP6)
    }

    /// Produce the next version of `record` with a new address, signed.
    ///
    /// The sequence number advances by one. The IP and UDP fields of the
    /// address family of `udp` are replaced; the TCP field of that family only
    /// when `tcp_port` is given. Fields of the other family are kept.
    fn create_with_new_address(
        &self,
        record: &NodeRecord,
        udp: SocketAddr,
        tcp_port: Option<u16>,
        private_key: &[u8],
    ) -> Result<NodeRecord> {
        let (ip_key, udp_key, tcp_key) = match udp.ip() {
            IpAddr::V4(_) => (keys::IP, keys::UDP, keys::TCP),
            IpAddr::V6(_) => (keys::IP6, keys::UDP6, keys::TCP6),
        };

        let mut next = record.next_version()?;
        next.set(ip_key, udp.ip())?;
        next.set(udp_key, udp.port())?;
        if let Some(port) = tcp_port {
            next.set(tcp_key, port)?;
        }
        next.sign(private_key)?;
        Ok(next)
    }

    /// Produce the next version of `record` with one field replaced, signed.
    fn create_with_updated_field(
        &self,
        record: &NodeRecord,
        name: &str,
        value: FieldValue,
        private_key: &[u8],
    ) -> Result<NodeRecord> {
        let mut next = record.next_version()?;
        next.set(name, value)?;
        next.sign(private_key)?;
        Ok(next)
    }
}

/// Resolve an address from the IPv4 pair, falling back to the IPv6 pair.
pub fn socket_address(record: &NodeRecord, port4: &str, port6: &str) -> Option<SocketAddr> {
    let pair = |ip_key: &str, port_key: &str, want_v4: bool| {
        let ip = record
            .get(ip_key)
            .and_then(FieldValue::as_ip)
            .filter(|ip| ip.is_ipv4() == want_v4)?;
        let port = record.get(port_key).and_then(FieldValue::as_port)?;
        Some(SocketAddr::new(ip, port))
    };

    pair(keys::IP, port4, true).or_else(|| pair(keys::IP6, port6, false))
}

/// Fail unless the record's `id` field names `expected`.
pub(crate) fn check_scheme_id(
    record: &NodeRecord,
    expected: &'static str,
) -> std::result::Result<(), ValidationError> {
    let found = record.get(keys::ID).and_then(FieldValue::as_text);
    if found == Some(expected) {
        return Ok(());
    }
    Err(ValidationError::SchemeMismatch {
        expected,
        found: found.map(str::to_string),
    })
}

/// The raw bytes of the public key field.
pub(crate) fn public_key_bytes<'a>(
    record: &'a NodeRecord,
    field: &'static str,
) -> std::result::Result<&'a [u8], ValidationError> {
    match record.get(field) {
        Some(FieldValue::Bytes(bytes)) => Ok(&bytes[..]),
        Some(_) => Err(ValidationError::InvalidPublicKey),
        None => Err(ValidationError::MissingField(field)),
    }
}

/// Fail unless the signature has the scheme's fixed length.
pub(crate) fn check_signature_len(
    record: &NodeRecord,
    expected: usize,
) -> std::result::Result<(), ValidationError> {
    let got = record.signature().len();
    if got != expected {
        return Err(ValidationError::SignatureLength { expected, got });
    }
    Ok(())
}
