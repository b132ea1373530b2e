//! Field values and well-known field names.

use bytes::Bytes;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Well-known record keys.
pub mod keys {
    /// Identity scheme name.
    pub const ID: &str = "id";
    /// Compressed secp256k1 public key (33 bytes).
    pub const SECP256K1: &str = "secp256k1";
    /// Ed25519 public key (32 bytes).
    pub const ED25519: &str = "ed25519";
    /// IPv4 address (4 bytes).
    pub const IP: &str = "ip";
    /// IPv6 address (16 bytes).
    pub const IP6: &str = "ip6";
    /// TCP port for the IPv4 address.
    pub const TCP: &str = "tcp";
    /// UDP port for the IPv4 address.
    pub const UDP: &str = "udp";
    /// TCP port for the IPv6 address.
    pub const TCP6: &str = "tcp6";
    /// UDP port for the IPv6 address.
    pub const UDP6: &str = "udp6";
}

/// The value of a record field.
///
/// Well-known keys decode into the typed variants; anything else is kept as
/// opaque bytes, or as a verbatim RLP item when the wire value is a list.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    /// UTF-8 text, e.g. the scheme name under `id`.
    Text(String),
    /// Raw bytes: public keys and unrecognised byte-string values.
    Bytes(Bytes),
    /// Unsigned scalar, e.g. ports.
    Uint(u64),
    /// An IPv4 or IPv6 address.
    Ip(IpAddr),
    /// A complete RLP item written to the encoding as-is.
    Rlp(Bytes),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Self::Uint(n) => Some(*n),
            _ => None,
        }
    }

    /// The value as a port, if it is a scalar that fits 16 bits.
    pub fn as_port(&self) -> Option<u16> {
        self.as_uint().and_then(|n| u16::try_from(n).ok())
    }

    pub fn as_ip(&self) -> Option<IpAddr> {
        match self {
            Self::Ip(ip) => Some(*ip),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Uint(_) => "uint",
            Self::Ip(_) => "ip",
            Self::Rlp(_) => "rlp",
        }
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{:?}", s),
            Self::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            Self::Uint(n) => write!(f, "{}", n),
            Self::Ip(ip) => write!(f, "{}", ip),
            Self::Rlp(b) => write!(f, "rlp(0x{})", hex::encode(b)),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Bytes> for FieldValue {
    fn from(b: Bytes) -> Self {
        Self::Bytes(b)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b.into())
    }
}

impl From<&[u8]> for FieldValue {
    fn from(b: &[u8]) -> Self {
        Self::Bytes(Bytes::copy_from_slice(b))
    }
}

impl From<u16> for FieldValue {
    fn from(n: u16) -> Self {
        Self::Uint(n.into())
    }
}

impl From<u64> for FieldValue {
    fn from(n: u64) -> Self {
        Self::Uint(n)
    }
}

impl From<IpAddr> for FieldValue {
    fn from(ip: IpAddr) -> Self {
        Self::Ip(ip)
    }
}

impl From<Ipv4Addr> for FieldValue {
    fn from(ip: Ipv4Addr) -> Self {
        Self::Ip(ip.into())
    }
}

impl From<Ipv6Addr> for FieldValue {
    fn from(ip: Ipv6Addr) -> Self {
        Self::Ip(ip.into())
    }
}

/// A named field used when constructing a record from a list of pairs.
///
/// A `None` value is a tombstone: the key stays in the record but is never
/// encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: Option<FieldValue>,
}

impl Field {
    /// Create a field with a value.
    pub fn new(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Create a tombstoned field.
    pub fn tombstone(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }
}
