//! Field codec: typed encode/decode of record values by key.
//!
//! The codec is a stateless strategy injected into every record. Keys it does
//! not recognise pass through unchanged: byte strings become
//! [`FieldValue::Bytes`], nested lists are kept verbatim as [`FieldValue::Rlp`].

use bytes::Bytes;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::error::FieldError;
use crate::field::{keys, FieldValue};
use crate::wire::{self, Rlp, RlpStream};

/// Per-key conversion between wire items and [`FieldValue`]s.
pub trait FieldCodec: Send + Sync + fmt::Debug {
    /// Interpret a decoded RLP item stored under `key`.
    fn decode(&self, key: &str, item: &Rlp<'_>) -> Result<FieldValue, FieldError>;

    /// Append `value` stored under `key` to `stream` as exactly one item.
    fn encode(&self, key: &str, value: &FieldValue, stream: &mut RlpStream)
        -> Result<(), FieldError>;
}

/// The shape expected for a well-known key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// UTF-8 text.
    Text,
    /// A byte string of exactly this many bytes.
    FixedBytes(usize),
    /// A 4-byte IPv4 address.
    Ipv4,
    /// A 16-byte IPv6 address.
    Ipv6,
    /// A 16-bit port.
    Port,
}

/// Registry of the well-known keys.
const WELL_KNOWN: &[(&str, FieldKind)] = &[
    (keys::ID, FieldKind::Text),
    (keys::SECP256K1, FieldKind::FixedBytes(33)),
    (keys::ED25519, FieldKind::FixedBytes(32)),
    (keys::IP, FieldKind::Ipv4),
    (keys::IP6, FieldKind::Ipv6),
    (keys::TCP, FieldKind::Port),
    (keys::UDP, FieldKind::Port),
    (keys::TCP6, FieldKind::Port),
    (keys::UDP6, FieldKind::Port),
];

/// The default codec for the well-known keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFieldCodec;

impl DefaultFieldCodec {
    pub fn new() -> Self {
        Self
    }

    /// The expected shape of `key`, if it is well-known.
    pub fn kind_of(key: &str) -> Option<FieldKind> {
        WELL_KNOWN
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, kind)| *kind)
    }
}

impl FieldCodec for DefaultFieldCodec {
    fn decode(&self, key: &str, item: &Rlp<'_>) -> Result<FieldValue, FieldError> {
        let Some(kind) = Self::kind_of(key) else {
            return decode_opaque(key, item);
        };

        let malformed = |reason: String| FieldError::malformed(key, reason);
        let bytes = || wire::bytes(item).map_err(|e| malformed(e.to_string()));

        match kind {
            FieldKind::Port => item
                .as_val::<u16>()
                .map(|port| FieldValue::Uint(port.into()))
                .map_err(|e| malformed(e.to_string())),
            FieldKind::Text => std::str::from_utf8(bytes()?)
                .map(|s| FieldValue::Text(s.to_string()))
                .map_err(|_| FieldError::malformed(key, "not valid utf-8")),
            FieldKind::FixedBytes(len) => {
                let bytes = bytes()?;
                if bytes.len() != len {
                    return Err(FieldError::malformed(
                        key,
                        format!("expected {} bytes, got {}", len, bytes.len()),
                    ));
                }
                Ok(FieldValue::Bytes(Bytes::copy_from_slice(bytes)))
            }
            FieldKind::Ipv4 => {
                let octets: [u8; 4] = bytes()?
                    .try_into()
                    .map_err(|_| FieldError::malformed(key, "expected 4-byte address"))?;
                Ok(FieldValue::Ip(IpAddr::V4(Ipv4Addr::from(octets))))
            }
            FieldKind::Ipv6 => {
                let octets: [u8; 16] = bytes()?
                    .try_into()
                    .map_err(|_| FieldError::malformed(key, "expected 16-byte address"))?;
                Ok(FieldValue::Ip(IpAddr::V6(Ipv6Addr::from(octets))))
            }
        }
    }

    fn encode(
        &self,
        key: &str,
        value: &FieldValue,
        stream: &mut RlpStream,
    ) -> Result<(), FieldError> {
        match (Self::kind_of(key), value) {
            (None, value) => encode_opaque(key, value, stream),
            (Some(FieldKind::Text), FieldValue::Text(s)) => {
                stream.append(s);
                Ok(())
            }
            (Some(FieldKind::Text), _) => Err(FieldError::mismatch(key, "text")),
            (Some(FieldKind::FixedBytes(len)), FieldValue::Bytes(b)) if b.len() == len => {
                stream.append(b);
                Ok(())
            }
            (Some(FieldKind::FixedBytes(_)), _) => {
                Err(FieldError::mismatch(key, "fixed-length key bytes"))
            }
            (Some(FieldKind::Ipv4), FieldValue::Ip(IpAddr::V4(ip))) => {
                stream.append(&ip.octets().as_slice());
                Ok(())
            }
            (Some(FieldKind::Ipv4), _) => Err(FieldError::mismatch(key, "ipv4 address")),
            (Some(FieldKind::Ipv6), FieldValue::Ip(IpAddr::V6(ip))) => {
                stream.append(&ip.octets().as_slice());
                Ok(())
            }
            (Some(FieldKind::Ipv6), _) => Err(FieldError::mismatch(key, "ipv6 address")),
            (Some(FieldKind::Port), FieldValue::Uint(n)) if *n <= u64::from(u16::MAX) => {
                stream.append(n);
                Ok(())
            }
            (Some(FieldKind::Port), _) => Err(FieldError::mismatch(key, "16-bit port")),
        }
    }
}

/// Decode a value under a key the registry does not know.
fn decode_opaque(key: &str, item: &Rlp<'_>) -> Result<FieldValue, FieldError> {
    if item.is_list() {
        wire::check_canonical(item).map_err(|e| FieldError::malformed(key, e.to_string()))?;
        return Ok(FieldValue::Rlp(Bytes::copy_from_slice(item.as_raw())));
    }
    wire::bytes(item)
        .map(|bytes| FieldValue::Bytes(Bytes::copy_from_slice(bytes)))
        .map_err(|e| FieldError::malformed(key, e.to_string()))
}

/// Encode a value under a key the registry does not know.
fn encode_opaque(key: &str, value: &FieldValue, stream: &mut RlpStream) -> Result<(), FieldError> {
    match value {
        FieldValue::Text(s) => stream.append(s),
        FieldValue::Bytes(b) => stream.append(b),
        FieldValue::Uint(n) => stream.append(n),
        FieldValue::Ip(IpAddr::V4(ip)) => stream.append(&ip.octets().as_slice()),
        FieldValue::Ip(IpAddr::V6(ip)) => stream.append(&ip.octets().as_slice()),
        FieldValue::Rlp(raw) => {
            wire::decode_exact(raw)
                .and_then(|item| wire::check_canonical(&item))
                .map_err(|e| FieldError::malformed(key, e.to_string()))?;
            stream.append_raw(raw, 1)
        }
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::decode_exact;
    use proptest::prelude::*;

    fn encode_one(key: &str, value: &FieldValue) -> Result<Vec<u8>, FieldError> {
        let mut stream = RlpStream::new();
        DefaultFieldCodec::new().encode(key, value, &mut stream)?;
        Ok(stream.out().to_vec())
    }

    fn roundtrip(key: &str, value: FieldValue) -> FieldValue {
        let encoded = encode_one(key, &value).unwrap();
        let item = decode_exact(&encoded).unwrap();
        DefaultFieldCodec::new().decode(key, &item).unwrap()
    }

    #[test]
    fn test_well_known_kinds() {
        assert_eq!(DefaultFieldCodec::kind_of("id"), Some(FieldKind::Text));
        assert_eq!(DefaultFieldCodec::kind_of("udp6"), Some(FieldKind::Port));
        assert_eq!(DefaultFieldCodec::kind_of("eth2"), None);
    }

    #[test]
    fn test_typed_values_survive_codec() {
        let ip = FieldValue::from(Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(roundtrip(keys::IP, ip.clone()), ip);

        let ip6 = FieldValue::from(Ipv6Addr::LOCALHOST);
        assert_eq!(roundtrip(keys::IP6, ip6.clone()), ip6);

        assert_eq!(roundtrip(keys::UDP, FieldValue::Uint(0)), FieldValue::Uint(0));
        assert_eq!(roundtrip(keys::ID, "v4".into()), FieldValue::from("v4"));
    }

    #[test]
    fn test_port_wire_form() {
        assert_eq!(
            encode_one(keys::UDP, &FieldValue::from(30303u16)).unwrap(),
            vec![0x82, 0x76, 0x5f]
        );
        assert_eq!(encode_one(keys::TCP, &FieldValue::Uint(0)).unwrap(), vec![0x80]);
    }

    #[test]
    fn test_unknown_key_passes_through() {
        let codec = DefaultFieldCodec::new();

        let item = decode_exact(&[0x83, 0x01, 0x02, 0x03]).unwrap();
        assert_eq!(
            codec.decode("eth2", &item).unwrap(),
            FieldValue::from(vec![1, 2, 3])
        );

        let list = [0xc3, 0x01, 0x02, 0x03];
        let item = decode_exact(&list).unwrap();
        let value = codec.decode("eth", &item).unwrap();
        assert_eq!(value, FieldValue::Rlp(Bytes::copy_from_slice(&list)));

        assert_eq!(encode_one("eth", &value).unwrap(), list);
    }

    #[test]
    fn test_decode_rejects_wrong_shapes() {
        let codec = DefaultFieldCodec::new();

        let short_ip = decode_exact(&[0x83, 127, 0, 1]).unwrap();
        assert!(matches!(
            codec.decode(keys::IP, &short_ip),
            Err(FieldError::Malformed { .. })
        ));

        let wide_port = decode_exact(&[0x83, 0x01, 0x00, 0x00]).unwrap();
        assert!(codec.decode(keys::UDP, &wide_port).is_err());

        let padded_port = decode_exact(&[0x82, 0x00, 0x50]).unwrap();
        assert!(codec.decode(keys::TCP, &padded_port).is_err());

        let short_key = decode_exact(&[0x82, 0x02, 0x03]).unwrap();
        assert!(codec.decode(keys::SECP256K1, &short_key).is_err());

        let list = decode_exact(&[0xc0]).unwrap();
        assert!(codec.decode(keys::ID, &list).is_err());

        let bad_utf8 = decode_exact(&[0x82, 0xff, 0xfe]).unwrap();
        assert!(codec.decode(keys::ID, &bad_utf8).is_err());

        let nested_wrapped_byte = decode_exact(&[0xc2, 0x81, 0x05]).unwrap();
        assert!(codec.decode("eth", &nested_wrapped_byte).is_err());
    }

    #[test]
    fn test_encode_rejects_type_mismatch() {
        let codec = DefaultFieldCodec::new();
        let mut stream = RlpStream::new();

        let err = codec
            .encode(keys::IP, &FieldValue::from(Ipv6Addr::LOCALHOST), &mut stream)
            .unwrap_err();
        assert_eq!(err, FieldError::mismatch(keys::IP, "ipv4 address"));

        assert!(codec
            .encode(keys::UDP, &FieldValue::Uint(70000), &mut stream)
            .is_err());
        assert!(codec.encode(keys::ID, &FieldValue::Uint(4), &mut stream).is_err());
        assert!(stream.is_empty());
    }

    #[test]
    fn test_invalid_verbatim_rlp_rejected() {
        let truncated = FieldValue::Rlp(Bytes::from_static(&[0xc5, 0x01]));
        assert!(encode_one("custom", &truncated).is_err());

        let wrapped_byte = FieldValue::Rlp(Bytes::from_static(&[0xc2, 0x81, 0x05]));
        assert!(encode_one("custom", &wrapped_byte).is_err());
    }

    /// A well-known key with a value of the shape it expects.
    fn well_known_value() -> impl Strategy<Value = (&'static str, FieldValue)> {
        prop_oneof![
            "\\PC{0,24}".prop_map(|s| (keys::ID, FieldValue::from(s))),
            prop::collection::vec(any::<u8>(), 33)
                .prop_map(|b| (keys::SECP256K1, FieldValue::from(b))),
            prop::collection::vec(any::<u8>(), 32)
                .prop_map(|b| (keys::ED25519, FieldValue::from(b))),
            any::<[u8; 4]>().prop_map(|b| (keys::IP, FieldValue::from(Ipv4Addr::from(b)))),
            any::<[u8; 16]>().prop_map(|b| (keys::IP6, FieldValue::from(Ipv6Addr::from(b)))),
            (
                prop::sample::select(vec![keys::TCP, keys::UDP, keys::TCP6, keys::UDP6]),
                any::<u16>()
            )
                .prop_map(|(key, port)| (key, FieldValue::from(port))),
        ]
    }

    proptest! {
        #[test]
        fn test_every_kind_survives_codec((key, value) in well_known_value()) {
            let encoded = encode_one(key, &value).unwrap();
            let item = decode_exact(&encoded).unwrap();
            prop_assert_eq!(item.as_raw().len(), encoded.len());
            prop_assert_eq!(DefaultFieldCodec::new().decode(key, &item).unwrap(), value);
        }

        #[test]
        fn test_opaque_bytes_survive_codec(bytes in prop::collection::vec(any::<u8>(), 0..80)) {
            let value = FieldValue::from(bytes.clone());
            let encoded = encode_one("x-opaque", &value).unwrap();
            let expected = rlp::encode(&bytes).to_vec();
            prop_assert_eq!(encoded, expected);
            prop_assert_eq!(roundtrip("x-opaque", value.clone()), value);
        }
    }
}
