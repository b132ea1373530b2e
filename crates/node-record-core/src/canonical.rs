//! Canonical RLP encoding for deterministic serialization.
//!
//! A record is encoded as the RLP list
//!
//! ```text
//! content = [seq, k1, v1, ..., kn, vn]
//! record  = [signature, seq, k1, v1, ..., kn, vn]
//! ```
//!
//! - Keys appear in strictly ascending byte order, each at most once
//! - Tombstoned fields (no value) are omitted, key and value
//! - Sequence numbers use the minimal scalar encoding
//! - The complete encoding never exceeds [`MAX_ENCODED_SIZE`] bytes
//!
//! The signature is computed over `content`, so the same logical record
//! produces identical bytes (and thus identical signatures) everywhere.

use crate::error::{RecordError, Result};
use crate::field::keys;
use crate::record::NodeRecord;
use crate::wire::{self, Rlp, RlpStream};

/// Maximum size of an encoded record, with or without signature.
pub const MAX_ENCODED_SIZE: usize = 300;

/// Encode a record, optionally including its signature.
///
/// Fails with [`RecordError::EncodingSizeExceeded`] if the result would be
/// larger than [`MAX_ENCODED_SIZE`]; nothing is truncated.
pub fn encode_record(record: &NodeRecord, include_signature: bool) -> Result<Vec<u8>> {
    let mut stream = RlpStream::new();
    stream.begin_unbounded_list();

    if include_signature {
        stream.append(&record.signature());
    }
    stream.append(&record.seq());

    // Field map iterates in ascending key order
    for (key, value) in record.fields() {
        let Some(value) = value else {
            continue;
        };
        stream.append(&key);
        record.codec().encode(key, value, &mut stream)?;
    }
    stream.finalize_unbounded_list();

    let buf = stream.out().to_vec();
    if buf.len() > MAX_ENCODED_SIZE {
        return Err(RecordError::EncodingSizeExceeded {
            size: buf.len(),
            max: MAX_ENCODED_SIZE,
        });
    }
    Ok(buf)
}

/// The signing preimage: the encoding without signature.
pub fn content_bytes(record: &NodeRecord) -> Result<Vec<u8>> {
    encode_record(record, false)
}

/// A record split into its wire components, values not yet interpreted.
#[derive(Debug, Clone)]
pub struct RawRecord<'a> {
    pub signature: &'a [u8],
    pub seq: u64,
    pub fields: Vec<(&'a str, Rlp<'a>)>,
}

impl<'a> RawRecord<'a> {
    /// The scheme name carried under `id`, if present and valid UTF-8.
    pub fn scheme_id(&self) -> Option<&'a str> {
        self.fields
            .iter()
            .find(|(key, _)| *key == keys::ID)
            .and_then(|(_, item)| wire::bytes(item).ok())
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }
}

/// Split a canonical encoding into signature, sequence and raw fields.
///
/// Enforces the size bound, key ordering and uniqueness. Field values are
/// left for the field codec.
pub fn decode_raw_record(bytes: &[u8]) -> Result<RawRecord<'_>> {
    if bytes.len() > MAX_ENCODED_SIZE {
        return Err(RecordError::EncodingSizeExceeded {
            size: bytes.len(),
            max: MAX_ENCODED_SIZE,
        });
    }

    let list = wire::decode_exact(bytes)?;
    let mut items = wire::list_items(&list)?.into_iter();

    let signature = items
        .next()
        .ok_or_else(|| RecordError::MissingRequiredField("signature".into()))?;
    let signature = wire::bytes(&signature)?;
    let seq = items
        .next()
        .ok_or_else(|| RecordError::MissingRequiredField("seq".into()))?;
    let seq = wire::uint(&seq)?;

    let mut fields: Vec<(&str, Rlp<'_>)> = Vec::with_capacity(items.len() / 2);
    while let Some(key_item) = items.next() {
        let value = items
            .next()
            .ok_or_else(|| RecordError::Malformed("key without value".into()))?;

        let key_bytes = wire::bytes(&key_item)?;
        let key = std::str::from_utf8(key_bytes)
            .map_err(|_| RecordError::Malformed("key is not valid utf-8".into()))?;

        if let Some((prev, _)) = fields.last() {
            if prev.as_bytes() >= key_bytes {
                return Err(RecordError::Malformed(format!(
                    "keys out of order or duplicated: {:?} then {:?}",
                    prev, key
                )));
            }
        }
        fields.push((key, value));
    }

    Ok(RawRecord {
        signature,
        seq,
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::DefaultFieldCodec;
    use crate::field::{Field, FieldValue};
    use crate::scheme::V4Scheme;
    use std::net::Ipv4Addr;
    use std::sync::Arc;

    fn record_with(seq: u64, fields: Vec<Field>) -> NodeRecord {
        NodeRecord::from_values(
            Arc::new(V4Scheme::new()),
            Arc::new(DefaultFieldCodec::new()),
            seq,
            fields,
        )
    }

    fn encode_list_of(items: &[&[u8]]) -> Vec<u8> {
        let mut stream = RlpStream::new_list(items.len());
        for item in items {
            stream.append_raw(item, 1);
        }
        stream.out().to_vec()
    }

    #[test]
    fn test_content_layout() {
        let record = record_with(
            1,
            vec![
                Field::new("udp", 30303u16),
                Field::new("id", "v4"),
                Field::new("ip", Ipv4Addr::new(127, 0, 0, 1)),
            ],
        );

        let content = content_bytes(&record).unwrap();

        let mut payload = vec![0x01];
        payload.extend_from_slice(&[0x82, b'i', b'd', 0x82, b'v', b'4']);
        payload.extend_from_slice(&[0x82, b'i', b'p', 0x84, 127, 0, 0, 1]);
        payload.extend_from_slice(&[0x83, b'u', b'd', b'p', 0x82, 0x76, 0x5f]);
        let mut want = vec![0xc0 + payload.len() as u8];
        want.extend_from_slice(&payload);

        assert_eq!(content, want);
    }

    #[test]
    fn test_signature_prefixes_content() {
        let record = record_with(7, vec![Field::new("id", "v4")]);

        let with_sig = encode_record(&record, true).unwrap();
        let without = encode_record(&record, false).unwrap();

        let list = wire::decode_exact(&with_sig).unwrap();
        let items = wire::list_items(&list).unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(wire::bytes(&items[0]).unwrap(), &[0u8; 64][..]);
        assert_eq!(wire::uint(&items[1]).unwrap(), 7);

        let list = wire::decode_exact(&without).unwrap();
        let content_items = wire::list_items(&list).unwrap();
        assert_eq!(content_items.len(), 3);
        assert_eq!(wire::uint(&content_items[0]).unwrap(), 7);
    }

    #[test]
    fn test_tombstones_not_encoded() {
        let plain = record_with(1, vec![Field::new("id", "v4")]);
        let tombstoned = record_with(
            1,
            vec![Field::new("id", "v4"), Field::tombstone("eth2")],
        );

        assert!(tombstoned.contains("eth2"));
        assert_eq!(
            encode_record(&plain, true).unwrap(),
            encode_record(&tombstoned, true).unwrap()
        );
    }

    #[test]
    fn test_size_limit_enforced() {
        let record = record_with(
            1,
            vec![
                Field::new("id", "v4"),
                Field::new("blob", vec![0xaa; 240]),
            ],
        );

        // Content alone fits; with a 64-byte signature it does not
        assert!(encode_record(&record, false).is_ok());
        let err = encode_record(&record, true).unwrap_err();
        assert!(matches!(
            err,
            RecordError::EncodingSizeExceeded { max: MAX_ENCODED_SIZE, .. }
        ));
    }

    #[test]
    fn test_decode_raw_record() {
        let record = record_with(
            3,
            vec![
                Field::new("id", "v4"),
                Field::new("tcp", 30303u16),
                Field::new("custom", vec![1, 2]),
            ],
        );
        let bytes = encode_record(&record, true).unwrap();

        let raw = decode_raw_record(&bytes).unwrap();
        assert_eq!(raw.seq, 3);
        assert_eq!(raw.signature, &[0u8; 64][..]);
        assert_eq!(raw.scheme_id(), Some("v4"));
        let keys: Vec<&str> = raw.fields.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["custom", "id", "tcp"]);
    }

    #[test]
    fn test_decode_rejects_unsorted_keys() {
        let seq = rlp::encode(&1u64);
        let sig = rlp::encode(&vec![0u8; 64]);
        let k1 = rlp::encode(&"udp");
        let k2 = rlp::encode(&"id");
        let v = rlp::encode(&1u64);

        let unsorted = encode_list_of(&[&sig[..], &seq[..], &k1[..], &v[..], &k2[..], &v[..]]);
        assert!(matches!(
            decode_raw_record(&unsorted),
            Err(RecordError::Malformed(_))
        ));

        let duplicated = encode_list_of(&[&sig[..], &seq[..], &k2[..], &v[..], &k2[..], &v[..]]);
        assert!(matches!(
            decode_raw_record(&duplicated),
            Err(RecordError::Malformed(_))
        ));

        let dangling = encode_list_of(&[&sig[..], &seq[..], &k2[..]]);
        assert!(matches!(
            decode_raw_record(&dangling),
            Err(RecordError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_requires_seq() {
        let sig = rlp::encode(&vec![0u8; 64]);
        let only_sig = encode_list_of(&[&sig[..]]);
        match decode_raw_record(&only_sig) {
            Err(RecordError::MissingRequiredField(name)) => assert_eq!(name, "seq"),
            other => panic!("expected missing seq, got {:?}", other),
        }

        assert!(matches!(
            decode_raw_record(&encode_list_of(&[])),
            Err(RecordError::MissingRequiredField(_))
        ));
    }

    #[test]
    fn test_decode_rejects_oversized_input() {
        let bytes = vec![0u8; MAX_ENCODED_SIZE + 1];
        assert!(matches!(
            decode_raw_record(&bytes),
            Err(RecordError::EncodingSizeExceeded { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_non_list() {
        let buf = rlp::encode(&"not a record");
        assert!(matches!(decode_raw_record(&buf), Err(RecordError::Rlp(_))));
    }

    #[test]
    fn test_field_type_mismatch_surfaces() {
        let mut record = record_with(1, vec![Field::new("id", "v4")]);
        record.set("udp", FieldValue::from("not a port")).unwrap();
        assert!(matches!(
            encode_record(&record, true),
            Err(RecordError::Field(_))
        ));
    }
}
