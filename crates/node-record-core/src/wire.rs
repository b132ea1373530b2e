//! Strict RLP reading on top of the `rlp` crate.
//!
//! `rlp::Rlp` is a lazy view. It never looks past the first item, and a value
//! read directly with `as_val` tolerates a long-form header on a payload that
//! fits the short form. The helpers here close those gaps, so every accepted
//! item re-encodes byte for byte. Items reached through a list are already
//! held to canonical headers by the crate.

use rlp::DecoderError;

use crate::error::RlpError;

pub use rlp::{Rlp, RlpStream};

/// Longest payload that fits the single-byte header form.
const SHORT_LIMIT: u8 = 55;

/// View `input` as exactly one canonical item.
pub fn decode_exact(input: &[u8]) -> Result<Rlp<'_>, RlpError> {
    check_long_header(input)?;

    let rlp = Rlp::new(input);
    let total = rlp.payload_info()?.total();
    if total < input.len() {
        return Err(RlpError::TrailingBytes(input.len() - total));
    }
    Ok(rlp)
}

/// Reject a long-form header whose length would fit the short form.
fn check_long_header(input: &[u8]) -> Result<(), RlpError> {
    let len_of_len = match input.first().copied() {
        Some(first @ 0xb8..=0xbf) => first - 0xb7,
        Some(first @ 0xf8..=0xff) => first - 0xf7,
        _ => return Ok(()),
    };
    // Wider lengths start with a non-zero byte or are refused by the crate
    if len_of_len == 1 && input.get(1).is_some_and(|len| *len <= SHORT_LIMIT) {
        return Err(RlpError::NonCanonicalLength);
    }
    Ok(())
}

/// The items of a list.
///
/// Unlike `Rlp::iter`, which stops quietly at the first bad item, this fails
/// unless the items exactly cover the list payload.
pub fn list_items<'a>(item: &Rlp<'a>) -> Result<Vec<Rlp<'a>>, RlpError> {
    if !item.is_list() {
        return Err(DecoderError::RlpExpectedToBeList.into());
    }

    let payload_len = item.payload_info()?.value_len;
    let mut items = Vec::new();
    let mut consumed = 0;
    while consumed < payload_len {
        let next = item.at(items.len())?;
        consumed += next.as_raw().len();
        items.push(next);
    }
    Ok(items)
}

/// The payload of a byte-string item, borrowed from the input.
pub fn bytes<'a>(item: &Rlp<'a>) -> Result<&'a [u8], RlpError> {
    // decode_value refuses lists and a single byte below 0x80 behind a header
    item.decoder().decode_value(|_| Ok(()))?;
    Ok(item.data()?)
}

/// An unsigned scalar, minimally encoded.
pub fn uint(item: &Rlp<'_>) -> Result<u64, RlpError> {
    Ok(item.as_val::<u64>()?)
}

/// Check an item and everything nested in it.
pub fn check_canonical(item: &Rlp<'_>) -> Result<(), RlpError> {
    if item.is_list() {
        for nested in list_items(item)? {
            check_canonical(&nested)?;
        }
        return Ok(());
    }
    bytes(item).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn list_of(items: &[&[u8]]) -> Vec<u8> {
        let mut stream = RlpStream::new_list(items.len());
        for item in items {
            stream.append(item);
        }
        stream.out().to_vec()
    }

    #[test]
    fn test_scalar_encoding() {
        assert_eq!(rlp::encode(&0u64).to_vec(), vec![0x80]);
        assert_eq!(rlp::encode(&0x7fu64).to_vec(), vec![0x7f]);
        assert_eq!(rlp::encode(&0x80u64).to_vec(), vec![0x81, 0x80]);
        assert_eq!(rlp::encode(&30303u64).to_vec(), vec![0x82, 0x76, 0x5f]);
    }

    #[test]
    fn test_long_list_header() {
        let big = [0xaau8; 60];
        let encoded = list_of(&[&big[..], &big[..]]);
        assert_eq!(&encoded[..2], &[0xf8, 124]);

        let item = decode_exact(&encoded).unwrap();
        let items = list_items(&item).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(bytes(&items[1]).unwrap(), &big[..]);
    }

    #[test]
    fn test_decode_list_items() {
        let mut stream = RlpStream::new_list(2);
        stream.append(&30303u64).append(&&[0x7fu8, 0x00, 0x00, 0x01][..]);
        let encoded = stream.out().to_vec();

        let item = decode_exact(&encoded).unwrap();
        let items = list_items(&item).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(uint(&items[0]).unwrap(), 30303);
        assert_eq!(items[1].as_raw(), &[0x84, 0x7f, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn test_long_form_for_short_payload_rejected() {
        assert_eq!(
            decode_exact(&[0xb8, 0x02, 0xaa, 0xbb]).unwrap_err(),
            RlpError::NonCanonicalLength
        );

        let mut short_list = vec![0xf8, 0x03];
        short_list.extend_from_slice(&[0x01, 0x02, 0x03]);
        assert_eq!(
            decode_exact(&short_list).unwrap_err(),
            RlpError::NonCanonicalLength
        );

        // Nested inside a list, the crate catches it on its own
        let nested = [0xc4, 0xb8, 0x02, 0xaa, 0xbb];
        let item = decode_exact(&nested).unwrap();
        assert!(list_items(&item).is_err());
    }

    #[test]
    fn test_wrapped_single_byte_rejected() {
        let item = decode_exact(&[0x81, 0x05]).unwrap();
        assert!(bytes(&item).is_err());

        let in_list = decode_exact(&[0xc2, 0x81, 0x05]).unwrap();
        assert!(check_canonical(&in_list).is_err());
    }

    #[test]
    fn test_scalar_leading_zero_rejected() {
        let item = decode_exact(&[0x82, 0x00, 0x01]).unwrap();
        assert!(uint(&item).is_err());

        let item = decode_exact(&[0x00]).unwrap();
        assert!(uint(&item).is_err());
    }

    #[test]
    fn test_truncated_and_trailing() {
        assert!(decode_exact(&[0x83, 0x01]).is_err());
        assert_eq!(
            decode_exact(&[0x01, 0x02]).unwrap_err(),
            RlpError::TrailingBytes(1)
        );
    }

    #[test]
    fn test_overhanging_item_rejected() {
        // List payload of 2 bytes holding a 3-byte string
        let item = decode_exact(&[0xc2, 0x82, 0x01]).unwrap();
        assert!(matches!(list_items(&item), Err(RlpError::Decoder(_))));

        let input = [0xc3, 0x01, 0x83, 0x01, 0x02];
        let cut = Rlp::new(&input);
        assert!(list_items(&cut).is_err());
    }

    #[test]
    fn test_type_mismatch() {
        let list = decode_exact(&[0xc0]).unwrap();
        assert!(bytes(&list).is_err());
        assert!(list_items(&list).unwrap().is_empty());

        let empty = decode_exact(&[0x80]).unwrap();
        assert_eq!(
            list_items(&empty).unwrap_err(),
            RlpError::Decoder(DecoderError::RlpExpectedToBeList)
        );
        assert_eq!(bytes(&empty).unwrap(), &[] as &[u8]);
    }

    fn reencode(item: &Rlp<'_>, stream: &mut RlpStream) {
        if item.is_list() {
            let items = list_items(item).unwrap();
            stream.begin_list(items.len());
            for nested in &items {
                reencode(nested, stream);
            }
        } else {
            stream.append(&bytes(item).unwrap());
        }
    }

    proptest! {
        #[test]
        fn test_accepted_input_reencodes_identically(
            input in prop::collection::vec(any::<u8>(), 0..64),
        ) {
            let Ok(item) = decode_exact(&input) else {
                return Ok(());
            };
            if check_canonical(&item).is_err() {
                return Ok(());
            }

            let mut stream = RlpStream::new();
            reencode(&item, &mut stream);
            prop_assert_eq!(stream.out().to_vec(), input);
        }

        #[test]
        fn test_stream_output_is_accepted(
            items in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..70), 0..4),
        ) {
            let mut stream = RlpStream::new_list(items.len());
            for item in &items {
                stream.append(item);
            }
            let encoded = stream.out().to_vec();

            let list = decode_exact(&encoded).unwrap();
            prop_assert!(check_canonical(&list).is_ok());
            let decoded: Vec<&[u8]> = list_items(&list)
                .unwrap()
                .iter()
                .map(|item| bytes(item).unwrap())
                .collect();
            prop_assert_eq!(decoded, items.iter().map(Vec::as_slice).collect::<Vec<_>>());
        }
    }
}
