//! # Node Record Core
//!
//! Pure primitives for signed, versioned node records: field values, the
//! field codec, canonical RLP encoding and pluggable identity schemes.
//!
//! This crate contains no I/O. Decoding records from their wire or text form
//! with scheme selection lives in the `node-record` crate.
//!
//! ## Key Types
//!
//! - [`NodeRecord`] - The record itself, mutable until signed
//! - [`NodeRecordBuilder`] - Convenience construction and signing
//! - [`FieldValue`] - Closed set of value shapes a field can hold
//! - [`FieldCodec`] - Per-key typed encoding, injected into every record
//! - [`IdentityScheme`] - Signing, validation, node id and address rules
//! - [`NodeId`] - 32-byte identifier derived from the public key
//!
//! ## Canonicalization
//!
//! Records encode as the RLP list `[signature, seq, k1, v1, ...]` with keys in
//! ascending byte order and a hard limit of 300 bytes. See [`canonical`].
//! Wire items are read and written with the `rlp` crate; [`wire`] adds the
//! strictness checks it leaves to callers.

pub mod canonical;
pub mod codec;
pub mod crypto;
pub mod error;
pub mod field;
pub mod record;
pub mod scheme;
pub mod types;
pub mod wire;

pub use canonical::{content_bytes, decode_raw_record, encode_record, RawRecord, MAX_ENCODED_SIZE};
pub use codec::{DefaultFieldCodec, FieldCodec, FieldKind};
pub use crypto::{keccak256, Ed25519Keypair, Secp256k1Keypair};
pub use error::{FieldError, RecordError, RlpError, ValidationError};
pub use field::{keys, Field, FieldValue};
pub use record::{NodeRecord, NodeRecordBuilder, TEXT_PREFIX};
pub use scheme::{Ed25519Scheme, IdentityScheme, SchemeRegistry, V4Scheme};
pub use types::NodeId;
