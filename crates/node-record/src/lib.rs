//! # Node Record
//!
//! Signed, versioned node records for peer discovery, in the format of
//! EIP-778 Ethereum Node Records.
//!
//! ## Overview
//!
//! A node record advertises a peer's identity and network addresses:
//!
//! - **Sequence number**: Version counter, bumped on every change
//! - **Fields**: Sorted key/value pairs, including the identity scheme name
//! - **Signature**: Computed by the identity scheme over the canonical content
//!
//! Records are encoded as RLP, at most 300 bytes, and exchanged as
//! `enr:`-prefixed URL-safe base64 text.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use node_record::{RecordFactory, Secp256k1Keypair};
//! use std::net::Ipv4Addr;
//!
//! let factory = RecordFactory::with_defaults();
//! let keypair = Secp256k1Keypair::generate();
//!
//! let record = factory
//!     .builder("v4", 1)
//!     .unwrap()
//!     .ip4(Ipv4Addr::new(127, 0, 0, 1))
//!     .udp4(30303)
//!     .sign(&keypair.secret_bytes())
//!     .unwrap();
//!
//! let text = record.to_text().unwrap();
//! let decoded = factory.from_text(&text).unwrap();
//! assert_eq!(decoded, record);
//! ```
//!
//! ## Re-exports
//!
//! - `node_record::core` - Core primitives (NodeRecord, FieldCodec, schemes)

pub mod error;
pub mod factory;

// Re-export component crates
pub use node_record_core as core;

// Re-export main types for convenience
pub use error::{FactoryError, Result};
pub use factory::{FactoryConfig, RecordFactory};

// Re-export commonly used core types
pub use node_record_core::{
    keys, DefaultFieldCodec, Ed25519Keypair, Ed25519Scheme, Field, FieldCodec, FieldValue,
    IdentityScheme, NodeId, NodeRecord, NodeRecordBuilder, RecordError, SchemeRegistry,
    Secp256k1Keypair, V4Scheme, ValidationError, MAX_ENCODED_SIZE, TEXT_PREFIX,
};
