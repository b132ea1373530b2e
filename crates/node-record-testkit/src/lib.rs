//! # Node Record Testkit
//!
//! Testing utilities for node records.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known records with expected encodings, including the EIP-778 example
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Helper structs for setting up test scenarios
//! - **Mock scheme**: A Blake3-only identity scheme for deterministic tests
//!
//! ## Golden Vectors
//!
//! ```rust
//! use node_record_testkit::vectors::{all_vectors, generate_record_from_vector};
//!
//! for vector in all_vectors() {
//!     let record = generate_record_from_vector(&vector);
//!     println!("{}: {}", vector.name, record.to_text().unwrap());
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use node_record_testkit::generators::{record_from_params, RecordParams};
//!
//! proptest! {
//!     #[test]
//!     fn signed_records_are_valid(params: RecordParams) {
//!         prop_assert!(record_from_params(&params).is_valid());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use node_record_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let record = fixture.make_record(1);
//! assert!(record.is_valid());
//! ```

pub mod fixtures;
pub mod generators;
pub mod mock;
pub mod vectors;

pub use fixtures::{mock_factory, multi_party_fixtures, TestFixture};
pub use generators::{record_from_params, RecordParams};
pub use mock::MockScheme;
pub use vectors::{all_vectors, generate_record_from_vector, verify_all_vectors, GoldenVector};
