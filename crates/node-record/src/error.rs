//! Error types for the record factory.

use node_record_core::{RecordError, ValidationError};
use thiserror::Error;

/// Errors that can occur while decoding or constructing records.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Structural, codec or size error.
    #[error("record error: {0}")]
    Record(#[from] RecordError),

    /// The record decoded but failed its identity scheme.
    #[error("invalid record: {0}")]
    Invalid(#[from] ValidationError),

    /// The text form was not valid base64.
    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Text form without the `enr:` prefix.
    #[error("missing text prefix {0:?}")]
    MissingPrefix(&'static str),
}

/// Result type for factory operations.
pub type Result<T> = std::result::Result<T, FactoryError>;
