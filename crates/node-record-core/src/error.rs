//! Error types for node record operations.

use thiserror::Error;

/// Errors that can occur while building, encoding, decoding or signing a record.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("encoded record is {size} bytes, exceeds maximum of {max}")]
    EncodingSizeExceeded { size: usize, max: usize },

    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    #[error("field error: {0}")]
    Field(#[from] FieldError),

    #[error("rlp error: {0}")]
    Rlp(#[from] RlpError),

    #[error("malformed record: {0}")]
    Malformed(String),

    #[error("record is signed and can no longer be mutated in place")]
    Frozen,

    #[error("invalid private key")]
    InvalidPrivateKey,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("sequence number overflow")]
    SequenceOverflow,

    #[error("unknown identity scheme: {0}")]
    UnknownScheme(String),
}

/// Errors raised by a field codec for a single key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("field {key:?}: {reason}")]
    Malformed { key: String, reason: String },

    #[error("field {key:?}: expected {expected}")]
    TypeMismatch { key: String, expected: &'static str },
}

impl FieldError {
    pub(crate) fn malformed(key: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn mismatch(key: &str, expected: &'static str) -> Self {
        Self::TypeMismatch {
            key: key.to_string(),
            expected,
        }
    }
}

/// Errors from the RLP reader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RlpError {
    #[error("rlp decoding failed: {0}")]
    Decoder(#[from] rlp::DecoderError),

    #[error("non-canonical length encoding")]
    NonCanonicalLength,

    #[error("{0} trailing bytes after item")]
    TrailingBytes(usize),
}

/// Reasons a record fails identity-scheme validation.
///
/// Returned by [`crate::NodeRecord::verify`]; [`crate::NodeRecord::is_valid`]
/// collapses it to a boolean.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("scheme mismatch: expected {expected:?}, found {found:?}")]
    SchemeMismatch {
        expected: &'static str,
        found: Option<String>,
    },

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("signature has {got} bytes, expected {expected}")]
    SignatureLength { expected: usize, got: usize },

    #[error("signature verification failed")]
    SignatureFailed,

    #[error("content encoding failed: {0}")]
    Encoding(String),
}

impl From<RecordError> for ValidationError {
    fn from(e: RecordError) -> Self {
        match e {
            RecordError::InvalidPublicKey => ValidationError::InvalidPublicKey,
            other => ValidationError::Encoding(other.to_string()),
        }
    }
}

/// Result type for record operations.
pub type Result<T> = std::result::Result<T, RecordError>;
