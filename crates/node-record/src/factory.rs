//! The record factory: decoding and scheme selection.
//!
//! The factory owns a [`SchemeRegistry`] and a [`FieldCodec`] and injects them
//! into every record it creates. The scheme is chosen by the record's `id`
//! field, both for fresh records and for records decoded from the wire.

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use node_record_core::{
    decode_raw_record, keys, DefaultFieldCodec, Field, FieldCodec, FieldValue, IdentityScheme,
    NodeRecord, NodeRecordBuilder, RecordError, SchemeRegistry, TEXT_PREFIX,
};

use crate::error::{FactoryError, Result};

/// Configuration for the factory.
#[derive(Debug, Clone)]
pub struct FactoryConfig {
    /// Whether decoded records must pass their identity scheme.
    pub verify_on_decode: bool,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            verify_on_decode: true,
        }
    }
}

/// Creates and decodes records with injected schemes and codec.
#[derive(Debug, Clone)]
pub struct RecordFactory {
    registry: SchemeRegistry,
    codec: Arc<dyn FieldCodec>,
    config: FactoryConfig,
}

impl RecordFactory {
    /// Create a factory from explicit collaborators.
    pub fn new(
        registry: SchemeRegistry,
        codec: Arc<dyn FieldCodec>,
        config: FactoryConfig,
    ) -> Self {
        Self {
            registry,
            codec,
            config,
        }
    }

    /// The built-in schemes, the default codec and default configuration.
    pub fn with_defaults() -> Self {
        Self::new(
            SchemeRegistry::with_defaults(),
            Arc::new(DefaultFieldCodec::new()),
            FactoryConfig::default(),
        )
    }

    pub fn registry(&self) -> &SchemeRegistry {
        &self.registry
    }

    pub fn codec(&self) -> &Arc<dyn FieldCodec> {
        &self.codec
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    /// Look up a registered scheme by id.
    pub fn scheme(&self, scheme_id: &str) -> Result<Arc<dyn IdentityScheme>> {
        Ok(self.registry.resolve(Some(scheme_id))?)
    }

    /// Start a record for the named scheme.
    pub fn builder(&self, scheme_id: &str, seq: u64) -> Result<NodeRecordBuilder> {
        let scheme = self.scheme(scheme_id)?;
        Ok(NodeRecordBuilder::new(scheme, Arc::clone(&self.codec), seq))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Construction
    // ─────────────────────────────────────────────────────────────────────────

    /// Create an unsigned record whose scheme is named by its `id` field.
    pub fn from_values(&self, seq: u64, fields: Vec<Field>) -> Result<NodeRecord> {
        let scheme_id = fields
            .iter()
            .rev()
            .find(|f| f.name == keys::ID)
            .and_then(|f| f.value.as_ref())
            .and_then(FieldValue::as_text);
        let scheme = self.registry.resolve(scheme_id)?;
        Ok(NodeRecord::from_values(
            scheme,
            Arc::clone(&self.codec),
            seq,
            fields,
        ))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Decoding
    // ─────────────────────────────────────────────────────────────────────────

    /// Decode a record from its canonical encoding.
    ///
    /// With `verify_on_decode` set, a record that fails its identity scheme is
    /// rejected. The returned record is frozen.
    pub fn from_bytes(&self, bytes: &[u8]) -> Result<NodeRecord> {
        let raw = decode_raw_record(bytes)?;

        let scheme = self.registry.resolve(raw.scheme_id()).map_err(|e| {
            if let RecordError::UnknownScheme(id) = &e {
                tracing::warn!("Record names unknown identity scheme {:?}", id);
            }
            e
        })?;

        let record = NodeRecord::from_raw_fields(scheme, Arc::clone(&self.codec), &raw)?;

        if self.config.verify_on_decode {
            if let Err(e) = record.verify() {
                tracing::warn!("Invalid record seq {}: {}", record.seq(), e);
                return Err(FactoryError::Invalid(e));
            }
        }

        tracing::debug!(
            "Decoded {} record seq {} ({} bytes)",
            record.scheme_id(),
            record.seq(),
            bytes.len()
        );
        Ok(record)
    }

    /// Decode a record from URL-safe base64. Trailing padding is accepted.
    pub fn from_base64(&self, text: &str) -> Result<NodeRecord> {
        let bytes = URL_SAFE_NO_PAD.decode(text.trim_end_matches('='))?;
        self.from_bytes(&bytes)
    }

    /// Decode a record from its `enr:` text form.
    pub fn from_text(&self, text: &str) -> Result<NodeRecord> {
        let encoded = text
            .strip_prefix(TEXT_PREFIX)
            .ok_or(FactoryError::MissingPrefix(TEXT_PREFIX))?;
        self.from_base64(encoded)
    }
}

impl Default for RecordFactory {
    fn default() -> Self {
        Self::with_defaults()
    }
}
