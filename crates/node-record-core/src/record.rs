//! Node record: the signed, versioned peer advertisement.
//!
//! A record holds a sequence number, a signature and a sorted field map. It is
//! mutable until it carries a real signature; after that it is frozen and new
//! versions are produced with [`NodeRecord::with_new_address`],
//! [`NodeRecord::with_updated_field`] or [`NodeRecord::next_version`].
//!
//! Signing, validation, node id derivation and address extraction are all
//! delegated to the record's [`IdentityScheme`]. Value encoding goes through
//! the injected [`FieldCodec`].

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use crate::canonical::{self, RawRecord};
use crate::codec::FieldCodec;
use crate::error::{RecordError, Result, ValidationError};
use crate::field::{keys, Field, FieldValue};
use crate::scheme::IdentityScheme;
use crate::types::NodeId;

/// Prefix of the textual form of a record.
pub const TEXT_PREFIX: &str = "enr:";

/// A node record.
///
/// Equality and hashing are structural over sequence number, signature and
/// the full field map, tombstones included. The scheme and codec do not take
/// part.
#[derive(Clone)]
pub struct NodeRecord {
    seq: u64,
    signature: Bytes,
    fields: BTreeMap<String, Option<FieldValue>>,
    scheme: Arc<dyn IdentityScheme>,
    codec: Arc<dyn FieldCodec>,
    frozen: bool,
}

impl NodeRecord {
    /// Create an unsigned record from explicit fields.
    ///
    /// The signature is a zero-filled placeholder of the scheme's signature
    /// length. Later fields with the same name replace earlier ones.
    pub fn from_values(
        scheme: Arc<dyn IdentityScheme>,
        codec: Arc<dyn FieldCodec>,
        seq: u64,
        fields: impl IntoIterator<Item = Field>,
    ) -> Self {
        let signature = Bytes::from(vec![0u8; scheme.signature_len()]);
        let fields = fields
            .into_iter()
            .map(|field| (field.name, field.value))
            .collect();

        Self {
            seq,
            signature,
            fields,
            scheme,
            codec,
            frozen: false,
        }
    }

    /// Reconstruct a record from its decoded wire form.
    ///
    /// Every value is run through the codec; a single failure rejects the
    /// whole record. The signature is taken verbatim and the result is frozen.
    pub fn from_raw_fields(
        scheme: Arc<dyn IdentityScheme>,
        codec: Arc<dyn FieldCodec>,
        raw: &RawRecord<'_>,
    ) -> Result<Self> {
        let mut fields = BTreeMap::new();
        for (key, item) in &raw.fields {
            let value = codec.decode(key, item)?;
            fields.insert((*key).to_string(), Some(value));
        }

        Ok(Self {
            seq: raw.seq,
            signature: Bytes::copy_from_slice(raw.signature),
            fields,
            scheme,
            codec,
            frozen: true,
        })
    }

    // ────────────────────────────────────────────────────────────────────────
    // Fields
    // ────────────────────────────────────────────────────────────────────────

    /// The sequence number.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// The stored signature, or the zero placeholder if unsigned.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Replace the signature without verifying it. Freezes the record.
    pub fn set_signature(&mut self, signature: impl Into<Bytes>) {
        self.signature = signature.into();
        self.frozen = true;
    }

    /// Insert or replace a field.
    ///
    /// The value is not checked against the codec here; a mismatch surfaces
    /// when the record is encoded.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Result<()> {
        self.insert(key.into(), Some(value.into()))
    }

    /// Tombstone a field: it stays queryable but is never encoded.
    pub fn set_tombstone(&mut self, key: impl Into<String>) -> Result<()> {
        self.insert(key.into(), None)
    }

    fn insert(&mut self, key: String, value: Option<FieldValue>) -> Result<()> {
        if self.frozen {
            return Err(RecordError::Frozen);
        }
        self.fields.insert(key, value);
        Ok(())
    }

    /// The value of a field. Tombstoned and absent fields both yield `None`.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key).and_then(Option::as_ref)
    }

    /// Whether the field map has an entry for `key`, tombstone or not.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// All entries in ascending key order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, Option<&FieldValue>)> + '_ {
        self.fields
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_ref()))
    }

    /// Visit every entry in ascending key order.
    pub fn for_each_field(&self, mut visitor: impl FnMut(&str, Option<&FieldValue>)) {
        for (key, value) in self.fields() {
            visitor(key, value);
        }
    }

    /// Number of entries, tombstones included.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the field map is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn codec(&self) -> &dyn FieldCodec {
        &*self.codec
    }

    pub fn identity_scheme(&self) -> &Arc<dyn IdentityScheme> {
        &self.scheme
    }

    /// Name of the identity scheme this record was built with.
    pub fn scheme_id(&self) -> &'static str {
        self.scheme.scheme_id()
    }

    /// Whether `set` is refused because the record carries a signature.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    // ────────────────────────────────────────────────────────────────────────
    // Signing and validation
    // ────────────────────────────────────────────────────────────────────────

    /// Check the record against its identity scheme, reporting why it fails.
    pub fn verify(&self) -> std::result::Result<(), ValidationError> {
        self.scheme.verify(self)
    }

    /// Whether the record is well formed and correctly signed.
    pub fn is_valid(&self) -> bool {
        self.scheme.is_valid(self)
    }

    /// Sign the record in place. Freezes the record.
    pub fn sign(&mut self, private_key: &[u8]) -> Result<()> {
        let scheme = Arc::clone(&self.scheme);
        scheme.sign(self, private_key)
    }

    // ────────────────────────────────────────────────────────────────────────
    // Encoding
    // ────────────────────────────────────────────────────────────────────────

    /// Canonical encoding including the signature.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        canonical::encode_record(self, true)
    }

    /// Canonical encoding without the signature: the signing preimage.
    pub fn serialize_no_signature(&self) -> Result<Vec<u8>> {
        canonical::content_bytes(self)
    }

    /// URL-safe unpadded base64 of [`NodeRecord::serialize`].
    pub fn to_base64(&self) -> Result<String> {
        Ok(URL_SAFE_NO_PAD.encode(self.serialize()?))
    }

    /// Textual form: `enr:` followed by the base64 encoding.
    pub fn to_text(&self) -> Result<String> {
        Ok(format!("{}{}", TEXT_PREFIX, self.to_base64()?))
    }

    // ────────────────────────────────────────────────────────────────────────
    // Identity and addresses
    // ────────────────────────────────────────────────────────────────────────

    pub fn node_id(&self) -> Result<NodeId> {
        self.scheme.node_id(self)
    }

    pub fn tcp_address(&self) -> Option<SocketAddr> {
        self.scheme.tcp_address(self)
    }

    pub fn udp_address(&self) -> Option<SocketAddr> {
        self.scheme.udp_address(self)
    }

    // ────────────────────────────────────────────────────────────────────────
    // New versions
    // ────────────────────────────────────────────────────────────────────────

    /// An unsigned copy with the sequence number advanced by one.
    ///
    /// All fields, tombstones included, are carried over. The copy is not
    /// frozen and has a zero signature.
    pub fn next_version(&self) -> Result<NodeRecord> {
        let seq = self
            .seq
            .checked_add(1)
            .ok_or(RecordError::SequenceOverflow)?;

        Ok(Self {
            seq,
            signature: Bytes::from(vec![0u8; self.scheme.signature_len()]),
            fields: self.fields.clone(),
            scheme: Arc::clone(&self.scheme),
            codec: Arc::clone(&self.codec),
            frozen: false,
        })
    }

    /// A new signed record advertising `udp` (and optionally a TCP port on the
    /// same IP). The receiver is left untouched.
    pub fn with_new_address(
        &self,
        udp: SocketAddr,
        tcp_port: Option<u16>,
        private_key: &[u8],
    ) -> Result<NodeRecord> {
        self.scheme
            .create_with_new_address(self, udp, tcp_port, private_key)
    }

    /// A new signed record with one field set to `value`. The receiver is
    /// left untouched.
    pub fn with_updated_field(
        &self,
        name: &str,
        value: impl Into<FieldValue>,
        private_key: &[u8],
    ) -> Result<NodeRecord> {
        self.scheme
            .create_with_updated_field(self, name, value.into(), private_key)
    }
}

impl PartialEq for NodeRecord {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq && self.signature == other.signature && self.fields == other.fields
    }
}

impl Eq for NodeRecord {}

impl Hash for NodeRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.seq.hash(state);
        self.signature.hash(state);
        self.fields.hash(state);
    }
}

impl fmt::Debug for NodeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRecord")
            .field("seq", &self.seq)
            .field("scheme", &self.scheme.scheme_id())
            .field("node_id", &self.node_id().ok())
            .field("udp", &self.udp_address())
            .field("tcp", &self.tcp_address())
            .field("fields", &self.fields)
            .finish()
    }
}

/// Builder for node records.
///
/// Inserts `id` with the scheme name unless a value was given for it.
pub struct NodeRecordBuilder {
    scheme: Arc<dyn IdentityScheme>,
    codec: Arc<dyn FieldCodec>,
    seq: u64,
    fields: Vec<Field>,
}

impl NodeRecordBuilder {
    /// Start building a record.
    pub fn new(scheme: Arc<dyn IdentityScheme>, codec: Arc<dyn FieldCodec>, seq: u64) -> Self {
        Self {
            scheme,
            codec,
            seq,
            fields: Vec::new(),
        }
    }

    /// Set an arbitrary field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.push(Field::new(name, value));
        self
    }

    /// Add a tombstoned field.
    pub fn tombstone(mut self, name: impl Into<String>) -> Self {
        self.fields.push(Field::tombstone(name));
        self
    }

    pub fn ip4(self, ip: Ipv4Addr) -> Self {
        self.field(keys::IP, ip)
    }

    pub fn ip6(self, ip: Ipv6Addr) -> Self {
        self.field(keys::IP6, ip)
    }

    pub fn udp4(self, port: u16) -> Self {
        self.field(keys::UDP, port)
    }

    pub fn tcp4(self, port: u16) -> Self {
        self.field(keys::TCP, port)
    }

    pub fn udp6(self, port: u16) -> Self {
        self.field(keys::UDP6, port)
    }

    pub fn tcp6(self, port: u16) -> Self {
        self.field(keys::TCP6, port)
    }

    /// Build the unsigned record.
    pub fn build(self) -> NodeRecord {
        let scheme_id = self.scheme.scheme_id();
        let mut fields = Vec::with_capacity(self.fields.len() + 1);
        if !self.fields.iter().any(|f| f.name == keys::ID) {
            fields.push(Field::new(keys::ID, scheme_id));
        }
        fields.extend(self.fields);
        NodeRecord::from_values(self.scheme, self.codec, self.seq, fields)
    }

    /// Build and sign the record.
    ///
    /// The scheme's public key field is derived from `private_key` unless it
    /// was set explicitly.
    pub fn sign(self, private_key: &[u8]) -> Result<NodeRecord> {
        let key_field = self.scheme.public_key_field();
        let public_key = self.scheme.public_key_from_private(private_key)?;
        let needs_key = !self.fields.iter().any(|f| f.name == key_field);

        let mut record = self.build();
        if needs_key {
            record.set(key_field, public_key)?;
        }
        record.sign(private_key)?;
        Ok(record)
    }
}
