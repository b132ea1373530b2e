//! Scheme lookup by the value of the `id` field.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{Ed25519Scheme, IdentityScheme, V4Scheme};
use crate::error::{RecordError, Result};
use crate::field::keys;

/// Identity schemes keyed by scheme id.
#[derive(Debug, Clone, Default)]
pub struct SchemeRegistry {
    schemes: BTreeMap<&'static str, Arc<dyn IdentityScheme>>,
}

impl SchemeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with `v4` and `ed25519`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(V4Scheme::new()));
        registry.register(Arc::new(Ed25519Scheme::new()));
        registry
    }

    /// Add a scheme, replacing any previous one with the same id.
    pub fn register(&mut self, scheme: Arc<dyn IdentityScheme>) -> Option<Arc<dyn IdentityScheme>> {
        self.schemes.insert(scheme.scheme_id(), scheme)
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn IdentityScheme>> {
        self.schemes.get(id).cloned()
    }

    /// Look up the scheme named by a record's `id` field.
    pub fn resolve(&self, id: Option<&str>) -> Result<Arc<dyn IdentityScheme>> {
        let id = id.ok_or_else(|| RecordError::MissingRequiredField(keys::ID.into()))?;
        self.get(id)
            .ok_or_else(|| RecordError::UnknownScheme(id.to_string()))
    }

    /// Registered scheme ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.schemes.keys().copied()
    }
}
