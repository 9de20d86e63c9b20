//! # Resolution Store
//!
//! A flat URI → schema content map used to resolve `$ref`s during
//! compilation. Populated by [`ResolutionStoreBuilder`] during the load
//! phase and frozen into an immutable, cheaply cloneable [`ResolutionStore`]
//! before any validation starts.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tdv_core::{IdentityError, NamespaceUris, SchemaIdentity};

/// Mutable store used while loading.
#[derive(Debug)]
pub struct ResolutionStoreBuilder {
    uris: NamespaceUris,
    documents: HashMap<String, Value>,
}

impl ResolutionStoreBuilder {
    /// Create an empty builder that derives canonical URIs from `uris`.
    pub fn new(uris: NamespaceUris) -> Self {
        Self {
            uris,
            documents: HashMap::new(),
        }
    }

    /// The namespace table in use.
    pub fn uris(&self) -> &NamespaceUris {
        &self.uris
    }

    /// Insert content under a URI. Returns `false` if the URI was already
    /// present, in which case the earlier content is kept.
    pub fn insert(&mut self, uri: impl Into<String>, content: Value) -> bool {
        let uri = uri.into();
        if self.documents.contains_key(&uri) {
            tracing::debug!(uri = %uri, "URI already indexed, keeping first document");
            return false;
        }
        self.documents.insert(uri, content);
        true
    }

    /// Whether a URI is already indexed.
    pub fn contains(&self, uri: &str) -> bool {
        self.documents.contains_key(uri)
    }

    /// Freeze into an immutable store.
    pub fn freeze(self) -> ResolutionStore {
        ResolutionStore {
            uris: self.uris,
            documents: Arc::new(self.documents),
        }
    }
}

/// Immutable URI → content map shared by every compiled validator.
#[derive(Debug, Clone)]
pub struct ResolutionStore {
    uris: NamespaceUris,
    documents: Arc<HashMap<String, Value>>,
}

impl ResolutionStore {
    /// Look up content by absolute URI. A trailing fragment is ignored.
    pub fn get(&self, uri: &str) -> Option<&Value> {
        self.documents.get(strip_fragment(uri))
    }

    /// Whether the URI resolves.
    pub fn contains(&self, uri: &str) -> bool {
        self.get(uri).is_some()
    }

    /// Number of indexed URIs, aliases included.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The canonical URI of a schema identity.
    pub fn canonical_uri(&self, identity: &SchemaIdentity) -> Result<String, IdentityError> {
        self.uris.canonical_uri(identity)
    }

    /// The namespace table in use.
    pub fn uris(&self) -> &NamespaceUris {
        &self.uris
    }

    pub(crate) fn shared(&self) -> Arc<HashMap<String, Value>> {
        Arc::clone(&self.documents)
    }
}

pub(crate) fn strip_fragment(uri: &str) -> &str {
    uri.split_once('#').map_or(uri, |(base, _)| base)
}
