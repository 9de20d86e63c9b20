//! # Synthetic Wrapper Schemas
//!
//! Some namespaces (IEEE 1752) are not maintained locally. For each known
//! leaf schema of such a namespace a minimal wrapper is generated:
//!
//! ```json
//! {
//!   "$id": "https://w3id.org/ieee/ieee-1752-schema/time-interval-1.0.json",
//!   "type": "object",
//!   "allOf": [{ "$ref": "<raw_base_url><directory>/time-interval-1.0.json" }]
//! }
//! ```
//!
//! The wrapper gives the external schema a canonical URI in the local URI
//! scheme, so other schemas can reference it like any local one.

use serde_json::json;
use tdv_core::{
    IdentityError, NamespaceUris, SchemaDocument, SchemaIdentity, SchemaOrigin, SyntheticConfig,
    Version,
};

/// A generated wrapper and the external document it references.
#[derive(Debug, Clone)]
pub struct SyntheticWrapper {
    /// The wrapper schema, registered under the synthetic namespace.
    pub document: SchemaDocument,
    /// Absolute URL of the wrapped external schema.
    pub reference: String,
}

/// Generates wrapper schemas for a configured external namespace.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    config: SyntheticConfig,
    uris: NamespaceUris,
}

impl SyntheticSource {
    /// Create a generator from configuration.
    pub fn new(config: SyntheticConfig, uris: NamespaceUris) -> Self {
        Self { config, uris }
    }

    /// The namespace wrappers are registered under.
    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }

    /// The version every wrapper carries.
    pub fn version(&self) -> Version {
        self.config.default_version
    }

    /// Raw-content URL of the external schema `name`, if it is known.
    pub fn reference_url(&self, name: &str) -> Option<String> {
        let directory = self.config.directories.get(name)?;
        let base = self.config.raw_base_url.trim_end_matches('/');
        Some(format!(
            "{base}/{directory}/{name}-{}.json",
            self.config.default_version
        ))
    }

    /// The wrapper for `identity`, if it names a known leaf schema at the
    /// configured version.
    pub fn wrapper(&self, identity: &SchemaIdentity) -> Result<Option<SyntheticWrapper>, IdentityError> {
        if identity.namespace() != self.config.namespace
            || identity.version() != self.config.default_version
        {
            return Ok(None);
        }
        let Some(reference) = self.reference_url(identity.name()) else {
            return Ok(None);
        };

        let content = json!({
            "$id": self.uris.canonical_uri(identity)?,
            "type": self.content_type(identity.name()),
            "allOf": [{ "$ref": reference }],
        });

        Ok(Some(SyntheticWrapper {
            document: SchemaDocument::new(identity.clone(), content, SchemaOrigin::Synthetic),
            reference,
        }))
    }

    /// Wrappers for every known leaf schema, ordered by name.
    pub fn wrappers(&self) -> Result<Vec<SyntheticWrapper>, IdentityError> {
        let mut out = Vec::with_capacity(self.config.directories.len());
        for name in self.config.directories.keys() {
            let identity =
                SchemaIdentity::new(&self.config.namespace, name, self.config.default_version)?;
            if let Some(wrapper) = self.wrapper(&identity)? {
                out.push(wrapper);
            }
        }
        Ok(out)
    }

    /// Wrapper content type for `name` (`"string"` or `"object"`).
    pub fn content_type(&self, name: &str) -> &'static str {
        if self.config.string_types.contains(name) {
            "string"
        } else {
            "object"
        }
    }
}
