//! # Schema Registry
//!
//! Groups schema documents by [`MajorVersionKey`] (`namespace:name:major`).
//! Within a group, documents keep their registration order, so candidate
//! lists follow the order schemas were loaded (sorted local files first,
//! then synthetic wrappers).

use std::collections::BTreeMap;

use tdv_core::{MajorVersionKey, SchemaDocument, SchemaIdentity};

use crate::error::RegistryError;

/// Version-aware index of every loaded schema document.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    groups: BTreeMap<MajorVersionKey, Vec<SchemaDocument>>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document to its major-version group.
    ///
    /// Registering the same `namespace:name:major.minor` twice is an error;
    /// the first registration is kept.
    pub fn register(&mut self, document: SchemaDocument) -> Result<(), RegistryError> {
        let group = self
            .groups
            .entry(document.identity().major_key())
            .or_default();

        if let Some(existing) = group
            .iter()
            .find(|d| d.identity().version() == document.identity().version())
        {
            return Err(RegistryError::DuplicateMinor {
                identity: document.identity().clone(),
                existing: existing.origin().clone(),
                duplicate: document.origin().clone(),
            });
        }

        group.push(document);
        Ok(())
    }

    /// Documents compatible with `target`: same major, minor ≥ the target's
    /// minor, in registration order.
    pub fn candidates_for(&self, target: &SchemaIdentity) -> Vec<&SchemaDocument> {
        self.groups
            .get(&target.major_key())
            .map(|group| {
                group
                    .iter()
                    .filter(|d| target.version().is_satisfied_by(&d.identity().version()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The document registered under exactly this identity.
    pub fn get(&self, identity: &SchemaIdentity) -> Option<&SchemaDocument> {
        self.groups
            .get(&identity.major_key())?
            .iter()
            .find(|d| d.identity() == identity)
    }

    /// The member of a group with the highest minor version.
    pub fn latest_in_group(&self, key: &MajorVersionKey) -> Option<&SchemaDocument> {
        self.groups
            .get(key)?
            .iter()
            .max_by_key(|d| d.identity().version().minor())
    }

    /// Every group with its members, ordered by key.
    pub fn groups(&self) -> impl Iterator<Item = (&MajorVersionKey, &[SchemaDocument])> {
        self.groups.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Every registered document.
    pub fn documents(&self) -> impl Iterator<Item = &SchemaDocument> {
        self.groups.values().flatten()
    }

    /// Number of registered documents.
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
