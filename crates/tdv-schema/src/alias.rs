//! # Wildcard Aliases
//!
//! Schemas may reference "the latest minor of major M" via
//! `<base><name>-<M>.x.json`. For every registry group this module derives
//! one alias pointing at the member with the highest minor version.

use tdv_core::{IdentityError, NamespaceUris, SchemaIdentity};

use crate::registry::SchemaRegistry;

/// One wildcard URI and the schema it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardAlias {
    /// The `name-M.x.json` URI.
    pub uri: String,
    /// The highest-minor member of the group.
    pub target: SchemaIdentity,
}

/// Derives wildcard aliases from a populated registry.
#[derive(Debug)]
pub struct WildcardAliasBuilder<'a> {
    uris: &'a NamespaceUris,
}

impl<'a> WildcardAliasBuilder<'a> {
    /// Create a builder over a namespace table.
    pub fn new(uris: &'a NamespaceUris) -> Self {
        Self { uris }
    }

    /// One alias per registry group, ordered by group key.
    pub fn build(&self, registry: &SchemaRegistry) -> Result<Vec<WildcardAlias>, IdentityError> {
        let mut aliases = Vec::new();
        for (key, _) in registry.groups() {
            let Some(latest) = registry.latest_in_group(key) else {
                continue;
            };
            let uri = self.uris.wildcard_uri(latest.identity())?;
            tracing::debug!(alias = %uri, target = %latest.identity(), "wildcard alias");
            aliases.push(WildcardAlias {
                uri,
                target: latest.identity().clone(),
            });
        }
        Ok(aliases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tdv_core::{SchemaDocument, SchemaOrigin, Version};

    fn register(registry: &mut SchemaRegistry, ns: &str, name: &str, major: u32, minor: u32) {
        let id = SchemaIdentity::new(ns, name, Version::new(major, minor)).unwrap();
        registry
            .register(SchemaDocument::new(id, json!({}), SchemaOrigin::Synthetic))
            .unwrap();
    }

    #[test]
    fn alias_points_at_highest_minor_per_major() {
        let mut registry = SchemaRegistry::new();
        register(&mut registry, "omh", "unit-value", 1, 0);
        register(&mut registry, "omh", "unit-value", 1, 2);
        register(&mut registry, "omh", "unit-value", 1, 1);
        register(&mut registry, "omh", "unit-value", 2, 0);

        let uris = NamespaceUris::default();
        let aliases = WildcardAliasBuilder::new(&uris).build(&registry).unwrap();
        assert_eq!(aliases.len(), 2);
        assert_eq!(
            aliases[0].uri,
            "https://w3id.org/openmhealth/schemas/omh/unit-value-1.x.json"
        );
        assert_eq!(aliases[0].target.version(), Version::new(1, 2));
        assert_eq!(
            aliases[1].uri,
            "https://w3id.org/openmhealth/schemas/omh/unit-value-2.x.json"
        );
        assert_eq!(aliases[1].target.version(), Version::new(2, 0));
    }

    #[test]
    fn unknown_namespace_is_an_error() {
        let mut registry = SchemaRegistry::new();
        register(&mut registry, "acme", "widget", 1, 0);
        let uris = NamespaceUris::default();
        assert!(WildcardAliasBuilder::new(&uris).build(&registry).is_err());
    }
}
