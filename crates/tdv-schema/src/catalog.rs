//! # Schema Catalog
//!
//! The load phase. A [`CatalogBuilder`] registers schema documents and
//! indexes their content for reference resolution; [`CatalogBuilder::finish`]
//! derives wildcard aliases and freezes everything into a [`SchemaCatalog`].
//!
//! Each registered document is indexed under its canonical URI and, when it
//! declares a different `$id`, under that as well. Declared ids are indexed
//! last, after every canonical URI and wildcard alias, so a stale `$id`
//! copied from another version can never shadow that version's content.

use serde_json::Value;
use tdv_core::{NamespaceUris, SchemaDocument, SchemaIdentity};

use crate::alias::WildcardAliasBuilder;
use crate::error::LoadError;
use crate::local::LocalSchemaSource;
use crate::registry::SchemaRegistry;
use crate::source::SchemaSource;
use crate::store::{ResolutionStore, ResolutionStoreBuilder};
use crate::synthetic::SyntheticSource;

/// Collects schema documents during the load phase.
#[derive(Debug)]
pub struct CatalogBuilder {
    registry: SchemaRegistry,
    store: ResolutionStoreBuilder,
    declared: Vec<DeclaredId>,
}

#[derive(Debug)]
struct DeclaredId {
    uri: String,
    identity: SchemaIdentity,
    content: Value,
}

impl CatalogBuilder {
    /// Start an empty catalog using `uris` for canonical URIs.
    pub fn new(uris: NamespaceUris) -> Self {
        Self {
            registry: SchemaRegistry::new(),
            store: ResolutionStoreBuilder::new(uris),
            declared: Vec::new(),
        }
    }

    /// Register a document and index its content.
    pub fn register(&mut self, document: SchemaDocument) -> Result<(), LoadError> {
        let canonical = self.store.uris().canonical_uri(document.identity())?;
        let declared = document
            .declared_id()
            .filter(|id| *id != canonical)
            .map(str::to_string);
        let identity = document.identity().clone();
        let content = document.content().clone();

        self.registry.register(document)?;
        if let Some(uri) = declared {
            self.declared.push(DeclaredId {
                uri,
                identity,
                content: content.clone(),
            });
        }
        self.store.insert(canonical, content);
        Ok(())
    }

    /// Index a document that is only a `$ref` target, not a registry member.
    pub fn add_reference(&mut self, uri: impl Into<String>, content: Value) {
        self.store.insert(uri, content);
    }

    /// Register every schema file under a local source. Returns the count.
    pub fn load_local(&mut self, source: &LocalSchemaSource) -> Result<usize, LoadError> {
        let documents = source.load_all()?;
        let count = documents.len();
        for document in documents {
            self.register(document)?;
        }
        tracing::info!(count, root = %source.root().display(), "loaded local schemas");
        Ok(count)
    }

    /// Register generated wrappers, pre-fetching each wrapped document
    /// through `references`.
    ///
    /// A wrapper whose target cannot be obtained is skipped with a warning,
    /// so records targeting it later report a missing schema instead of
    /// aborting on a dangling reference. Returns the number registered.
    pub fn load_synthetic(
        &mut self,
        synthetic: &SyntheticSource,
        references: &dyn SchemaSource,
    ) -> Result<usize, LoadError> {
        let mut count = 0;
        for wrapper in synthetic.wrappers()? {
            let target = match references.fetch_reference(&wrapper.reference) {
                Ok(Some(target)) => target,
                Ok(None) => {
                    tracing::warn!(
                        schema = %wrapper.document.identity(),
                        reference = %wrapper.reference,
                        "wrapped schema unavailable, skipping synthetic wrapper"
                    );
                    continue;
                }
                Err(e) if e.is_degradable() => {
                    tracing::warn!(
                        schema = %wrapper.document.identity(),
                        error = %e,
                        "wrapped schema fetch failed, skipping synthetic wrapper"
                    );
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            self.add_reference(wrapper.reference, target);
            self.register(wrapper.document)?;
            count += 1;
        }
        tracing::info!(count, namespace = synthetic.namespace(), "registered synthetic wrappers");
        Ok(count)
    }

    /// Number of documents registered so far.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Derive wildcard aliases and freeze the store.
    pub fn finish(mut self) -> Result<SchemaCatalog, LoadError> {
        let aliases = WildcardAliasBuilder::new(self.store.uris()).build(&self.registry)?;
        let mut alias_count = 0;
        for alias in aliases {
            let Some(latest) = self.registry.get(&alias.target) else {
                continue;
            };
            if self.store.insert(alias.uri, latest.content().clone()) {
                alias_count += 1;
            }
        }

        for declared in std::mem::take(&mut self.declared) {
            if !self.store.insert(declared.uri.as_str(), declared.content) {
                tracing::warn!(
                    schema = %declared.identity,
                    id = %declared.uri,
                    "declared $id is already indexed for another document, ignoring it"
                );
            }
        }

        let store = self.store.freeze();
        tracing::info!(
            schemas = self.registry.len(),
            aliases = alias_count,
            uris = store.len(),
            "resolution store frozen"
        );
        Ok(SchemaCatalog {
            registry: self.registry,
            store,
            alias_count,
        })
    }
}

/// The frozen result of the load phase.
#[derive(Debug)]
pub struct SchemaCatalog {
    registry: SchemaRegistry,
    store: ResolutionStore,
    alias_count: usize,
}

impl SchemaCatalog {
    /// The registry of loaded schemas.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// The frozen resolution store.
    pub fn store(&self) -> &ResolutionStore {
        &self.store
    }

    /// Number of wildcard aliases indexed.
    pub fn alias_count(&self) -> usize {
        self.alias_count
    }
}
