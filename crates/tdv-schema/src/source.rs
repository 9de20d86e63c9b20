//! # Schema Sources
//!
//! A [`SchemaSource`] supplies schema documents by identity. Sources are
//! composed into a [`FallbackChain`] consulted when the registry has no
//! compatible candidate for a record.

use serde_json::Value;
use tdv_core::{SchemaDocument, SchemaIdentity};

use crate::error::SourceError;

/// A provider of schema documents.
pub trait SchemaSource {
    /// Short name used in log messages.
    fn name(&self) -> &str;

    /// Fetch the schema with exactly this identity.
    ///
    /// `Ok(None)` means the source does not have it.
    fn fetch_schema(&self, identity: &SchemaIdentity) -> Result<Option<SchemaDocument>, SourceError>;

    /// Fetch an arbitrary referenced document by absolute URL.
    ///
    /// Used to pre-load the external targets of generated wrappers. Sources
    /// that cannot resolve URLs keep the default.
    fn fetch_reference(&self, _url: &str) -> Result<Option<Value>, SourceError> {
        Ok(None)
    }
}

/// Ordered list of sources; the first one that has the document wins.
///
/// Degradable errors (remote failures) are logged and the chain moves on.
/// Anything else is returned to the caller.
#[derive(Default)]
pub struct FallbackChain {
    sources: Vec<Box<dyn SchemaSource>>,
}

impl FallbackChain {
    /// An empty chain. Every lookup returns `Ok(None)`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source.
    pub fn with(mut self, source: impl SchemaSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Append a boxed source.
    pub fn push(&mut self, source: Box<dyn SchemaSource>) {
        self.sources.push(source);
    }

    /// Number of sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether the chain has no sources.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl std::fmt::Debug for FallbackChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.sources.iter().map(|s| s.name()))
            .finish()
    }
}

impl SchemaSource for FallbackChain {
    fn name(&self) -> &str {
        "fallback-chain"
    }

    fn fetch_schema(&self, identity: &SchemaIdentity) -> Result<Option<SchemaDocument>, SourceError> {
        for source in &self.sources {
            match source.fetch_schema(identity) {
                Ok(Some(doc)) => {
                    tracing::debug!(source = source.name(), schema = %identity, "schema supplied by fallback source");
                    return Ok(Some(doc));
                }
                Ok(None) => continue,
                Err(e) if e.is_degradable() => {
                    tracing::warn!(source = source.name(), schema = %identity, error = %e, "fallback source failed");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    fn fetch_reference(&self, url: &str) -> Result<Option<Value>, SourceError> {
        for source in &self.sources {
            match source.fetch_reference(url) {
                Ok(Some(value)) => return Ok(Some(value)),
                Ok(None) => continue,
                Err(e) if e.is_degradable() => {
                    tracing::warn!(source = source.name(), url, error = %e, "reference fetch failed");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }
}
