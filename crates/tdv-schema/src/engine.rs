//! # Validation Engine
//!
//! Compiles schema documents with the `jsonschema` crate (draft 2020-12,
//! format assertion on) and validates data records against them.
//!
//! ## Reference resolution
//!
//! Every `$ref` is resolved from the frozen [`ResolutionStore`] by a
//! [`Retrieve`] implementation that never touches the network. A reference
//! the store cannot answer is a dangling reference and surfaces as
//! [`UnexpectedValidationError::DanglingReference`], which aborts the run.
//!
//! ## Caching
//!
//! Compiled validators are cached per schema identity, so a schema shared
//! by many records is compiled once. Fallback lookups are cached the same
//! way, absent results included, so each missing identity is fetched at
//! most once per engine.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use jsonschema::{Retrieve, Uri, Validator};
use parking_lot::Mutex;
use serde_json::Value;
use tdv_core::{DataRecord, Expectation, SchemaDocument, SchemaIdentity, SchemaOrigin};

use crate::error::UnexpectedValidationError;
use crate::registry::SchemaRegistry;
use crate::source::SchemaSource;
use crate::store::{strip_fragment, ResolutionStore};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// A single schema violation reported for a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer to the violating value in the document.
    pub instance_path: String,
    /// JSON Pointer to the schema keyword that failed.
    pub schema_path: String,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Result of validating one document against one schema.
#[derive(Debug, Clone, Default)]
pub struct Outcome {
    violations: Vec<Violation>,
}

impl Outcome {
    /// Whether the document satisfied the schema.
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations, empty when the document passed.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the violations.
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

/// How an outcome disagreed with the declared expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchKind {
    /// Declared `shouldPass` but the schema rejected it.
    ExpectedPassGotFail,
    /// Declared `shouldFail` but the schema accepted it.
    ExpectedFailGotPass,
}

/// A (record, schema) pair whose outcome contradicts the expectation.
#[derive(Debug, Clone)]
pub struct Mismatch {
    /// What went wrong.
    pub kind: MismatchKind,
    /// Path of the data file.
    pub data_path: PathBuf,
    /// The schema the record targeted.
    pub target: SchemaIdentity,
    /// The candidate schema that produced the outcome.
    pub schema: SchemaIdentity,
    /// Where the candidate schema came from.
    pub schema_origin: SchemaOrigin,
    /// Violations reported by the schema. Empty for `ExpectedFailGotPass`.
    pub violations: Vec<Violation>,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = match self.kind {
            MismatchKind::ExpectedPassGotFail => "should have passed but failed",
            MismatchKind::ExpectedFailGotPass => "should have failed but passed",
        };
        write!(
            f,
            "{} {verdict} validation against {} ({})",
            self.data_path.display(),
            self.schema,
            self.schema_origin
        )?;
        for v in &self.violations {
            write!(f, "\n{v}")?;
        }
        Ok(())
    }
}

/// Everything learned from validating one record.
#[derive(Debug, Clone, Default)]
pub struct RecordReport {
    /// Number of schemas the record was validated against.
    pub validated: usize,
    /// Candidates whose outcome contradicted the expectation.
    pub mismatches: Vec<Mismatch>,
    /// No local candidate and no fallback source had a schema.
    pub missing_schema: bool,
}

// ---------------------------------------------------------------------------
// Reference retrieval
// ---------------------------------------------------------------------------

/// Resolves `$ref` URIs from the frozen store and records every miss.
struct StoreRetriever {
    documents: Arc<HashMap<String, Value>>,
    misses: Arc<Mutex<Vec<String>>>,
}

impl Retrieve for StoreRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let key = strip_fragment(uri.as_str());
        if let Some(value) = self.documents.get(key) {
            return Ok(value.clone());
        }
        self.misses.lock().push(key.to_string());
        Err(format!("no schema indexed under {key}").into())
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Compiles and runs schema validators over a frozen resolution store.
pub struct ValidationEngine {
    store: ResolutionStore,
    cache: Mutex<HashMap<SchemaIdentity, Arc<Validator>>>,
    fetched: Mutex<HashMap<SchemaIdentity, Option<SchemaDocument>>>,
}

impl fmt::Debug for ValidationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationEngine")
            .field("indexed_uris", &self.store.len())
            .field("compiled", &self.cache.lock().len())
            .field("fetched", &self.fetched.lock().len())
            .finish()
    }
}

impl ValidationEngine {
    /// Create an engine over a frozen store.
    pub fn new(store: ResolutionStore) -> Self {
        Self {
            store,
            cache: Mutex::new(HashMap::new()),
            fetched: Mutex::new(HashMap::new()),
        }
    }

    /// The resolution store.
    pub fn store(&self) -> &ResolutionStore {
        &self.store
    }

    /// Number of compiled validators held in the cache.
    pub fn compiled_count(&self) -> usize {
        self.cache.lock().len()
    }

    /// Validate one record against one schema.
    ///
    /// A schema rejecting the document is an [`Outcome`] with violations,
    /// never an error.
    pub fn validate_one(
        &self,
        record: &DataRecord,
        schema: &SchemaDocument,
    ) -> Result<Outcome, UnexpectedValidationError> {
        let validator = self.compiled(schema)?;
        let violations = validator
            .iter_errors(record.content())
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();
        Ok(Outcome { violations })
    }

    /// Validate a record against every compatible candidate in the registry,
    /// or against the fallback source's document when there is none.
    pub fn validate_record(
        &self,
        record: &DataRecord,
        registry: &SchemaRegistry,
        fallback: &dyn SchemaSource,
    ) -> Result<RecordReport, UnexpectedValidationError> {
        let mut report = RecordReport::default();
        let candidates = registry.candidates_for(record.target());

        if candidates.is_empty() {
            match self.fetch_fallback(record.target(), fallback)? {
                Some(schema) => self.check(record, &schema, &mut report)?,
                None => report.missing_schema = true,
            }
            return Ok(report);
        }

        for schema in candidates {
            self.check(record, schema, &mut report)?;
        }
        Ok(report)
    }

    fn fetch_fallback(
        &self,
        target: &SchemaIdentity,
        fallback: &dyn SchemaSource,
    ) -> Result<Option<SchemaDocument>, UnexpectedValidationError> {
        if let Some(cached) = self.fetched.lock().get(target) {
            return Ok(cached.clone());
        }
        let fetched = fallback
            .fetch_schema(target)
            .map_err(|source| UnexpectedValidationError::Source {
                target: target.clone(),
                source,
            })?;
        self.fetched.lock().insert(target.clone(), fetched.clone());
        Ok(fetched)
    }

    fn check(
        &self,
        record: &DataRecord,
        schema: &SchemaDocument,
        report: &mut RecordReport,
    ) -> Result<(), UnexpectedValidationError> {
        let outcome = self.validate_one(record, schema)?;
        report.validated += 1;
        tracing::debug!(
            data = %record.path().display(),
            schema = %schema.identity(),
            passed = outcome.passed(),
            "validated"
        );

        let kind = match (record.expectation(), outcome.passed()) {
            (Expectation::Pass, false) => MismatchKind::ExpectedPassGotFail,
            (Expectation::Fail, true) => MismatchKind::ExpectedFailGotPass,
            _ => return Ok(()),
        };
        report.mismatches.push(Mismatch {
            kind,
            data_path: record.path().to_path_buf(),
            target: record.target().clone(),
            schema: schema.identity().clone(),
            schema_origin: schema.origin().clone(),
            violations: outcome.into_violations(),
        });
        Ok(())
    }

    fn compiled(&self, schema: &SchemaDocument) -> Result<Arc<Validator>, UnexpectedValidationError> {
        if let Some(validator) = self.cache.lock().get(schema.identity()) {
            return Ok(Arc::clone(validator));
        }
        let validator = Arc::new(self.compile(schema)?);
        self.cache
            .lock()
            .insert(schema.identity().clone(), Arc::clone(&validator));
        Ok(validator)
    }

    fn compile(&self, schema: &SchemaDocument) -> Result<Validator, UnexpectedValidationError> {
        let mut content = schema.content().clone();
        if schema.declared_id().is_none() {
            if let (Some(map), Ok(uri)) = (
                content.as_object_mut(),
                self.store.canonical_uri(schema.identity()),
            ) {
                map.insert("$id".to_string(), Value::String(uri));
            }
        }

        let misses = Arc::new(Mutex::new(Vec::new()));
        let retriever = StoreRetriever {
            documents: self.store.shared(),
            misses: Arc::clone(&misses),
        };

        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);
        opts.should_validate_formats(true);
        opts.with_retriever(retriever);

        opts.build(&content).map_err(|e| match misses.lock().first() {
            Some(uri) => UnexpectedValidationError::DanglingReference {
                schema: schema.identity().clone(),
                uri: uri.clone(),
            },
            None => UnexpectedValidationError::SchemaCompile {
                schema: schema.identity().clone(),
                reason: e.to_string(),
            },
        })
    }
}
