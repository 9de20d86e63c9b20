//! # Validation Run
//!
//! Drives the validation phase over a frozen [`SchemaCatalog`]: every data
//! record is validated against its candidates, mismatches and missing
//! schemas are aggregated, and the first unexpected error aborts the run.
//!
//! The phases are carried by types: a [`CatalogBuilder`](crate::CatalogBuilder)
//! is loading, a [`SchemaCatalog`] is ready, [`ValidationRun::execute`]
//! either completes with a [`RunReport`] or aborts with a [`RunError`].

use std::path::PathBuf;

use tdv_core::{DataRecord, SchemaIdentity};

use crate::catalog::SchemaCatalog;
use crate::engine::{Mismatch, MismatchKind, ValidationEngine};
use crate::error::RunError;
use crate::source::SchemaSource;

/// A record whose schema could not be found anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingSchema {
    /// The schema the record targeted.
    pub target: SchemaIdentity,
    /// Path of the data file.
    pub data_path: PathBuf,
}

/// Aggregated result of a completed run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Number of data records processed.
    pub records: usize,
    /// Number of (record, schema) validations performed.
    pub validations: usize,
    /// Every mismatch, in processing order.
    pub mismatches: Vec<Mismatch>,
    /// Every record without a schema, in processing order.
    pub missing: Vec<MissingSchema>,
}

impl RunReport {
    /// Whether every outcome matched its expectation.
    ///
    /// Missing schemas are warnings and do not affect success.
    pub fn is_success(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Number of mismatches of one kind.
    pub fn count(&self, kind: MismatchKind) -> usize {
        self.mismatches.iter().filter(|m| m.kind == kind).count()
    }

    /// Process exit code: 0 on success, 1 if any mismatch was found.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// The validation phase of a run.
pub struct ValidationRun<'a> {
    catalog: &'a SchemaCatalog,
    engine: ValidationEngine,
    fallback: &'a dyn SchemaSource,
}

impl<'a> ValidationRun<'a> {
    /// Prepare a run over a frozen catalog. `fallback` is consulted for
    /// records with no compatible candidate.
    pub fn new(catalog: &'a SchemaCatalog, fallback: &'a dyn SchemaSource) -> Self {
        Self {
            catalog,
            engine: ValidationEngine::new(catalog.store().clone()),
            fallback,
        }
    }

    /// The engine used by this run.
    pub fn engine(&self) -> &ValidationEngine {
        &self.engine
    }

    /// Validate every record in order.
    ///
    /// Stops at the first unexpected error; mismatches and missing schemas
    /// never stop the run.
    pub fn execute(&self, records: &[DataRecord]) -> Result<RunReport, RunError> {
        let mut report = RunReport::default();

        for record in records {
            let result = self
                .engine
                .validate_record(record, self.catalog.registry(), self.fallback)
                .map_err(|source| RunError::Validation {
                    path: record.path().to_path_buf(),
                    source,
                })?;

            report.records += 1;
            report.validations += result.validated;

            if result.missing_schema {
                tracing::warn!(
                    schema = %record.target(),
                    data = %record.path().display(),
                    "no local or remote schema found"
                );
                report.missing.push(MissingSchema {
                    target: record.target().clone(),
                    data_path: record.path().to_path_buf(),
                });
            }

            for mismatch in &result.mismatches {
                tracing::error!(
                    data = %mismatch.data_path.display(),
                    schema = %mismatch.schema,
                    kind = ?mismatch.kind,
                    "outcome contradicts expectation"
                );
            }
            report.mismatches.extend(result.mismatches);
        }

        tracing::info!(
            records = report.records,
            validations = report.validations,
            mismatches = report.mismatches.len(),
            missing = report.missing.len(),
            "validation run complete"
        );
        Ok(report)
    }
}
