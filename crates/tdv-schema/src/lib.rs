//! # tdv-schema — Schema Registry, Resolution Store & Validation Engine
//!
//! Validates data documents against versioned JSON Schemas and reports
//! whether each outcome matches the document's declared expectation.
//!
//! ## Load phase
//!
//! A [`CatalogBuilder`] collects every schema document (local files via
//! [`LocalSchemaSource`], generated wrappers via [`SyntheticSource`]) into a
//! [`SchemaRegistry`] grouped by `namespace:name:major`, and into a flat
//! URI → content map. [`CatalogBuilder::finish`] then derives the wildcard
//! (`name-major.x.json`) aliases and freezes the map into a
//! [`ResolutionStore`]. Nothing is validated until the store is frozen, so
//! every `$ref` can see every schema.
//!
//! ## Validation phase
//!
//! A [`ValidationRun`] asks the registry for each record's compatible
//! candidates (same major, minor ≥ the record's minor), validates against
//! all of them with the [`ValidationEngine`], and records a [`Mismatch`] for
//! every candidate whose outcome disagrees with the record's expectation.
//! Records without a candidate go to the fallback [`SchemaSource`] chain.
//!
//! ## Error policy
//!
//! - Mismatches and missing schemas are recoverable and aggregated in the
//!   [`RunReport`].
//! - Load errors, malformed data paths and [`UnexpectedValidationError`]s
//!   (uncompilable schemas, dangling references, I/O) abort the run.

pub mod alias;
pub mod catalog;
pub mod data;
pub mod engine;
pub mod error;
pub mod local;
pub mod registry;
pub mod run;
pub mod source;
pub mod store;
pub mod synthetic;

pub use alias::{WildcardAlias, WildcardAliasBuilder};
pub use catalog::{CatalogBuilder, SchemaCatalog};
pub use data::{discover_data_files, load_data_records};
pub use engine::{Mismatch, MismatchKind, Outcome, RecordReport, ValidationEngine, Violation};
pub use error::{LoadError, RegistryError, RunError, SourceError, UnexpectedValidationError};
pub use local::LocalSchemaSource;
pub use registry::SchemaRegistry;
pub use run::{MissingSchema, RunReport, ValidationRun};
pub use source::{FallbackChain, SchemaSource};
pub use store::{ResolutionStore, ResolutionStoreBuilder};
pub use synthetic::{SyntheticSource, SyntheticWrapper};
