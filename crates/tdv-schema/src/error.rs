//! # Schema Layer Errors
//!
//! Errors are split by the phase that raises them:
//!
//! - [`LoadError`] and [`RegistryError`] during the load phase.
//! - [`UnexpectedValidationError`] during the validation phase.
//! - [`SourceError`] from any [`crate::SchemaSource`]. Remote failures are
//!   degradable and only ever surface as a missing-schema warning.
//!
//! [`RunError`] is the single fatal error of a run. A schema rejecting a
//! document is never an error; it is an [`crate::Outcome`].

use std::path::PathBuf;

use tdv_core::{CoordinateError, IdentityError, SchemaIdentity, SchemaOrigin};
use thiserror::Error;

/// Registry configuration errors.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Two documents registered the same `namespace:name:major.minor`.
    #[error("duplicate registration of schema {identity}: already loaded from {existing}, again from {duplicate}")]
    DuplicateMinor {
        /// The duplicated identity.
        identity: SchemaIdentity,
        /// Origin of the document registered first.
        existing: SchemaOrigin,
        /// Origin of the rejected document.
        duplicate: SchemaOrigin,
    },
}

/// Errors raised by a [`crate::SchemaSource`].
#[derive(Error, Debug)]
pub enum SourceError {
    /// A remote fetch failed (network error, timeout, non-200 status, or an
    /// unparseable body). Degrades to "no schema available".
    #[error("remote fetch of {url} failed: {reason}")]
    Remote {
        /// The URL that was requested.
        url: String,
        /// Why the fetch failed.
        reason: String,
    },

    /// A local schema file exists but cannot be read.
    #[error("cannot read schema {path}: {source}")]
    Io {
        /// The schema file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A schema document exists but is not valid JSON.
    #[error("schema {location} is not valid JSON: {reason}")]
    Parse {
        /// Path or URL of the document.
        location: String,
        /// Parser message.
        reason: String,
    },

    /// No URI can be derived for the requested identity.
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

impl SourceError {
    /// Whether the error may be downgraded to "no schema available".
    pub fn is_degradable(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

/// Fatal errors of the load phase.
#[derive(Error, Debug)]
pub enum LoadError {
    /// A schema or data directory cannot be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// The path being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A schema file name does not follow `<name>-<major>.<minor>.json`.
    #[error("cannot derive schema identity from {path}: {source}")]
    SchemaIdentity {
        /// The schema file path.
        path: PathBuf,
        /// The identity error.
        #[source]
        source: IdentityError,
    },

    /// A data file is not valid JSON.
    #[error("data file {path} is not valid JSON: {reason}")]
    DataParse {
        /// The data file path.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// A data file path does not decompose into schema coordinates.
    #[error("malformed path coordinates: {0}")]
    MalformedPath(#[from] CoordinateError),

    /// A duplicate registration.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A document's canonical URI cannot be derived.
    #[error("cannot index schema: {0}")]
    Identity(#[from] IdentityError),

    /// A schema source failed in a way that cannot be degraded.
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Errors during validation that are not a schema rejecting a document.
///
/// Any of these indicates a tooling or schema-authoring defect and aborts
/// the whole run.
#[derive(Error, Debug)]
pub enum UnexpectedValidationError {
    /// The schema references a URI that is not in the resolution store.
    #[error("schema {schema} has a dangling reference to {uri}")]
    DanglingReference {
        /// The schema being compiled.
        schema: SchemaIdentity,
        /// The URI that could not be resolved.
        uri: String,
    },

    /// The schema is not a valid JSON Schema.
    #[error("schema {schema} cannot be compiled: {reason}")]
    SchemaCompile {
        /// The schema being compiled.
        schema: SchemaIdentity,
        /// Compiler message.
        reason: String,
    },

    /// The fallback source failed with a non-degradable error.
    #[error("fallback lookup for {target} failed: {source}")]
    Source {
        /// The identity being looked up.
        target: SchemaIdentity,
        /// The source error.
        #[source]
        source: SourceError,
    },
}

/// The reason a run was aborted.
#[derive(Error, Debug)]
pub enum RunError {
    /// The load phase failed.
    #[error("load failed: {0}")]
    Load(#[from] LoadError),

    /// Validation hit an unexpected error while processing a record.
    #[error("unexpected error validating {path}: {source}")]
    Validation {
        /// The data file being validated.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: UnexpectedValidationError,
    },
}
