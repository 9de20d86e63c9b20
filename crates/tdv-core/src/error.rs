//! # Error Hierarchy
//!
//! Structured error types for the foundational layer, built with `thiserror`.
//!
//! Each error carries the input that was rejected so an author can find the
//! offending file or configuration entry without re-running with extra
//! logging.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or parsing schema identities and URIs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// A version string is not of the form `<major>.<minor>`.
    #[error("malformed version: \"{value}\" (expected <major>.<minor>)")]
    MalformedVersion {
        /// The rejected version string.
        value: String,
    },

    /// A schema file name is not of the form `<name>-<major>.<minor>.json`.
    #[error("malformed schema file name: \"{file_name}\" (expected <name>-<major>.<minor>.json)")]
    MalformedFileName {
        /// The rejected file name.
        file_name: String,
    },

    /// A namespace or schema name is empty or contains a reserved character.
    #[error("invalid {kind}: \"{value}\" (must be non-empty and contain no '/' or ':')")]
    InvalidSegment {
        /// Which part of the identity was rejected (`namespace` or `name`).
        kind: &'static str,
        /// The rejected value.
        value: String,
    },

    /// No base URL is configured for the namespace.
    #[error("no base URL configured for namespace \"{namespace}\"")]
    UnknownNamespace {
        /// The namespace without a configured base.
        namespace: String,
    },

    /// A URI does not fall under any configured namespace base.
    #[error("URI \"{uri}\" does not belong to any configured namespace")]
    UnrecognizedUri {
        /// The rejected URI.
        uri: String,
    },

    /// Two namespaces share the same base URL, which would make URI parsing
    /// ambiguous.
    #[error("namespaces \"{first}\" and \"{second}\" share the base URL {base}")]
    DuplicateBase {
        /// The namespace registered first.
        first: String,
        /// The namespace registered second.
        second: String,
        /// The shared base URL.
        base: String,
    },
}

/// A data file path that does not decompose into schema coordinates.
///
/// Data files must live at
/// `<data_root>/<namespace>/<name>/<major>.<minor>/<expectation>/<file>`.
/// Any deviation aborts the run before validation begins.
#[derive(Error, Debug)]
pub enum CoordinateError {
    /// The path is not located under the data root.
    #[error("data file {path} is not under the data root {root}")]
    OutsideDataRoot {
        /// The data file path.
        path: PathBuf,
        /// The configured data root.
        root: PathBuf,
    },

    /// The relative path has the wrong number of segments.
    #[error("data file {path} has {found} path segment(s) below the data root (expected <namespace>/<name>/<major>.<minor>/<expectation>/<file>)")]
    WrongSegmentCount {
        /// The data file path, relative to the data root.
        path: PathBuf,
        /// Number of segments found.
        found: usize,
    },

    /// A path segment is not valid UTF-8.
    #[error("data file {path} contains a non UTF-8 path segment")]
    NonUtf8 {
        /// The data file path.
        path: PathBuf,
    },

    /// The segments do not form a valid schema identity.
    #[error("data file {path} has invalid schema coordinates: {source}")]
    InvalidIdentity {
        /// The data file path.
        path: PathBuf,
        /// The identity error.
        #[source]
        source: IdentityError,
    },
}

/// Errors while loading or validating the validator configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config file {path}: {source}")]
    Read {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for the expected structure.
    #[error("cannot parse config: {reason}")]
    Parse {
        /// Human-readable parser message.
        reason: String,
    },

    /// A configured base URL is not an absolute URL.
    #[error("invalid base URL for namespace \"{namespace}\": {reason}")]
    InvalidBaseUrl {
        /// The namespace whose base URL was rejected.
        namespace: String,
        /// Why the URL was rejected.
        reason: String,
    },

    /// An environment override could not be parsed.
    #[error("invalid value for {var}: \"{value}\"")]
    InvalidEnvOverride {
        /// The environment variable name.
        var: String,
        /// The rejected value.
        value: String,
    },

    /// The synthetic namespace has no configured base URL.
    #[error("synthetic namespace \"{0}\" has no entry in the namespaces table")]
    UnknownSyntheticNamespace(String),

    /// The namespace table itself is inconsistent.
    #[error("namespace table error: {0}")]
    Identity(#[from] IdentityError),
}
