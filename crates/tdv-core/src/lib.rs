#![deny(missing_docs)]

//! # tdv-core — Foundational Types for the Test-Data Validator
//!
//! This crate defines the types every other crate in the workspace builds
//! on. It performs no network I/O and only touches the filesystem to read
//! an optional configuration file.
//!
//! ## Design Principles
//!
//! 1. **Typed identities.** A schema is addressed by a [`SchemaIdentity`]
//!    (namespace, name, [`Version`]). Canonical and wildcard URIs are derived
//!    from it through a [`NamespaceUris`] table, and parsed back into it.
//!
//! 2. **Path conventions are parsed once.** A data file's target schema and
//!    declared expectation come from [`DataCoordinates`], which rejects any
//!    path that does not follow `<namespace>/<name>/<major>.<minor>/<expectation>/<file>`.
//!
//! 3. **Immutable records.** [`SchemaDocument`] and [`DataRecord`] are built
//!    during the load phase and never mutated afterwards.
//!
//! 4. **Structured errors.** Every failure is a `thiserror` variant carrying
//!    the offending input. No `.unwrap()` outside tests.

pub mod config;
pub mod coordinates;
pub mod document;
pub mod error;
pub mod identity;
pub mod version;

// Re-export primary types at crate root for ergonomic imports.
pub use config::{RemoteConfig, SyntheticConfig, ValidatorConfig};
pub use coordinates::{DataCoordinates, Expectation};
pub use document::{DataRecord, SchemaDocument, SchemaOrigin};
pub use error::{ConfigError, CoordinateError, IdentityError};
pub use identity::{MajorVersionKey, NamespaceUris, SchemaIdentity};
pub use version::Version;
