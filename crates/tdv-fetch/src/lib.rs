//! # tdv-fetch — Remote Schema Source
//!
//! Blocking HTTP access to published schemas. A [`RemoteSchemaSource`]
//! answers two kinds of lookups for the validator:
//!
//! - **By identity**: when a data record has no local candidate, the
//!   schema is fetched from its canonical URI (e.g.
//!   `https://w3id.org/openmhealth/schemas/omh/heart-rate-1.0.json`).
//! - **By URL**: during loading, the external documents referenced by
//!   synthetic wrapper schemas are pre-fetched so they can be indexed in
//!   the resolution store before validation starts.
//!
//! A `404` means "not published" and yields no document. Every other
//! failure (transport, timeout, non-200 status, unparseable body) is
//! reported as a degradable [`tdv_schema::SourceError::Remote`], which the
//! validator turns into a missing-schema warning.
//!
//! The client never follows `$ref`s itself; reference resolution stays in
//! the resolution store.

pub mod error;
pub mod remote;

pub use error::FetchError;
pub use remote::RemoteSchemaSource;
