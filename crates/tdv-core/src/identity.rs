//! # Schema Identities and Canonical URIs
//!
//! A [`SchemaIdentity`] names one schema document: `(namespace, name, version)`.
//! The canonical URI of an identity is its namespace's base URL followed by
//! `<name>-<major>.<minor>.json`; the wildcard URI replaces the minor with `x`.
//!
//! ## Invariants
//!
//! - Identity → URI is deterministic and injective. Names and namespaces
//!   never contain `/`, and no two namespaces share a base URL, so
//!   [`NamespaceUris::parse_uri`] recovers exactly the identity that built
//!   the URI.
//! - The same file-name convention is used on disk
//!   (`<schema_root>/<namespace>/<name>-<major>.<minor>.json`), so
//!   [`SchemaIdentity::from_schema_path`] is the filesystem inverse.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::IdentityError;
use crate::version::Version;

/// File extension shared by schema documents and their URIs.
const JSON_SUFFIX: &str = ".json";

/// Identity of a single schema document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaIdentity {
    namespace: String,
    name: String,
    version: Version,
}

impl SchemaIdentity {
    /// Create an identity, validating the namespace and name segments.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidSegment`] if either segment is empty
    /// or contains `/` or `:`.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        version: Version,
    ) -> Result<Self, IdentityError> {
        let namespace = namespace.into();
        let name = name.into();
        check_segment("namespace", &namespace)?;
        check_segment("name", &name)?;
        Ok(Self {
            namespace,
            name,
            version,
        })
    }

    /// Parse a schema file name (`<name>-<major>.<minor>.json`) within a
    /// namespace.
    ///
    /// The name is everything before the last `-`, so names may themselves
    /// contain hyphens (`blood-pressure-2.0.json`).
    pub fn from_file_name(namespace: &str, file_name: &str) -> Result<Self, IdentityError> {
        let malformed = || IdentityError::MalformedFileName {
            file_name: file_name.to_string(),
        };

        let stem = file_name.strip_suffix(JSON_SUFFIX).ok_or_else(malformed)?;
        let (name, version) = stem.rsplit_once('-').ok_or_else(malformed)?;
        let version: Version = version.parse().map_err(|_| malformed())?;
        Self::new(namespace, name, version)
    }

    /// Parse a schema file path laid out as `.../<namespace>/<name>-<major>.<minor>.json`.
    pub fn from_schema_path(path: &Path) -> Result<Self, IdentityError> {
        let malformed = || IdentityError::MalformedFileName {
            file_name: path.display().to_string(),
        };

        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .ok_or_else(malformed)?;
        let namespace = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .ok_or_else(malformed)?;
        Self::from_file_name(namespace, file_name)
    }

    /// The namespace, e.g. `omh`.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The schema name, e.g. `blood-pressure`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The schema version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// The file name of this schema: `<name>-<major>.<minor>.json`.
    pub fn file_name(&self) -> String {
        format!("{}-{}{JSON_SUFFIX}", self.name, self.version)
    }

    /// The wildcard file name of this schema's major: `<name>-<major>.x.json`.
    pub fn wildcard_file_name(&self) -> String {
        format!("{}-{}.x{JSON_SUFFIX}", self.name, self.version.major())
    }

    /// The registry group this identity belongs to.
    pub fn major_key(&self) -> MajorVersionKey {
        MajorVersionKey {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            major: self.version.major(),
        }
    }
}

impl fmt::Display for SchemaIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.name, self.version)
    }
}

fn check_segment(kind: &'static str, value: &str) -> Result<(), IdentityError> {
    if value.is_empty() || value.contains('/') || value.contains(':') {
        return Err(IdentityError::InvalidSegment {
            kind,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Registry group key: `namespace:name:major`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MajorVersionKey {
    /// The namespace.
    pub namespace: String,
    /// The schema name.
    pub name: String,
    /// The major version shared by every member of the group.
    pub major: u32,
}

impl fmt::Display for MajorVersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.name, self.major)
    }
}

// ---------------------------------------------------------------------------
// Namespace base URL table
// ---------------------------------------------------------------------------

/// Default base URL for the Open mHealth namespace.
pub const OMH_BASE_URI: &str = "https://w3id.org/openmhealth/schemas/omh/";
/// Default base URL for the Granola namespace.
pub const GRANOLA_BASE_URI: &str = "https://w3id.org/openmhealth/schemas/granola/";
/// Default base URL for the IEEE 1752 namespace.
pub const IEEE_BASE_URI: &str = "https://w3id.org/ieee/ieee-1752-schema/";

/// Table of per-namespace base URLs.
///
/// Every base is stored with a trailing `/` so that canonical URIs are the
/// plain concatenation `base + file_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceUris {
    bases: BTreeMap<String, String>,
}

impl NamespaceUris {
    /// Create an empty table.
    pub fn empty() -> Self {
        Self {
            bases: BTreeMap::new(),
        }
    }

    /// Build a table from `namespace → base URL` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidSegment`] for a bad namespace and
    /// [`IdentityError::DuplicateBase`] if two namespaces share a base.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, IdentityError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut table = Self::empty();
        for (namespace, base) in pairs {
            table.insert(namespace, base)?;
        }
        Ok(table)
    }

    /// Register a namespace base URL, normalizing the trailing `/`.
    pub fn insert(
        &mut self,
        namespace: impl Into<String>,
        base: impl Into<String>,
    ) -> Result<(), IdentityError> {
        let namespace = namespace.into();
        check_segment("namespace", &namespace)?;

        let mut base = base.into();
        if !base.ends_with('/') {
            base.push('/');
        }

        if let Some((other, _)) = self
            .bases
            .iter()
            .find(|(ns, b)| **b == base && **ns != namespace)
        {
            return Err(IdentityError::DuplicateBase {
                first: other.clone(),
                second: namespace,
                base,
            });
        }

        self.bases.insert(namespace, base);
        Ok(())
    }

    /// The base URL of a namespace, with trailing `/`.
    pub fn base_for(&self, namespace: &str) -> Option<&str> {
        self.bases.get(namespace).map(String::as_str)
    }

    /// Iterate the configured namespaces in sorted order.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.bases.keys().map(String::as_str)
    }

    /// The canonical URI of an identity.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::UnknownNamespace`] if the namespace has no base.
    pub fn canonical_uri(&self, identity: &SchemaIdentity) -> Result<String, IdentityError> {
        Ok(format!("{}{}", self.require_base(identity)?, identity.file_name()))
    }

    /// The wildcard ("latest minor of this major") URI of an identity.
    pub fn wildcard_uri(&self, identity: &SchemaIdentity) -> Result<String, IdentityError> {
        Ok(format!(
            "{}{}",
            self.require_base(identity)?,
            identity.wildcard_file_name()
        ))
    }

    /// Parse a canonical URI back into the identity that produced it.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::UnrecognizedUri`] if no base is a prefix of
    /// the URI with a bare file name after it, or a file-name error if the
    /// remainder is not `<name>-<major>.<minor>.json`.
    pub fn parse_uri(&self, uri: &str) -> Result<SchemaIdentity, IdentityError> {
        let (namespace, file_name) = self
            .bases
            .iter()
            .find_map(|(ns, base)| {
                uri.strip_prefix(base.as_str())
                    .filter(|rest| !rest.is_empty() && !rest.contains('/'))
                    .map(|rest| (ns, rest))
            })
            .ok_or_else(|| IdentityError::UnrecognizedUri {
                uri: uri.to_string(),
            })?;
        SchemaIdentity::from_file_name(namespace, file_name)
    }

    fn require_base(&self, identity: &SchemaIdentity) -> Result<&str, IdentityError> {
        self.base_for(identity.namespace())
            .ok_or_else(|| IdentityError::UnknownNamespace {
                namespace: identity.namespace().to_string(),
            })
    }
}

impl Default for NamespaceUris {
    fn default() -> Self {
        let bases = [
            ("granola", GRANOLA_BASE_URI),
            ("ieee", IEEE_BASE_URI),
            ("omh", OMH_BASE_URI),
        ]
        .into_iter()
        .map(|(ns, base)| (ns.to_string(), base.to_string()))
        .collect();
        Self { bases }
    }
}
