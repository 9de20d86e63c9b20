//! # Schema Versions
//!
//! A schema version is a `(major, minor)` pair of non-negative integers,
//! ordered by major and then minor, and written as `"{major}.{minor}"`.
//!
//! Minor revisions within a major are expected to stay backward-compatible,
//! which is what the registry's candidate rule relies on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IdentityError;

/// A `(major, minor)` schema version.
///
/// The derived ordering compares `major` first, then `minor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    major: u32,
    minor: u32,
}

impl Version {
    /// Create a version from its components.
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// The major component.
    pub fn major(&self) -> u32 {
        self.major
    }

    /// The minor component.
    pub fn minor(&self) -> u32 {
        self.minor
    }

    /// Whether a record written for `self` must also satisfy `schema`.
    ///
    /// True when both share a major and `schema` is the same or a later minor.
    pub fn is_satisfied_by(&self, schema: &Version) -> bool {
        self.major == schema.major && schema.minor >= self.minor
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for Version {
    type Err = IdentityError;

    /// Parse `"<major>.<minor>"`. Both components must be plain decimal
    /// digits without leading zeros; signs, whitespace and qualifiers are
    /// rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || IdentityError::MalformedVersion {
            value: s.to_string(),
        };

        let (major, minor) = s.split_once('.').ok_or_else(malformed)?;
        Ok(Self {
            major: parse_component(major).ok_or_else(malformed)?,
            minor: parse_component(minor).ok_or_else(malformed)?,
        })
    }
}

fn parse_component(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    s.parse().ok()
}

impl TryFrom<String> for Version {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}
