//! # Schema Documents and Data Records
//!
//! Immutable records created during the load phase. A [`SchemaDocument`] is
//! one parsed schema together with its identity and where it came from; a
//! [`DataRecord`] is one parsed data file together with the schema it
//! targets and its declared expectation.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::coordinates::{DataCoordinates, Expectation};
use crate::identity::SchemaIdentity;

/// Where a schema document was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaOrigin {
    /// Read from a file under the local schema root.
    LocalPath(PathBuf),
    /// Generated wrapper for an external namespace.
    Synthetic,
    /// Fetched over HTTP from the given URL.
    Remote(String),
}

impl fmt::Display for SchemaOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalPath(path) => write!(f, "{}", path.display()),
            Self::Synthetic => write!(f, "synthetic"),
            Self::Remote(url) => write!(f, "{url}"),
        }
    }
}

/// A parsed schema and its identity.
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    identity: SchemaIdentity,
    content: Value,
    origin: SchemaOrigin,
}

impl SchemaDocument {
    /// Create a schema document.
    pub fn new(identity: SchemaIdentity, content: Value, origin: SchemaOrigin) -> Self {
        Self {
            identity,
            content,
            origin,
        }
    }

    /// The schema identity.
    pub fn identity(&self) -> &SchemaIdentity {
        &self.identity
    }

    /// The parsed schema content.
    pub fn content(&self) -> &Value {
        &self.content
    }

    /// Where the document came from.
    pub fn origin(&self) -> &SchemaOrigin {
        &self.origin
    }

    /// The `$id` the document declares for itself, if any.
    pub fn declared_id(&self) -> Option<&str> {
        self.content.get("$id").and_then(Value::as_str)
    }
}

/// A parsed data file with its target schema and declared expectation.
#[derive(Debug, Clone)]
pub struct DataRecord {
    name: String,
    target: SchemaIdentity,
    content: Value,
    expectation: Expectation,
    path: PathBuf,
}

impl DataRecord {
    /// Create a record from decoded path coordinates and parsed content.
    pub fn new(coordinates: DataCoordinates, content: Value, path: impl Into<PathBuf>) -> Self {
        Self {
            name: coordinates.file_name,
            target: coordinates.identity,
            content,
            expectation: coordinates.expectation,
            path: path.into(),
        }
    }

    /// The data file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The schema identity the record was written for.
    pub fn target(&self) -> &SchemaIdentity {
        &self.target
    }

    /// The parsed JSON content.
    pub fn content(&self) -> &Value {
        &self.content
    }

    /// The declared expectation.
    pub fn expectation(&self) -> Expectation {
        self.expectation
    }

    /// Whether the record is expected to pass validation.
    pub fn expected_pass(&self) -> bool {
        self.expectation.is_pass()
    }

    /// Path of the source file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for DataRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DataRecord[name={}, schema={}, expectation={}]",
            self.name, self.target, self.expectation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_carries_path_coordinates() {
        let path = Path::new("omh/blood-pressure/2.0/shouldFail/missing-systolic.json");
        let coords = DataCoordinates::from_relative(path).unwrap();
        let record = DataRecord::new(coords, json!({}), path);
        assert_eq!(record.name(), "missing-systolic.json");
        assert!(!record.expected_pass());
        assert_eq!(record.target().to_string(), "omh:blood-pressure:2.0");
        assert!(record.to_string().contains("should fail"));
    }

    #[test]
    fn declared_id_reads_dollar_id() {
        let id = SchemaIdentity::from_file_name("omh", "header-1.2.json").unwrap();
        let doc = SchemaDocument::new(
            id,
            json!({"$id": "https://example.org/header-1.2.json"}),
            SchemaOrigin::Synthetic,
        );
        assert_eq!(doc.declared_id(), Some("https://example.org/header-1.2.json"));
        assert_eq!(doc.origin().to_string(), "synthetic");
    }
}
