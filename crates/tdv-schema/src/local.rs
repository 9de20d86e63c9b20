//! # Local Schema Files
//!
//! Schemas live under `<schema_root>/<namespace>/<name>-<major>.<minor>.json`.
//! The namespace is the name of the directory that directly contains the
//! file. Hidden files and files ending in `x.json` (hand-written wildcard
//! copies) are never loaded.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tdv_core::{SchemaDocument, SchemaIdentity, SchemaOrigin};

use crate::error::{LoadError, SourceError};
use crate::source::SchemaSource;

/// Schemas read from a directory tree.
#[derive(Debug, Clone)]
pub struct LocalSchemaSource {
    root: PathBuf,
}

impl LocalSchemaSource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The schema root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every schema file under the root, sorted by path.
    pub fn discover(&self) -> Result<Vec<PathBuf>, LoadError> {
        let mut files = Vec::new();
        walk_schema_files(&self.root, &mut files)?;
        files.sort();
        Ok(files)
    }

    /// Read and parse every schema file under the root.
    ///
    /// A file whose name does not encode an identity, or whose content is
    /// not JSON, fails the whole load.
    pub fn load_all(&self) -> Result<Vec<SchemaDocument>, LoadError> {
        let files = self.discover()?;
        let mut documents = Vec::with_capacity(files.len());
        for path in files {
            let identity = SchemaIdentity::from_schema_path(&path).map_err(|source| {
                LoadError::SchemaIdentity {
                    path: path.clone(),
                    source,
                }
            })?;
            let content = read_json(&path)?;
            tracing::debug!(schema = %identity, path = %path.display(), "loaded schema");
            documents.push(SchemaDocument::new(
                identity,
                content,
                SchemaOrigin::LocalPath(path),
            ));
        }
        Ok(documents)
    }
}

impl SchemaSource for LocalSchemaSource {
    fn name(&self) -> &str {
        "local"
    }

    fn fetch_schema(&self, identity: &SchemaIdentity) -> Result<Option<SchemaDocument>, SourceError> {
        let path = self.root.join(identity.namespace()).join(identity.file_name());
        if !path.is_file() {
            return Ok(None);
        }
        let content = read_json(&path)?;
        Ok(Some(SchemaDocument::new(
            identity.clone(),
            content,
            SchemaOrigin::LocalPath(path),
        )))
    }
}

fn read_json(path: &Path) -> Result<Value, SourceError> {
    let text = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|e| SourceError::Parse {
        location: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Whether a file name is a loadable schema.
pub(crate) fn is_schema_file_name(name: &str) -> bool {
    !name.starts_with('.') && name.ends_with(".json") && !name.ends_with("x.json")
}

fn walk_schema_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), LoadError> {
    let entries = std::fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        if path.is_dir() {
            walk_schema_files(&path, out)?;
        } else if is_schema_file_name(name) {
            out.push(path);
        } else {
            tracing::trace!(path = %path.display(), "skipping non-schema file");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tdv_core::Version;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn schema_file_name_filter() {
        assert!(is_schema_file_name("blood-pressure-2.0.json"));
        assert!(!is_schema_file_name("blood-pressure-2.x.json"));
        assert!(!is_schema_file_name(".blood-pressure-2.0.json"));
        assert!(!is_schema_file_name("README.md"));
    }

    #[test]
    fn load_all_skips_wildcards_and_hidden_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "omh/step-count-1.0.json", r#"{"type":"object"}"#);
        write(dir.path(), "omh/step-count-1.x.json", r#"{"type":"object"}"#);
        write(dir.path(), "omh/.swap-1.0.json", "not json");
        write(dir.path(), ".git/config-1.0.json", "not json");
        write(dir.path(), "granola/acceleration-1.0.json", r#"{}"#);

        let docs = LocalSchemaSource::new(dir.path()).load_all().unwrap();
        let ids: Vec<String> = docs.iter().map(|d| d.identity().to_string()).collect();
        assert_eq!(ids, vec!["granola:acceleration:1.0", "omh:step-count:1.0"]);
    }

    #[test]
    fn load_all_rejects_unversioned_file_name() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "omh/step-count.json", r#"{}"#);
        let err = LocalSchemaSource::new(dir.path()).load_all().unwrap_err();
        assert!(matches!(err, LoadError::SchemaIdentity { .. }));
    }

    #[test]
    fn load_all_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "omh/step-count-1.0.json", "{");
        let err = LocalSchemaSource::new(dir.path()).load_all().unwrap_err();
        assert!(matches!(err, LoadError::Source(SourceError::Parse { .. })));
    }

    #[test]
    fn missing_root_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalSchemaSource::new(dir.path().join("absent"))
            .load_all()
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn fetch_schema_reads_exact_identity() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "omh/heart-rate-1.1.json", r#"{"type":"object"}"#);
        let source = LocalSchemaSource::new(dir.path());

        let hit = SchemaIdentity::new("omh", "heart-rate", Version::new(1, 1)).unwrap();
        let miss = SchemaIdentity::new("omh", "heart-rate", Version::new(1, 0)).unwrap();
        assert!(source.fetch_schema(&hit).unwrap().is_some());
        assert!(source.fetch_schema(&miss).unwrap().is_none());
    }
}
