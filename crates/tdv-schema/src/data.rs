//! # Data Record Discovery
//!
//! Data files live under
//! `<data_root>/<namespace>/<name>/<major>.<minor>/<expectation>/<file>`.
//! Any non-hidden file whose name contains `.json` is a data file. Files are
//! returned sorted by path so runs are reproducible.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tdv_core::{DataCoordinates, DataRecord};

use crate::error::LoadError;

/// Every data file under `data_root`, sorted by path.
pub fn discover_data_files(data_root: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let mut files = Vec::new();
    walk(data_root, &mut files)?;
    files.sort();
    Ok(files)
}

/// Discover, decode and parse every data file under `data_root`.
///
/// Every record is parsed before any validation starts, so a malformed path
/// or unparseable document aborts the run up front.
pub fn load_data_records(data_root: &Path) -> Result<Vec<DataRecord>, LoadError> {
    discover_data_files(data_root)?
        .into_iter()
        .map(|path| load_record(&path, data_root))
        .collect()
}

fn load_record(path: &Path, data_root: &Path) -> Result<DataRecord, LoadError> {
    let coordinates = DataCoordinates::from_path(path, data_root)?;
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let content: Value = serde_json::from_str(&text).map_err(|e| LoadError::DataParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(DataRecord::new(coordinates, content, path))
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), LoadError> {
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
            walk(&path, out)?;
        } else if name.contains(".json") {
            out.push(path);
        }
    }
    Ok(())
}
