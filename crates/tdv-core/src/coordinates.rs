//! # Data-Path Coordinates
//!
//! A data file's target schema and declared expectation are encoded in its
//! path relative to the data root:
//!
//! ```text
//! <namespace>/<name>/<major>.<minor>/<expectation>/<file>
//!   omh      /blood-pressure/2.0   /shouldPass   /valid-reading.json
//! ```
//!
//! The expectation segment is `shouldPass` for documents that must validate;
//! any other value (conventionally `shouldFail`) means the document must be
//! rejected. Paths with more or fewer segments are malformed.

use std::path::{Component, Path, PathBuf};

use crate::error::CoordinateError;
use crate::identity::SchemaIdentity;
use crate::version::Version;

/// Expectation directory name for documents that must validate.
pub const SHOULD_PASS_SEGMENT: &str = "shouldPass";

/// Number of path segments below the data root (four directories and the file).
const SEGMENT_COUNT: usize = 5;

/// The declared validation outcome of a data document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expectation {
    /// The document must validate against every compatible schema.
    Pass,
    /// The document must be rejected by every compatible schema.
    Fail,
}

impl Expectation {
    /// Interpret an expectation directory name.
    pub fn from_segment(segment: &str) -> Self {
        if segment == SHOULD_PASS_SEGMENT {
            Self::Pass
        } else {
            Self::Fail
        }
    }

    /// Whether a passing validation is expected.
    pub fn is_pass(self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl std::fmt::Display for Expectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "should pass"),
            Self::Fail => write!(f, "should fail"),
        }
    }
}

/// Schema coordinates decoded from a data file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataCoordinates {
    /// The schema the document was written for.
    pub identity: SchemaIdentity,
    /// The declared outcome.
    pub expectation: Expectation,
    /// The data file name.
    pub file_name: String,
}

impl DataCoordinates {
    /// Decode the coordinates of `path`, which must lie under `data_root`.
    pub fn from_path(path: &Path, data_root: &Path) -> Result<Self, CoordinateError> {
        let relative = path
            .strip_prefix(data_root)
            .map_err(|_| CoordinateError::OutsideDataRoot {
                path: path.to_path_buf(),
                root: data_root.to_path_buf(),
            })?;
        Self::from_relative(relative)
    }

    /// Decode coordinates from a path already relative to the data root.
    pub fn from_relative(relative: &Path) -> Result<Self, CoordinateError> {
        let mut segments = Vec::with_capacity(SEGMENT_COUNT);
        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    let part = part.to_str().ok_or_else(|| CoordinateError::NonUtf8 {
                        path: relative.to_path_buf(),
                    })?;
                    segments.push(part);
                }
                Component::CurDir => {}
                _ => {
                    return Err(CoordinateError::WrongSegmentCount {
                        path: relative.to_path_buf(),
                        found: 0,
                    })
                }
            }
        }

        let [namespace, name, version, expectation, file_name] = segments[..] else {
            return Err(CoordinateError::WrongSegmentCount {
                path: relative.to_path_buf(),
                found: segments.len(),
            });
        };

        let invalid = |source| CoordinateError::InvalidIdentity {
            path: PathBuf::from(relative),
            source,
        };
        let version: Version = version.parse().map_err(invalid)?;
        let identity = SchemaIdentity::new(namespace, name, version).map_err(invalid)?;

        Ok(Self {
            identity,
            expectation: Expectation::from_segment(expectation),
            file_name: file_name.to_string(),
        })
    }
}
