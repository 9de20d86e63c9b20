//! # tdv-cli — Test-Data Validator Command-Line Interface
//!
//! Provides the `tdv` command-line tool, which checks that every sample
//! document in a test-data tree passes or fails the versioned JSON Schemas
//! it was written for, exactly as its directory declares.
//!
//! ## Subcommands
//!
//! - `tdv validate`: load schemas, validate every data file, report
//!   mismatches, exit 1 on any mismatch.
//!
//! ```bash
//! tdv validate
//! tdv validate --schema-root schema --data-root test-data --offline
//! tdv -vv --config tdv.yaml validate --timeout-secs 5
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives here; loading and validation are delegated to
//!   `tdv-schema` and `tdv-fetch`.
//! - Results go to stdout; diagnostics go through `tracing`.

pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use tdv_core::ValidatorConfig;

/// Load the validator configuration.
///
/// Starts from the file at `path` if one is given, otherwise from the
/// built-in defaults, then applies `TDV_*` environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<ValidatorConfig> {
    let mut config = match path {
        Some(path) => ValidatorConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ValidatorConfig::default(),
    };
    config
        .apply_env_overrides()
        .context("invalid environment override")?;
    Ok(config)
}
