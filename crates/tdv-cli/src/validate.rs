//! # Validate Subcommand
//!
//! Loads every schema under the schema root (plus synthetic wrappers for
//! the external namespace), freezes the resolution store, then validates
//! every data file under the data root against all compatible schema
//! versions.
//!
//! Output: one `FAIL:` block per mismatch, one `WARN:` line per record
//! without a schema, and a summary. Exit code 0 when every outcome matched
//! its expectation, 1 otherwise.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tdv_core::ValidatorConfig;
use tdv_fetch::RemoteSchemaSource;
use tdv_schema::{
    load_data_records, CatalogBuilder, FallbackChain, LocalSchemaSource, MismatchKind, RunReport,
    SyntheticSource, ValidationRun,
};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Root of the schema tree (`<root>/<namespace>/<name>-<M>.<m>.json`).
    #[arg(long, default_value = "../schema")]
    pub schema_root: PathBuf,

    /// Root of the test-data tree
    /// (`<root>/<namespace>/<name>/<M>.<m>/<shouldPass|shouldFail>/<file>.json`).
    #[arg(long, default_value = "../test-data")]
    pub data_root: PathBuf,

    /// Never fetch over HTTP. Disables remote fallback and the external
    /// documents behind synthetic wrappers.
    #[arg(long)]
    pub offline: bool,

    /// Do not generate synthetic wrapper schemas.
    #[arg(long)]
    pub no_synthetic: bool,

    /// Per-request timeout for remote fetches, in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl ValidateArgs {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_to(&self, config: &mut ValidatorConfig) {
        if self.offline {
            config.remote.enabled = false;
        }
        if self.no_synthetic {
            config.synthetic.enabled = false;
        }
        if let Some(secs) = self.timeout_secs {
            config.remote.timeout_secs = secs;
        }
    }
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, mut config: ValidatorConfig) -> Result<u8> {
    args.apply_to(&mut config);
    let uris = config
        .namespace_uris()
        .context("invalid namespace configuration")?;

    let remote = if config.remote.enabled {
        Some(
            RemoteSchemaSource::from_config(&config.remote, uris.clone())
                .context("failed to initialise remote schema source")?,
        )
    } else {
        tracing::info!("remote schema access disabled");
        None
    };

    // Load phase.
    let mut builder = CatalogBuilder::new(uris.clone());
    builder
        .load_local(&LocalSchemaSource::new(&args.schema_root))
        .with_context(|| format!("failed to load schemas from {}", args.schema_root.display()))?;

    if config.synthetic.enabled {
        match &remote {
            Some(remote) => {
                let synthetic = SyntheticSource::new(config.synthetic.clone(), uris.clone());
                builder
                    .load_synthetic(&synthetic, remote)
                    .context("failed to register synthetic schemas")?;
            }
            None => tracing::warn!(
                namespace = %config.synthetic.namespace,
                "remote access disabled, synthetic wrappers not registered"
            ),
        }
    }
    let catalog = builder.finish().context("failed to build resolution store")?;

    let records = load_data_records(&args.data_root)
        .with_context(|| format!("failed to load data from {}", args.data_root.display()))?;
    if records.is_empty() {
        println!("No data files found.");
        return Ok(0);
    }
    tracing::info!(count = records.len(), "discovered data files");

    // Validation phase.
    let fallback = fallback_chain(&args.schema_root, remote);
    let report = ValidationRun::new(&catalog, &fallback)
        .execute(&records)
        .context("validation aborted")?;

    print_report(&report);
    Ok(report.exit_code())
}

/// Sources consulted for records with no registered candidate: the schema
/// tree on disk first, then the published URLs when remote access is on.
fn fallback_chain(schema_root: &Path, remote: Option<RemoteSchemaSource>) -> FallbackChain {
    let mut chain = FallbackChain::new().with(LocalSchemaSource::new(schema_root));
    if let Some(remote) = remote {
        chain.push(Box::new(remote));
    }
    chain
}

fn print_report(report: &RunReport) {
    for mismatch in &report.mismatches {
        println!("FAIL: {mismatch}");
    }
    for missing in &report.missing {
        println!(
            "WARN: no local or remote schema {} for {}",
            missing.target,
            missing.data_path.display()
        );
    }

    println!();
    println!(
        "{} data files, {} validations: {} unexpected failures, {} unexpected passes, {} missing schemas",
        report.records,
        report.validations,
        report.count(MismatchKind::ExpectedPassGotFail),
        report.count(MismatchKind::ExpectedFailGotPass),
        report.missing.len(),
    );
    if report.is_success() {
        println!("OK: all outcomes match their expectations");
    }
}
