//! # Check Subcommand
//!
//! Loads scheme descriptors, runs the selected conformance policies, and
//! prints every violation.
//!
//! ```bash
//! tagcheck check testdata/scheme
//! tagcheck check testdata/scheme --policy internal-json --format json
//! tagcheck check scheme/ --config policy.yaml
//! ```

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tagcheck_conformance::{run_suite, Policy, PolicyConfig, SuiteReport};

use crate::load::load_scheme;
use crate::{EXIT_CLEAN, EXIT_VIOLATIONS};

/// Which policies `check` runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicySelection {
    /// All three policies.
    All,
    /// No description annotations on internal types.
    Description,
    /// No wire annotations on internal types.
    InternalJson,
    /// Wire annotations on every external field.
    ExternalJson,
}

impl PolicySelection {
    /// The policies selected, in run order.
    pub fn policies(self) -> Vec<Policy> {
        match self {
            Self::All => Policy::ALL.to_vec(),
            Self::Description => vec![Policy::Description],
            Self::InternalJson => vec![Policy::InternalWireTag],
            Self::ExternalJson => vec![Policy::ExternalWireTag],
        }
    }
}

/// Report rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per violation plus a summary per policy.
    Text,
    /// The full suite report as JSON.
    Json,
}

/// Arguments for the check subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Descriptor files or directories.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Policies to run.
    #[arg(long, value_enum, default_value_t = PolicySelection::All)]
    pub policy: PolicySelection,

    /// Policy configuration file (YAML).
    #[arg(long, env = "TAGCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Execute the check subcommand.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    let config = PolicyConfig::resolve(args.config.as_deref())
        .context("failed to load policy configuration")?;
    let scheme = load_scheme(&args.paths)?;
    let suite = run_suite(&scheme, &config, &args.policy.policies());

    let stdout = std::io::stdout();
    render(&suite, args.format, &mut stdout.lock())?;

    Ok(if suite.is_clean() { EXIT_CLEAN } else { EXIT_VIOLATIONS })
}

/// Write `suite` to `out` in the requested format.
pub fn render(suite: &SuiteReport, format: OutputFormat, out: &mut impl Write) -> Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{suite}")?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, suite).context("failed to serialize report")?;
            writeln!(out)?;
        }
    }
    Ok(())
}
