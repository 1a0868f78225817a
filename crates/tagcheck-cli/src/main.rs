//! # tagcheck CLI entry point
//!
//! Parses command-line arguments, installs the tracing subscriber, and
//! dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use tagcheck_cli::check::{run_check, CheckArgs};
use tagcheck_cli::list::{run_list, ListArgs};
use tagcheck_cli::EXIT_ERROR;

/// Struct-tag conformance checker for API type schemes.
///
/// Internal types must carry no wire or description annotations; external
/// types must carry a wire annotation on every field.
#[derive(Parser, Debug)]
#[command(name = "tagcheck", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the conformance policies over a scheme.
    Check(CheckArgs),

    /// List registered versions and known types.
    List(ListArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    tracing::debug!("tagcheck v{} starting", env!("CARGO_PKG_VERSION"));

    let result = match &cli.command {
        Commands::Check(args) => run_check(args),
        Commands::List(args) => run_list(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// `RUST_LOG` wins over `-v` when set.
fn init_tracing(verbose: u8, format: LogFormat) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
