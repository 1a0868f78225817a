//! # List Subcommand
//!
//! Prints what a set of descriptors registers: external versions in
//! priority order, then the internal version of every group, each with its
//! known kinds.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tagcheck_core::GroupVersion;
use tagcheck_scheme::Scheme;

use crate::load::load_scheme;
use crate::EXIT_CLEAN;

/// Arguments for the list subcommand.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Descriptor files or directories.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

/// Execute the list subcommand.
pub fn run_list(args: &ListArgs) -> Result<u8> {
    let scheme = load_scheme(&args.paths)?;
    let stdout = std::io::stdout();
    write_listing(&scheme, &mut stdout.lock())?;
    Ok(EXIT_CLEAN)
}

/// Write the registration listing of `scheme` to `out`.
pub fn write_listing(scheme: &Scheme, out: &mut impl Write) -> Result<()> {
    writeln!(out, "External versions:")?;
    write_versions(scheme, &scheme.prioritized_versions_all_groups(), out)?;
    writeln!(out)?;
    writeln!(out, "Internal versions:")?;
    write_versions(scheme, &scheme.internal_versions_all_groups(), out)?;
    writeln!(out)?;
    writeln!(out, "Total: {} types", scheme.type_count())?;
    Ok(())
}

fn write_versions(scheme: &Scheme, versions: &[GroupVersion], out: &mut impl Write) -> Result<()> {
    if versions.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for gv in versions {
        writeln!(out, "  {gv}")?;
        for (kind, name) in scheme.known_kinds(gv) {
            writeln!(out, "    {kind:<24} {name}")?;
        }
    }
    Ok(())
}
