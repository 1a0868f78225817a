//! Scheme loading shared by the subcommands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tagcheck_scheme::{DescriptorLoader, Scheme};

/// Load every descriptor under `paths` into a verified scheme.
pub fn load_scheme(paths: &[PathBuf]) -> Result<Scheme> {
    let loader = DescriptorLoader::new().context("failed to compile the descriptor schema")?;
    let scheme = loader.load(paths).with_context(|| {
        format!(
            "failed to load scheme descriptors from {}",
            display_paths(paths)
        )
    })?;
    scheme
        .verify()
        .context("scheme references types that are not defined")?;
    tracing::debug!(types = scheme.type_count(), "scheme verified");
    Ok(scheme)
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
