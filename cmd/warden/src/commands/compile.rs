//! Compile command implementation.

use super::load_catalog;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;
use warden_compiler::Compiler;

/// Runs the compile command.
pub fn run(catalog_path: Option<&Path>, policy_id: &str, output: Option<&Path>) -> Result<()> {
    let catalog = load_catalog(catalog_path)?;
    let policy = catalog.require_policy(policy_id)?;

    info!(
        "Compiling policy '{}' with {} rules",
        policy.name,
        policy.rules.len()
    );
    let instruction = Compiler::new().compile(policy);

    match output {
        Some(path) => {
            fs::write(path, &instruction)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            info!("System instruction written to: {}", path.display());
        }
        None => print!("{instruction}"),
    }

    Ok(())
}
