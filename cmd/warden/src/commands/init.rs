//! Init command implementation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;
use warden_policy::seed;

/// File name of the catalog written by `init`.
const CATALOG_FILE: &str = "catalog.yaml";

/// Runs the init command.
pub fn run(path: &str) -> Result<()> {
    let project_path = Path::new(path);

    info!("Initializing Warden catalog at: {}", project_path.display());

    fs::create_dir_all(project_path)
        .with_context(|| format!("Failed to create directory: {}", project_path.display()))?;

    let catalog_path = project_path.join(CATALOG_FILE);
    if catalog_path.exists() {
        info!("Skipped: {} (already exists)", catalog_path.display());
    } else {
        warden_policy::io::save(&seed::catalog(), &catalog_path)
            .with_context(|| format!("Failed to create {CATALOG_FILE}"))?;
        info!("Created: {}", catalog_path.display());
    }

    info!("Warden catalog ready. Next steps:");
    info!("  1. Edit {} to describe your policies", catalog_path.display());
    info!(
        "  2. Run 'warden --catalog {} compile <policy-id>'",
        catalog_path.display()
    );
    info!("  3. Set ANTHROPIC_API_KEY and run 'warden console' to try them out");

    Ok(())
}
