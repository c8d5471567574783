//! Show command implementation.

use super::load_catalog;
use anyhow::Result;
use std::path::Path;
use warden_compiler::render_brief;

/// Runs the show command.
pub fn run(catalog_path: Option<&Path>, policy_id: &str) -> Result<()> {
    let catalog = load_catalog(catalog_path)?;
    let policy = catalog.require_policy(policy_id)?;
    print!("{}", render_brief(policy));
    Ok(())
}
