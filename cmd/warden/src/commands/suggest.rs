//! Suggest command implementation.

use super::{load_catalog, ServiceArgs};
use anyhow::Result;
use std::path::Path;

/// Runs the suggest command.
pub async fn run(catalog_path: Option<&Path>, service: &ServiceArgs, policy_id: &str) -> Result<()> {
    let catalog = load_catalog(catalog_path)?;
    let policy = catalog.require_policy(policy_id)?;
    let assistant = service.assistant()?;

    for prompt in assistant.suggest_prompts(policy).await {
        println!("{prompt}");
    }
    Ok(())
}
