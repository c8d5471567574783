//! Subcommand implementations and the helpers they share.

pub mod compile;
pub mod console;
pub mod init;
pub mod list;
pub mod register;
pub mod show;
pub mod suggest;

use anyhow::{Context, Result};
use clap::Args;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use warden_claude::{Assistant, AssistantConfig, Client, ClientConfig, API_KEY_VAR, MODEL_VAR};
use warden_policy::{seed, Catalog};

/// Completion service options. Only commands that call the model read them.
#[derive(Args)]
pub struct ServiceArgs {
    /// Anthropic API key
    #[arg(long, global = true, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model for chat turns and suggestions
    #[arg(long, global = true, env = "WARDEN_MODEL")]
    model: Option<String>,
}

impl ServiceArgs {
    fn lookup(&self, name: &str) -> Option<String> {
        match name {
            API_KEY_VAR => self.api_key.clone(),
            MODEL_VAR => self.model.clone(),
            other => std::env::var(other).ok(),
        }
    }

    /// Checks that the service can be configured, without building a client.
    ///
    /// Called before dispatching a command that talks to the model, so a
    /// missing key fails at startup rather than on the first request.
    pub fn validate(&self) -> Result<()> {
        ClientConfig::from_lookup(|name| self.lookup(name))
            .with_context(|| "Failed to configure the Claude client")?;
        Ok(())
    }

    /// Builds the assistant backed by the Claude API.
    pub fn assistant(&self) -> Result<Assistant> {
        let lookup = |name: &str| self.lookup(name);
        let config = ClientConfig::from_lookup(lookup)
            .with_context(|| "Failed to configure the Claude client")?;
        let client = Client::new(config).with_context(|| "Failed to create Claude client")?;
        Ok(Assistant::with_config(
            Arc::new(client),
            AssistantConfig::from_lookup(lookup),
        ))
    }
}

/// Loads the catalog snapshot, or the sample catalog when no path is given.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(path) => warden_policy::io::load(path)
            .with_context(|| format!("Failed to load catalog: {}", path.display())),
        None => {
            info!("No catalog given, using the sample catalog");
            Ok(seed::catalog())
        }
    }
}

/// Writes the catalog back to its snapshot. Without a path nothing is kept.
pub fn save_catalog(catalog: &Catalog, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            warden_policy::io::save(catalog, path)
                .with_context(|| format!("Failed to save catalog: {}", path.display()))?;
            info!("Catalog saved to {}", path.display());
        }
        None => warn!("No catalog given, changes are discarded on exit"),
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::testing::scratch;
    use super::*;

    #[test]
    fn missing_api_key_is_caught_by_validate() {
        let service = ServiceArgs {
            api_key: None,
            model: None,
        };
        let err = service.validate().unwrap_err();
        assert!(format!("{err:#}").contains(API_KEY_VAR));

        let service = ServiceArgs {
            api_key: Some("sk-test".to_string()),
            model: None,
        };
        assert!(service.validate().is_ok());
    }

    #[test]
    fn saved_catalog_is_loaded_back() {
        let path = scratch("saved.yaml");
        let mut catalog = load_catalog(None).unwrap();
        let mut policy = catalog.policies()[0].clone();
        policy.name = "Renamed".to_string();
        catalog.save_policy(policy).unwrap();

        save_catalog(&catalog, Some(&path)).unwrap();
        let loaded = load_catalog(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, catalog);
        assert_eq!(loaded.policies()[0].name, "Renamed");
    }
}
