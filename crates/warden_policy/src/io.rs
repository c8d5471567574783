//! Catalog import and export.
//!
//! Snapshots are YAML (`.yaml`, `.yml`) or JSON (`.json`), chosen by file
//! extension.

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
}

fn format_of(path: &Path) -> Result<Format> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "yaml" | "yml" => Ok(Format::Yaml),
        "json" => Ok(Format::Json),
        _ => Err(Error::UnknownFormat(path.display().to_string())),
    }
}

/// Loads a catalog snapshot.
///
/// # Errors
///
/// Returns an error if the extension is unknown or the file cannot be read
/// or parsed.
pub fn load(path: impl AsRef<Path>) -> Result<Catalog> {
    let path = path.as_ref();
    let format = format_of(path)?;
    let content = std::fs::read_to_string(path)?;
    debug!("Read {} bytes from {}", content.len(), path.display());

    let catalog: Catalog = match format {
        Format::Yaml => serde_yaml::from_str(&content)?,
        Format::Json => serde_json::from_str(&content)?,
    };
    for policy in catalog.policies() {
        policy.validate()?;
    }

    info!(
        "Loaded catalog with {} policies and {} products from {}",
        catalog.policies().len(),
        catalog.products().len(),
        path.display()
    );
    Ok(catalog)
}

/// Writes a catalog snapshot.
///
/// # Errors
///
/// Returns an error if the extension is unknown, serialization fails, or the
/// file cannot be written.
pub fn save(catalog: &Catalog, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let content = match format_of(path)? {
        Format::Yaml => serde_yaml::to_string(catalog)?,
        Format::Json => serde_json::to_string_pretty(catalog)?,
    };
    std::fs::write(path, content)?;
    Ok(())
}
