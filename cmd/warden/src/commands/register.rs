//! Register command implementation.

use super::{load_catalog, save_catalog, ServiceArgs};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use warden_console::Registrar;
use warden_policy::{ProductForm, ProductType, RegisteredProduct};

/// Arguments of the register command.
pub struct Request {
    /// Product name.
    pub name: String,
    /// Target platform.
    pub product_type: ProductType,
    /// Requirements document to analyze.
    pub prd_path: PathBuf,
    /// Where to write the result; stdout when absent.
    pub output: Option<PathBuf>,
}

/// Runs the register command.
///
/// With `--catalog` the product and its draft policies are written back to
/// the snapshot, so later commands can show, compile and simulate them.
pub async fn run(catalog_path: Option<&Path>, service: &ServiceArgs, request: Request) -> Result<()> {
    let prd = fs::read_to_string(&request.prd_path).with_context(|| {
        format!(
            "Failed to read requirements document: {}",
            request.prd_path.display()
        )
    })?;
    let registrar = Registrar::new(service.assistant()?);

    let registered = register_into(
        catalog_path,
        &registrar,
        ProductForm {
            name: request.name,
            product_type: request.product_type,
            prd,
        },
    )
    .await?;

    let json = serde_json::to_string_pretty(&registered)?;
    match request.output {
        Some(path) => {
            fs::write(&path, json)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            info!("Registration written to: {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

async fn register_into(
    catalog_path: Option<&Path>,
    registrar: &Registrar,
    form: ProductForm,
) -> Result<RegisteredProduct> {
    let mut catalog = load_catalog(catalog_path)?;
    let registered = registrar
        .register(&mut catalog, form)
        .await
        .with_context(|| "Failed to register product")?;

    info!(
        "Registered '{}' ({}) with {} draft policies",
        registered.product.name,
        registered.product.id,
        registered.policies.len()
    );

    save_catalog(&catalog, catalog_path)?;
    Ok(registered)
}
