//! Product registration from a requirements document.

use crate::error::{Error, Result};
use tracing::{info, warn};
use warden_claude::Assistant;
use warden_policy::{Catalog, ProductForm, RegisteredProduct};

/// Runs extraction and merges the result into the catalog.
#[derive(Debug, Clone)]
pub struct Registrar {
    assistant: Assistant,
}

impl Registrar {
    /// Creates a registrar backed by `assistant`.
    #[must_use]
    pub const fn new(assistant: Assistant) -> Self {
        Self { assistant }
    }

    /// Registers a product described by `form`.
    ///
    /// The catalog is only touched once extraction has succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompleteForm`] when the name or the document is
    /// blank, and [`Error::ExtractionFailed`] when the model call fails or
    /// returns an unusable payload.
    pub async fn register(
        &self,
        catalog: &mut Catalog,
        form: ProductForm,
    ) -> Result<RegisteredProduct> {
        if !form.is_complete() {
            return Err(Error::IncompleteForm);
        }

        info!("Analyzing requirements for '{}'", form.name);
        let extraction = self
            .assistant
            .extract_from_prd(&form.prd, &form.name)
            .await
            .map_err(|e| {
                warn!("Registration of '{}' aborted: {}", form.name, e);
                e
            })?;

        Ok(catalog.register_product(form, extraction))
    }
}
