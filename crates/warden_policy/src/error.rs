//! Error types for catalog and policy operations.

use thiserror::Error;

/// Errors that can occur while editing policies or loading catalogs.
#[derive(Debug, Error)]
pub enum Error {
    /// Two rules in one policy share an id.
    #[error("policy '{policy}' has duplicate rule id '{rule_id}'")]
    DuplicateRuleId {
        /// Name of the offending policy.
        policy: String,
        /// The repeated rule id.
        rule_id: String,
    },

    /// No policy with the given id.
    #[error("unknown policy: {0}")]
    UnknownPolicy(String),

    /// No product with the given id.
    #[error("unknown product: {0}")]
    UnknownProduct(String),

    /// Catalog file extension is not recognized.
    #[error("unknown catalog format: {0}")]
    UnknownFormat(String),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML error.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for policy operations.
pub type Result<T> = std::result::Result<T, Error>;
