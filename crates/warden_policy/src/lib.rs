//! Typed policy model and in-memory catalog for Warden.
//!
//! This crate provides:
//! - Policy, rule, product and transcript types
//! - The extraction result shape, which doubles as the model output schema
//! - A single-owner [`Catalog`] with replace-by-id saves and extraction merges
//! - Catalog snapshot import/export (YAML or JSON)
//!
//! # Example
//!
//! ```rust
//! use warden_policy::{seed, Policy, RuleDraft};
//!
//! let mut catalog = seed::catalog();
//! let mut policy = Policy::draft();
//! policy.name = "Refund Rules".to_string();
//! policy.add_rule(RuleDraft {
//!     trigger: "User asks for a refund".to_string(),
//!     ..Default::default()
//! });
//!
//! let id = catalog.save_policy(policy).unwrap();
//! assert_eq!(catalog.policies()[0].id, id);
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod catalog;
pub mod error;
pub mod io;
pub mod model;
pub mod seed;

pub use catalog::{Catalog, CatalogSummary, ProductForm, RegisteredProduct};
pub use error::{Error, Result};
pub use model::{
    ChatMessage, ExtractionResult, Policy, PolicyStatus, PolicyType, Product, ProductStatus,
    ProductType, Role, Rule, RuleDraft, SuggestedPolicy, SuggestedRule,
};
