//! Completion service access for Warden.
//!
//! This crate provides:
//! - The [`CompletionService`] seam and its request types
//! - A Claude API client implementing it, with schema-forced structured output
//! - [`Assistant`], which shapes policy simulation, test-prompt suggestion and
//!   requirements extraction requests and validates their responses
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use warden_claude::{Assistant, Client, ClientConfig};
//!
//! let client = Client::new(ClientConfig::from_env()?)?;
//! let assistant = Assistant::new(Arc::new(client));
//! let prompts = assistant.suggest_prompts(&policy).await;
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod assistant;
pub mod client;
pub mod error;
pub mod prompt;
pub mod response;
pub mod service;

pub use assistant::{
    Assistant, AssistantConfig, EMPTY_REPLY, EXTRACTION_MODEL_VAR, FALLBACK_PROMPTS, SUGGESTION_COUNT,
};
pub use client::{Client, ClientConfig, API_KEY_VAR, MODEL_VAR, TIMEOUT_VAR};
pub use error::{Error, ExtractionFailed, Result};
pub use service::{CompletionRequest, CompletionService, OutputSchema, Turn, TurnRole};
