//! Policy-aware requests to the completion service.
//!
//! [`Assistant`] shapes the three calls the console makes: a policy-constrained
//! chat turn, test-prompt suggestions and requirements extraction. Failure
//! handling is deliberately asymmetric: suggestions degrade to a fixed list,
//! extraction failures reach the caller.

use crate::client::MODEL_VAR;
use crate::error::{Error, ExtractionFailed, Result};
use crate::prompt;
use crate::response::extract_json;
use crate::service::{CompletionRequest, CompletionService, OutputSchema};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use warden_compiler::Compiler;
use warden_policy::{ChatMessage, ExtractionResult, Policy};

/// Environment variable overriding the extraction model.
pub const EXTRACTION_MODEL_VAR: &str = "WARDEN_EXTRACTION_MODEL";

/// Number of test prompts requested per policy.
pub const SUGGESTION_COUNT: usize = 3;

/// Sampling temperature for simulated turns.
pub const SIMULATION_TEMPERATURE: f32 = 0.1;

/// Suggestions shown when the service cannot provide any.
pub const FALLBACK_PROMPTS: [&str; SUGGESTION_COUNT] = [
    "Tell me more about your rules.",
    "Can you help me with a specific task?",
    "What are your limitations?",
];

/// Reply recorded when the model returns no text.
pub const EMPTY_REPLY: &str =
    "I'm sorry, I couldn't process that request within policy bounds.";

const PROMPTS_TOOL: &str = "record_test_prompts";
const EXTRACTION_TOOL: &str = "record_prd_analysis";

/// Test prompts for a policy.
#[derive(Debug, Deserialize, JsonSchema)]
struct TestPrompts {
    /// Short, realistic user prompts; at least one adversarial.
    prompts: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PromptsPayload {
    Wrapped(TestPrompts),
    Bare(Vec<String>),
}

/// Model selection and sampling settings.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Model for chat turns and suggestions; service default when absent.
    pub chat_model: Option<String>,
    /// Model for requirements extraction; service default when absent.
    pub extraction_model: Option<String>,
    /// Temperature for simulated turns.
    pub temperature: f32,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            chat_model: None,
            extraction_model: None,
            temperature: SIMULATION_TEMPERATURE,
        }
    }
}

impl AssistantConfig {
    /// Reads model overrides from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads model overrides through `lookup`.
    ///
    /// Extraction falls back to the chat model when no extraction model is set.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let chat_model = lookup(MODEL_VAR).filter(|m| !m.trim().is_empty());
        let extraction_model = lookup(EXTRACTION_MODEL_VAR)
            .filter(|m| !m.trim().is_empty())
            .or_else(|| chat_model.clone());
        Self {
            chat_model,
            extraction_model,
            ..Self::default()
        }
    }
}

/// Policy-aware front end to a [`CompletionService`].
#[derive(Clone)]
pub struct Assistant {
    service: Arc<dyn CompletionService>,
    compiler: Compiler,
    config: AssistantConfig,
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Assistant {
    /// Creates an assistant with default settings.
    #[must_use]
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self::with_config(service, AssistantConfig::default())
    }

    /// Creates an assistant with the given settings.
    #[must_use]
    pub fn with_config(service: Arc<dyn CompletionService>, config: AssistantConfig) -> Self {
        Self {
            service,
            compiler: Compiler::new(),
            config,
        }
    }

    /// The fixed suggestion list used when the service fails.
    #[must_use]
    pub fn fallback_prompts() -> Vec<String> {
        FALLBACK_PROMPTS.iter().map(ToString::to_string).collect()
    }

    /// Produces the assistant's reply to the latest turn of `transcript`.
    ///
    /// The system instruction is compiled from `policy` on every call.
    ///
    /// # Errors
    ///
    /// Returns the service error unchanged; the caller decides how to recover.
    pub async fn simulate_turn(&self, policy: &Policy, transcript: &[ChatMessage]) -> Result<String> {
        let request = CompletionRequest::conversation(transcript)
            .with_model(self.config.chat_model.clone())
            .with_system(self.compiler.compile(policy))
            .with_temperature(self.config.temperature);

        debug!(
            "Simulating turn {} under policy {}",
            request.turns.len(),
            policy.id
        );

        let reply = self.service.complete(request).await?;
        if reply.trim().is_empty() {
            warn!("Model returned an empty reply for policy {}", policy.id);
            return Ok(EMPTY_REPLY.to_string());
        }
        Ok(reply)
    }

    /// Requests test prompts for a policy.
    ///
    /// Prompts are trimmed, blanks dropped and the list cut to
    /// [`SUGGESTION_COUNT`].
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, on a malformed payload, or when
    /// no usable prompt remains.
    pub async fn try_suggest_prompts(&self, policy: &Policy) -> Result<Vec<String>> {
        let schema = OutputSchema::of::<TestPrompts>(
            PROMPTS_TOOL,
            "Record test prompts for the policy under test.",
        )?;
        let request = CompletionRequest::prompt(prompt::suggestion_prompt(policy, SUGGESTION_COUNT))
            .with_model(self.config.chat_model.clone())
            .with_schema(schema);

        let raw = self.service.complete(request).await?;
        let prompts = match parse_structured::<PromptsPayload>(&raw)? {
            PromptsPayload::Wrapped(p) => p.prompts,
            PromptsPayload::Bare(p) => p,
        };

        let prompts: Vec<String> = prompts
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .take(SUGGESTION_COUNT)
            .collect();
        if prompts.is_empty() {
            return Err(Error::SchemaViolation("no usable test prompts".to_string()));
        }
        Ok(prompts)
    }

    /// Requests test prompts, falling back to [`FALLBACK_PROMPTS`] on any failure.
    pub async fn suggest_prompts(&self, policy: &Policy) -> Vec<String> {
        match self.try_suggest_prompts(policy).await {
            Ok(prompts) => prompts,
            Err(e) => {
                warn!("Suggestions unavailable for policy {}: {}", policy.id, e);
                Self::fallback_prompts()
            }
        }
    }

    /// Extracts product data and suggested policies from a requirements document.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionFailed`] on transport failure or when the payload
    /// does not match the [`ExtractionResult`] shape. Never fabricates data.
    pub async fn extract_from_prd(
        &self,
        prd: &str,
        product_name: &str,
    ) -> std::result::Result<ExtractionResult, ExtractionFailed> {
        info!("Extracting requirements for product '{}'", product_name);

        let schema = OutputSchema::of::<ExtractionResult>(
            EXTRACTION_TOOL,
            "Record the structured analysis of the requirements document.",
        )?;
        let request = CompletionRequest::prompt(prompt::extraction_prompt(prd, product_name))
            .with_model(self.config.extraction_model.clone())
            .with_schema(schema);

        let raw = self.service.complete(request).await.map_err(|e| {
            warn!("Extraction request failed: {}", e);
            e
        })?;
        let result: ExtractionResult = parse_structured(&raw).map_err(|e| {
            warn!("Failed to parse extraction response: {}", e);
            e
        })?;

        info!(
            "Extracted {} features and {} suggested policies",
            result.extracted_features.len(),
            result.suggested_policies.len()
        );
        Ok(result)
    }
}

/// Parses a structured payload.
///
/// Tool input arrives as bare JSON and is parsed as is. Fenced blocks are only
/// looked for when that fails, so fences inside string values survive.
fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T> {
    serde_json::from_str(raw.trim()).or_else(|direct| {
        let fenced = extract_json(raw);
        if fenced.len() == raw.trim().len() {
            return Err(Error::ParseError(direct.to_string()));
        }
        serde_json::from_str(fenced).map_err(|e| Error::ParseError(e.to_string()))
    })
}
