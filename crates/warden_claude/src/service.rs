//! The completion service seam.
//!
//! Everything that talks to a language model goes through
//! [`CompletionService`]. The Claude [`Client`](crate::Client) is the
//! production implementation; tests substitute scripted fakes.

use crate::error::{Error, Result};
use async_trait::async_trait;
use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use warden_policy::{ChatMessage, Role};

/// Speaker of a turn as the completion service sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    /// Human turn.
    User,
    /// Model turn.
    Model,
}

/// One conversation turn sent to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// Speaker.
    pub role: TurnRole,
    /// Turn text.
    pub text: String,
}

impl Turn {
    /// Creates a user turn.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }
}

/// A structured-output contract declared to the service.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    /// Short identifier for the output shape.
    pub name: String,
    /// What the output contains.
    pub description: String,
    /// JSON schema of the output object, with subschemas inlined.
    pub schema: serde_json::Value,
}

impl OutputSchema {
    /// Derives an output schema from a Rust type.
    ///
    /// # Errors
    ///
    /// Returns an error if the generated schema cannot be converted to JSON.
    pub fn of<T: JsonSchema>(name: impl Into<String>, description: impl Into<String>) -> Result<Self> {
        let root = SchemaSettings::draft07()
            .with(|s| {
                s.inline_subschemas = true;
                s.meta_schema = None;
            })
            .into_generator()
            .into_root_schema_for::<T>();
        let schema = serde_json::to_value(root)
            .map_err(|e| Error::SchemaViolation(format!("unrepresentable output schema: {e}")))?;

        Ok(Self {
            name: name.into(),
            description: description.into(),
            schema,
        })
    }
}

/// A request to the completion service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier; the service default is used when absent.
    pub model: Option<String>,
    /// Conversation turns in chronological order.
    pub turns: Vec<Turn>,
    /// System instruction.
    pub system: Option<String>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Structured-output contract. When set, the reply is JSON text.
    pub schema: Option<OutputSchema>,
}

impl CompletionRequest {
    /// Creates a single-turn request.
    #[must_use]
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::user(text)],
            ..Default::default()
        }
    }

    /// Creates a request from a chat transcript.
    ///
    /// `system` entries are dropped; they are superseded by the per-request
    /// system instruction.
    #[must_use]
    pub fn conversation(transcript: &[ChatMessage]) -> Self {
        Self {
            turns: turns_from_transcript(transcript),
            ..Default::default()
        }
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    /// Sets the system instruction.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Sets the temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Requests structured output.
    #[must_use]
    pub fn with_schema(mut self, schema: OutputSchema) -> Self {
        self.schema = Some(schema);
        self
    }
}

/// Maps a transcript to service turns, preserving order.
#[must_use]
pub fn turns_from_transcript(transcript: &[ChatMessage]) -> Vec<Turn> {
    transcript
        .iter()
        .filter_map(|m| {
            let role = match m.role {
                Role::User => TurnRole::User,
                Role::Assistant => TurnRole::Model,
                Role::System => return None,
            };
            Some(Turn {
                role,
                text: m.content.clone(),
            })
        })
        .collect()
}

/// A hosted language model that turns requests into generated text.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Generates a completion.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the service cannot be reached or
    /// answers with a non-success status, and a parse error when the
    /// response cannot be decoded.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}
