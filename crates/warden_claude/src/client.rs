//! Claude API client.

use crate::error::{Error, Result};
use crate::response::MessageResponse;
use crate::service::{CompletionRequest, CompletionService, TurnRole};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
/// Environment variable overriding the default model.
pub const MODEL_VAR: &str = "WARDEN_MODEL";
/// Environment variable overriding the request timeout.
pub const TIMEOUT_VAR: &str = "WARDEN_TIMEOUT_SECS";

/// Claude API client implementing [`CompletionService`].
pub struct Client {
    api_key: String,
    http: reqwest::Client,
    model: String,
    api_url: String,
}

/// Configuration for the Claude client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Default model (default: claude-sonnet-4-20250514).
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Messages endpoint.
    pub api_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "claude-sonnet-4-20250514".to_string(),
            timeout_seconds: 120,
            api_url: API_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the API key is missing or empty, or
    /// if the timeout is not a number.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the API key is missing or empty, or
    /// if the timeout is not a number.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(API_KEY_VAR)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Configuration(format!("{API_KEY_VAR} is not set")))?;

        let mut config = Self {
            api_key,
            ..Self::default()
        };
        if let Some(model) = lookup(MODEL_VAR).filter(|m| !m.is_empty()) {
            config.model = model;
        }
        if let Some(timeout) = lookup(TIMEOUT_VAR) {
            config.timeout_seconds = timeout.parse().map_err(|_| {
                Error::Configuration(format!("{TIMEOUT_VAR} must be a number of seconds"))
            })?;
        }
        Ok(config)
    }
}

/// Request body for Claude API.
#[derive(Debug, Serialize)]
struct MessageRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

/// A message in the conversation.
#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

/// A tool declaration used to carry an output schema.
#[derive(Debug, Serialize)]
struct Tool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ToolChoice {
    Tool { name: String },
}

impl Client {
    /// Creates a new Claude client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or the HTTP client cannot be
    /// built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::Configuration(format!("{API_KEY_VAR} is not set")));
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            api_key: config.api_key,
            http,
            model: config.model,
            api_url: config.api_url,
        })
    }

    /// The model used when a request does not name one.
    #[must_use]
    pub fn default_model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, request: CompletionRequest) -> MessageRequest {
        let messages = request
            .turns
            .into_iter()
            .map(|turn| Message {
                role: match turn.role {
                    TurnRole::User => "user",
                    TurnRole::Model => "assistant",
                },
                content: turn.text,
            })
            .collect();

        let (tools, tool_choice) = request.schema.map_or_else(
            || (Vec::new(), None),
            |schema| {
                let choice = ToolChoice::Tool {
                    name: schema.name.clone(),
                };
                (
                    vec![Tool {
                        name: schema.name,
                        description: schema.description,
                        input_schema: schema.schema,
                    }],
                    Some(choice),
                )
            },
        );

        MessageRequest {
            model: request.model.unwrap_or_else(|| self.model.clone()),
            max_tokens: MAX_TOKENS,
            messages,
            system: request.system,
            temperature: request.temperature,
            tools,
            tool_choice,
        }
    }

    async fn call_api(&self, request: &MessageRequest) -> Result<MessageResponse> {
        debug!(
            "Sending request to Claude API ({} messages, model {})",
            request.messages.len(),
            request.model
        );

        let response = self
            .http
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        debug!("Received response with status: {}", status);

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(Error::RateLimited {
                retry_after_seconds: retry_after,
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::InvalidApiKey);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::ApiError(format!(
                "API request failed with status {status}: {error_text}"
            )));
        }

        let msg_response: MessageResponse = response
            .json()
            .await
            .map_err(|e| Error::ParseError(format!("Failed to parse API response: {e}")))?;

        info!(
            "Received response: {} input tokens, {} output tokens",
            msg_response.usage.input_tokens, msg_response.usage.output_tokens
        );

        Ok(msg_response)
    }
}

#[async_trait]
impl CompletionService for Client {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let tool = request.schema.as_ref().map(|s| s.name.clone());
        let body = self.build_request(request);
        let response = self.call_api(&body).await?;

        // Structured output arrives as the forced tool's input; a model that
        // answered in plain text is left for the caller's parser to reject.
        Ok(tool
            .and_then(|name| response.tool_input(&name).map(ToString::to_string))
            .unwrap_or_else(|| response.text()))
    }
}
