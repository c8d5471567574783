//! Claude API response handling.

use serde::{Deserialize, Serialize};

/// Claude API message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Response ID.
    pub id: String,
    /// Model used.
    pub model: String,
    /// Stop reason.
    pub stop_reason: Option<String>,
    /// Content blocks.
    pub content: Vec<ContentBlock>,
    /// Usage statistics.
    pub usage: Usage,
}

/// Content block in a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    /// Text content block.
    #[serde(rename = "text")]
    Text {
        /// The text content.
        text: String,
    },
    /// Structured output delivered as a tool invocation.
    #[serde(rename = "tool_use")]
    ToolUse {
        /// Invocation id.
        id: String,
        /// Tool name.
        name: String,
        /// Tool input, which is the structured output.
        input: serde_json::Value,
    },
    /// Any block type this client does not consume.
    #[serde(other)]
    Other,
}

/// Token usage statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    /// Number of input tokens consumed.
    pub input_tokens: u64,
    /// Number of output tokens generated.
    pub output_tokens: u64,
}

impl MessageResponse {
    /// Extracts the text content from the response.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Returns the input of the named tool invocation, if present.
    #[must_use]
    pub fn tool_input(&self, tool: &str) -> Option<&serde_json::Value> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::ToolUse { name, input, .. } if name == tool => Some(input),
            _ => None,
        })
    }
}

/// Extracts a JSON payload from model text.
///
/// Accepts bare JSON or JSON inside a fenced code block (with or without a
/// language tag).
#[must_use]
pub fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();

    // Look for ```json ... ``` blocks
    if let Some(start) = trimmed.find("```json") {
        let content_start = start + 7;
        if let Some(end) = trimmed[content_start..].find("```") {
            return trimmed[content_start..content_start + end].trim();
        }
    }

    // Fallback: look for ``` ... ``` blocks
    if let Some(start) = trimmed.find("```") {
        let content_start = start + 3;
        // Skip language identifier if present
        let content_start = trimmed[content_start..]
            .find('\n')
            .map_or(content_start, |n| content_start + n + 1);
        if let Some(end) = trimmed[content_start..].find("```") {
            return trimmed[content_start..content_start + end].trim();
        }
    }

    trimmed
}
