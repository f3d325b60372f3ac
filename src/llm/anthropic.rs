// Anthropic Messages API adapter
// API Reference: https://docs.anthropic.com/en/api/messages
//
// Extended thinking is always on: the response then carries `thinking` parts
// ahead of the final `text` part. Only text parts are kept.

use crate::llm::provider::LLMAdapter;
use crate::types::{AppError, AppResult, ContentPart, LLMRequest, LLMResponse, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const API_VERSION: &str = "2023-06-01";

pub struct AnthropicAdapter {
    client: Client,
    api_key: String,
    base_url: String,
}

// Request types for the Messages API
#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<AnthropicMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking: Option<ThinkingConfig>,
}

#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a [ContentPart],
}

#[derive(Serialize)]
struct ThinkingConfig {
    #[serde(rename = "type")]
    kind: &'static str,
    budget_tokens: u32,
}

// Response types
#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ResponsePart>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ResponsePart {
    #[serde(rename = "text")]
    Text { text: String },
    // thinking, redacted_thinking, tool_use, ...
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Deserialize)]
struct AnthropicErrorResponse {
    error: AnthropicError,
}

#[derive(Deserialize)]
struct AnthropicError {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

impl AnthropicAdapter {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the adapter at a different host (proxies, tests)
    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }
}

/// Last text part wins; empty when the model produced none
fn final_text(parts: Vec<ResponsePart>) -> String {
    parts
        .into_iter()
        .filter_map(|part| match part {
            ResponsePart::Text { text } => Some(text),
            ResponsePart::Other => None,
        })
        .last()
        .unwrap_or_default()
}

#[async_trait]
impl LLMAdapter for AnthropicAdapter {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        let body = AnthropicRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            messages: request
                .messages
                .iter()
                .map(|m| AnthropicMessage {
                    role: &m.role,
                    content: &m.content,
                })
                .collect(),
            thinking: request.thinking_budget.map(|budget_tokens| ThinkingConfig {
                kind: "enabled",
                budget_tokens,
            }),
        };

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::LLMApi(format!("Anthropic request failed: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if let Ok(error_response) = serde_json::from_str::<AnthropicErrorResponse>(&error_text) {
                return Err(AppError::LLMApi(format!(
                    "Anthropic API error ({}): {} ({})",
                    status, error_response.error.message, error_response.error.error_type
                )));
            }

            return Err(AppError::LLMApi(format!(
                "Anthropic API error ({}): {}",
                status, error_text
            )));
        }

        let raw = response
            .text()
            .await
            .map_err(|e| AppError::LLMApi(format!("Failed to read Anthropic response: {}", e)))?;
        debug!(response = %raw, "Anthropic response received");

        let parsed: AnthropicResponse = serde_json::from_str(&raw)
            .map_err(|e| AppError::LLMApi(format!("Failed to parse Anthropic response: {}", e)))?;

        let usage = parsed
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.input_tokens,
                completion_tokens: u.output_tokens,
                total_tokens: u.input_tokens + u.output_tokens,
            })
            .unwrap_or_default();

        Ok(LLMResponse {
            content: final_text(parsed.content),
            finish_reason: parsed.stop_reason.unwrap_or_else(|| "unknown".to_string()),
            usage,
        })
    }
}

/// Fixed generation parameters for answering questions
pub mod models {
    pub const CLAUDE_3_7_SONNET: &str = "claude-3-7-sonnet-20250219";
    /// Output ceiling, thinking tokens included
    pub const MAX_TOKENS: u32 = 20_000;
    pub const THINKING_BUDGET: u32 = 16_000;

    pub const DEFAULT: &str = CLAUDE_3_7_SONNET;
}
