use std::sync::Arc;

use async_trait::async_trait;

use crate::types::{AppResult, LLMRequest, LLMResponse};

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

/// Configuration for the upstream provider
pub struct LLMProviderConfig {
    pub name: String,
    pub api_key: String,
    pub base_url: Option<String>,
}

/// Process-wide handle to the answer provider, cheap to clone and share
#[derive(Clone)]
pub struct LLM {
    adapter: Arc<dyn LLMAdapter>,
    provider_name: String,
}

impl LLM {
    pub fn new(provider: LLMProviderConfig) -> AppResult<Self> {
        let adapter: Arc<dyn LLMAdapter> = match provider.name.as_str() {
            "anthropic" => {
                let adapter = match provider.base_url.as_deref() {
                    Some(base_url) => {
                        crate::llm::anthropic::AnthropicAdapter::with_base_url(&provider.api_key, base_url)
                    }
                    None => crate::llm::anthropic::AnthropicAdapter::new(&provider.api_key),
                };
                Arc::new(adapter)
            }
            other => {
                return Err(crate::types::AppError::Internal(format!(
                    "Unsupported provider: {}",
                    other
                )))
            }
        };

        Ok(Self {
            adapter,
            provider_name: provider.name,
        })
    }

    /// Wrap an already constructed adapter
    pub fn from_adapter(name: impl Into<String>, adapter: Arc<dyn LLMAdapter>) -> Self {
        Self {
            adapter,
            provider_name: name.into(),
        }
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.adapter.create_chat_completion(request).await
    }
}
