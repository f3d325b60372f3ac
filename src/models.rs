use std::sync::Arc;

use anyhow::Context;

use crate::agents::{AnswerAgent, PromptTemplate};
use crate::config::Config;
use crate::extract::ContentExtractor;
use crate::llm::provider::{LLMProviderConfig, LLM};

/// Shared, read-only state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub extractor: ContentExtractor,
    pub answerer: AnswerAgent,
}

impl AppState {
    pub fn new(config: Config, extractor: ContentExtractor, answerer: AnswerAgent) -> Self {
        Self {
            config: Arc::new(config),
            extractor,
            answerer,
        }
    }

    /// Build the provider client, prompt template and extractor from configuration
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let llm = LLM::new(LLMProviderConfig {
            name: "anthropic".to_string(),
            api_key: config.llm.anthropic_api_key.clone(),
            base_url: Some(config.llm.anthropic_base_url.clone()),
        })
        .context("Failed to initialise LLM provider")?;

        let template = match &config.prompt.template_path {
            Some(path) => PromptTemplate::from_file(path)?,
            None => PromptTemplate::default(),
        };

        let mut extractor = ContentExtractor::new(config.extraction.failure_policy());
        if let Some(dir) = &config.extraction.scratch_dir {
            extractor = extractor.with_scratch_root(dir.clone());
        }
        Ok(Self::new(config, extractor, AnswerAgent::new(llm, template)))
    }
}

// API Request/Response types

/// Successful response of the question endpoint
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub timestamp: String,
}
