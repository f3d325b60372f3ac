use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::extract::FailurePolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LLMConfig,
    pub extraction: ExtractionConfig,
    pub prompt: PromptConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// `["*"]` allows any origin
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

#[derive(Clone, Deserialize)]
pub struct LLMConfig {
    pub anthropic_api_key: String,
    pub anthropic_base_url: String,
}

// Keeps the key out of startup logs
impl std::fmt::Debug for LLMConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLMConfig")
            .field("anthropic_api_key", &"<redacted>")
            .field("anthropic_base_url", &self.anthropic_base_url)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    pub strict: bool,
    /// Parent directory for per-request scratch space, system temp when unset
    pub scratch_dir: Option<PathBuf>,
}

impl ExtractionConfig {
    pub fn failure_policy(&self) -> FailurePolicy {
        if self.strict {
            FailurePolicy::Propagate
        } else {
            FailurePolicy::Isolate
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptConfig {
    pub template_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let anthropic_api_key = env::var("ANTHROPIC_API_KEY").unwrap_or_default();
        if anthropic_api_key.trim().is_empty() {
            bail!("ANTHROPIC_API_KEY must be set");
        }

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .context("PORT must be a valid port number")?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "*".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                    .unwrap_or_else(|_| (50 * 1024 * 1024).to_string())
                    .parse()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
            },
            llm: LLMConfig {
                anthropic_api_key,
                anthropic_base_url: env::var("ANTHROPIC_BASE_URL")
                    .unwrap_or_else(|_| crate::llm::anthropic::DEFAULT_BASE_URL.to_string()),
            },
            extraction: ExtractionConfig {
                strict: env::var("STRICT_EXTRACTION")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse()
                    .context("STRICT_EXTRACTION must be true or false")?,
                scratch_dir: env::var("SCRATCH_DIR").ok().map(PathBuf::from),
            },
            prompt: PromptConfig {
                template_path: env::var("PROMPT_TEMPLATE_PATH").ok().map(PathBuf::from),
            },
        })
    }

    pub fn allows_any_origin(&self) -> bool {
        self.server.cors_allowed_origins.is_empty()
            || self.server.cors_allowed_origins.iter().any(|o| o == "*")
    }
}
