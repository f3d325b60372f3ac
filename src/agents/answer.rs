//! Answer Agent
//!
//! Builds the prompt from the question and the extracted file text and makes
//! exactly one upstream call. Failures are returned as-is: no retry and no
//! partial answer.

use crate::agents::prompt::{Prompt, PromptTemplate};
use crate::llm::anthropic::models;
use crate::llm::provider::LLM;
use crate::types::{AppResult, LLMMessage, LLMRequest};
use tracing::{debug, info};

#[derive(Clone)]
pub struct AnswerAgent {
    llm: LLM,
    template: PromptTemplate,
}

impl AnswerAgent {
    pub fn new(llm: LLM, template: PromptTemplate) -> Self {
        Self { llm, template }
    }

    pub fn build_prompt(&self, question: &str, file_content: &str) -> Prompt {
        self.template.render(question, file_content)
    }

    pub async fn ask(&self, prompt: &Prompt) -> AppResult<String> {
        debug!(prompt = %prompt, "Sending prompt");

        let request = LLMRequest {
            model: models::DEFAULT.to_string(),
            messages: vec![LLMMessage::user(prompt.as_str())],
            max_tokens: models::MAX_TOKENS,
            thinking_budget: Some(models::THINKING_BUDGET),
        };

        let response = self.llm.create_chat_completion(&request).await?;
        info!(
            provider = self.llm.provider_name(),
            answer_len = response.content.len(),
            finish_reason = %response.finish_reason,
            output_tokens = response.usage.completion_tokens,
            "Answer generated"
        );

        Ok(response.content)
    }

    /// Build the prompt and ask it
    pub async fn answer(&self, question: &str, file_content: &str) -> AppResult<String> {
        let prompt = self.build_prompt(question, file_content);
        self.ask(&prompt).await
    }
}
