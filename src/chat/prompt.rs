//! Prompt construction.

use crate::config::validation::QUESTION_PLACEHOLDER;
use crate::config::PromptConfig;
use crate::upstream::{ChatMessage, CompletionRequest};

/// Builds a fresh `CompletionRequest` for each question.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    config: PromptConfig,
}

impl PromptBuilder {
    pub fn new(config: PromptConfig) -> Self {
        Self { config }
    }

    /// Interpolate `question` into the template.
    pub fn render(&self, question: &str) -> String {
        self.config.template.replace(QUESTION_PLACEHOLDER, question)
    }

    pub fn build(&self, question: &str) -> CompletionRequest {
        CompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::user(self.render(question))],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            top_p: self.config.top_p,
            stop: self.config.stop.clone(),
        }
    }
}
