//! LLM-backed answer generator

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use super::prompts::{build_context, extract_json, render, LlmCallSettings, GENERATOR_PROMPT};
use crate::domain::agent::{AnswerGenerator, WorkflowError, WorkflowStep};
use crate::domain::llm::{LlmProvider, LlmRequest};
use crate::domain::vector_store::Document;

/// Answer returned when no document was retrieved
pub const INSUFFICIENT_EVIDENCE_ANSWER: &str =
    "Insufficient evidence: no relevant documents were found in the knowledge base to answer this question.";

/// Generator that asks a chat model for `{"answer": ...}` over the accumulated context
#[derive(Debug)]
pub struct LlmAnswerGenerator {
    provider: Arc<dyn LlmProvider>,
    settings: LlmCallSettings,
}

#[derive(Debug, Deserialize)]
struct GeneratorOutput {
    answer: String,
}

impl LlmAnswerGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: LlmCallSettings) -> Self {
        Self { provider, settings }
    }

    fn parse(content: &str) -> Result<String, WorkflowError> {
        let json = extract_json(content).unwrap_or(content);

        let output: GeneratorOutput = serde_json::from_str(json).map_err(|e| {
            warn!("Unparsable generator output: {} - Response: {}", e, content);
            WorkflowError::generation(format!("unparsable model output: {}", e))
        })?;

        let answer = output.answer.trim();
        if answer.is_empty() {
            return Err(WorkflowError::generation("model returned an empty answer"));
        }

        Ok(answer.to_string())
    }
}

#[async_trait]
impl AnswerGenerator for LlmAnswerGenerator {
    async fn generate(&self, query: &str, documents: &[Document]) -> Result<String, WorkflowError> {
        if documents.is_empty() {
            info!("No evidence retrieved, answering without a model call");
            return Ok(INSUFFICIENT_EVIDENCE_ANSWER.to_string());
        }

        let context = build_context(documents);
        let request = LlmRequest::builder()
            .user(render(GENERATOR_PROMPT, &[("context", &context), ("query", query)]))
            .temperature(self.settings.temperature)
            .max_tokens(self.settings.max_tokens)
            .json_output()
            .build();

        let response = self
            .provider
            .chat(&self.settings.model, request)
            .await
            .map_err(|e| WorkflowError::model(WorkflowStep::Generate, &e))?;

        Self::parse(response.content())
    }
}
