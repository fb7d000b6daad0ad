//! LLM-backed retrieval validator

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::prompts::{extract_json, format_documents, render, LlmCallSettings, VALIDATOR_PROMPT};
use crate::domain::agent::{RetrievalValidator, RetrievalVerdict, WorkflowError, WorkflowStep};
use crate::domain::llm::{LlmProvider, LlmRequest};
use crate::domain::vector_store::Document;

/// Validator that asks a chat model whether the evidence suffices
#[derive(Debug)]
pub struct LlmRetrievalValidator {
    provider: Arc<dyn LlmProvider>,
    settings: LlmCallSettings,
}

#[derive(Debug, Deserialize)]
struct ValidatorOutput {
    needs_retrieval: Value,
    #[serde(default, alias = "refined_query")]
    new_query: Option<String>,
}

impl LlmRetrievalValidator {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: LlmCallSettings) -> Self {
        Self { provider, settings }
    }

    fn parse(content: &str) -> Result<RetrievalVerdict, WorkflowError> {
        let json = extract_json(content).unwrap_or(content);

        let output: ValidatorOutput = serde_json::from_str(json).map_err(|e| {
            warn!("Unparsable validator output: {} - Response: {}", e, content);
            WorkflowError::validation(format!("unparsable model output: {}", e))
        })?;

        let needs_retrieval = match &output.needs_retrieval {
            Value::Bool(b) => *b,
            Value::String(s) if s.trim().eq_ignore_ascii_case("true") => true,
            Value::String(s) if s.trim().eq_ignore_ascii_case("false") => false,
            other => {
                return Err(WorkflowError::validation(format!(
                    "needs_retrieval must be a boolean, got {}",
                    other
                )));
            }
        };

        if !needs_retrieval {
            return Ok(RetrievalVerdict::Sufficient);
        }

        match output.new_query.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => Ok(RetrievalVerdict::refine(query)),
            _ => Err(WorkflowError::validation(
                "needs_retrieval is true but no refined query was given",
            )),
        }
    }
}

#[async_trait]
impl RetrievalValidator for LlmRetrievalValidator {
    async fn validate(
        &self,
        query: &str,
        documents: &[Document],
    ) -> Result<RetrievalVerdict, WorkflowError> {
        let listing = format_documents(documents);
        let request = LlmRequest::builder()
            .user(render(VALIDATOR_PROMPT, &[("query", query), ("documents", &listing)]))
            .temperature(self.settings.temperature)
            .max_tokens(self.settings.max_tokens)
            .json_output()
            .build();

        let response = self
            .provider
            .chat(&self.settings.model, request)
            .await
            .map_err(|e| WorkflowError::model(WorkflowStep::Validate, &e))?;

        let verdict = Self::parse(response.content())?;
        debug!(
            needs_retrieval = verdict.needs_retrieval(),
            refined_query = verdict.refined_query().unwrap_or(""),
            "Validator verdict"
        );

        Ok(verdict)
    }
}
