//! LLM-backed domain classifier

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::prompts::{extract_json, render, LlmCallSettings, CLASSIFIER_PROMPT};
use crate::domain::agent::{Domain, DomainClassifier, WorkflowError, WorkflowStep};
use crate::domain::llm::{LlmProvider, LlmRequest};

/// Classifier that asks a chat model for `{"domain": ...}`
#[derive(Debug)]
pub struct LlmDomainClassifier {
    provider: Arc<dyn LlmProvider>,
    settings: LlmCallSettings,
}

#[derive(Debug, Deserialize)]
struct ClassifierOutput {
    domain: String,
}

impl LlmDomainClassifier {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: LlmCallSettings) -> Self {
        Self { provider, settings }
    }

    fn parse(content: &str) -> Result<Domain, WorkflowError> {
        let json = extract_json(content).unwrap_or(content);

        let output: ClassifierOutput = serde_json::from_str(json).map_err(|e| {
            warn!("Unparsable classifier output: {} - Response: {}", e, content);
            WorkflowError::classification(format!("unparsable model output: {}", e))
        })?;

        output.domain.parse::<Domain>().map_err(|e| {
            warn!("Classifier returned unknown label: {}", output.domain);
            WorkflowError::classification(e)
        })
    }
}

#[async_trait]
impl DomainClassifier for LlmDomainClassifier {
    async fn classify(&self, text: &str) -> Result<Domain, WorkflowError> {
        let request = LlmRequest::builder()
            .user(render(CLASSIFIER_PROMPT, &[("text", text)]))
            .temperature(self.settings.temperature)
            .max_tokens(self.settings.max_tokens)
            .json_output()
            .build();

        let response = self
            .provider
            .chat(&self.settings.model, request)
            .await
            .map_err(|e| WorkflowError::model(WorkflowStep::Classify, &e))?;

        let domain = Self::parse(response.content())?;
        debug!(domain = %domain, "Classifier verdict");

        Ok(domain)
    }
}
