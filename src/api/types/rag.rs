//! Request and response bodies for the question and ingestion endpoints

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::agent::{Domain, RetrievalRound, WorkflowState};
use crate::domain::vector_store::Document;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AskRequest {
    #[validate(length(min = 1, max = 8000, message = "must be between 1 and 8000 characters"))]
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub text: String,
    pub source: String,
    pub store: String,
    pub score: f32,
}

impl From<&Document> for RetrievedDocument {
    fn from(document: &Document) -> Self {
        Self {
            text: document.text().to_string(),
            source: document.source().to_string(),
            store: document.store().to_string(),
            score: document.score(),
        }
    }
}

/// Final answer plus the audit trail of the retrieval loop
#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub sources: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,
    pub refinements: u32,
    pub cap_reached: bool,
    pub rounds: Vec<RetrievalRound>,
    /// Evidence the answer was generated from
    pub documents: Vec<RetrievedDocument>,
}

impl AskResponse {
    pub fn from_state(state: &WorkflowState) -> Self {
        let (answer, sources) = match state.completion() {
            Some(completion) => (completion.answer.clone(), completion.sources.clone()),
            None => (String::new(), BTreeSet::new()),
        };

        Self {
            answer,
            sources,
            domain: state.domain(),
            refinements: state.refinements(),
            cap_reached: state.cap_reached(),
            rounds: state.rounds().to_vec(),
            documents: state.documents().iter().map(RetrievedDocument::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct IngestTextRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub text: String,
    #[validate(length(min = 1, max = 512, message = "must be between 1 and 512 characters"))]
    pub source: Option<String>,
}

impl IngestTextRequest {
    /// Caller-provided source, or a stable name derived from the text
    pub fn source_name(&self) -> String {
        match &self.source {
            Some(source) => source.clone(),
            None => {
                let digest = Uuid::new_v5(&Uuid::NAMESPACE_OID, self.text.as_bytes()).simple();
                format!("text-{}", &digest.to_string()[..12])
            }
        }
    }
}
