//! Prompt templates and model-output helpers for the LLM-backed collaborators
//!
//! Templates use `${name}` placeholders.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Deserialize;

use crate::domain::vector_store::Document;

pub const CLASSIFIER_PROMPT: &str = r#"You route questions and documents to a knowledge base.
Decide which domain the text below belongs to.

Allowed domains:
- HEALTHCARE: medicine, clinical care, diseases, treatments, pharmacology, public health
- ENGINEERING: mechanical, civil, electrical or software engineering, materials, construction

Respond with a single JSON object and nothing else:
{"domain": "HEALTHCARE" | "ENGINEERING"}

Text:
${text}"#;

pub const VALIDATOR_PROMPT: &str = r#"You check whether retrieved documents contain enough information to answer a question.

Question:
${query}

Documents:
${documents}

If the documents are sufficient, set "needs_retrieval" to false and "new_query" to null.
If important information is missing, set "needs_retrieval" to true and write in "new_query" a search query that would retrieve the missing information.

Respond with a single JSON object and nothing else:
{"needs_retrieval": true | false, "new_query": string | null}"#;

pub const GENERATOR_PROMPT: &str = r#"Answer the question using only the context below.
If the context does not contain the answer, say that the available documents do not cover it.

Context:
${context}

Question:
${query}

Respond with a single JSON object and nothing else:
{"answer": string}"#;

/// Model settings shared by the three structured callables
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LlmCallSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmCallSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.0,
            max_tokens: 1024,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{(\w+)\}").unwrap());

/// Substitute `${key}` placeholders in one pass; substituted text is never rescanned
/// and unknown keys are left as written
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            vars.iter()
                .find(|(key, _)| *key == &caps[1])
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Numbered document listing for the validator
pub fn format_documents(documents: &[Document]) -> String {
    documents
        .iter()
        .enumerate()
        .map(|(i, d)| format!("[{}] {}", i + 1, d.text()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Document texts in accumulation order, separated by blank lines
pub fn build_context(documents: &[Document]) -> String {
    documents
        .iter()
        .map(Document::text)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Extract the outermost JSON object from model text (handles code fences and prose)
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;

    (start < end).then(|| &text[start..=end])
}
