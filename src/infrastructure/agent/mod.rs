//! Agentic retrieval infrastructure - LLM-backed collaborators and the orchestrator

mod llm_classifier;
mod llm_generator;
mod llm_validator;
mod orchestrator;
mod prompts;

pub use llm_classifier::LlmDomainClassifier;
pub use llm_generator::{LlmAnswerGenerator, INSUFFICIENT_EVIDENCE_ANSWER};
pub use llm_validator::LlmRetrievalValidator;
pub use orchestrator::RagOrchestrator;
pub use prompts::LlmCallSettings;
