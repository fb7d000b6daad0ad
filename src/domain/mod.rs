//! Domain layer - Core business logic and entities

pub mod agent;
pub mod embedding;
pub mod error;
pub mod ingestion;
pub mod llm;
pub mod vector_store;

pub use error::DomainError;
pub use llm::{
    FinishReason, LlmProvider, LlmRequest, LlmRequestBuilder, LlmResponse, Message, MessageRole,
    Usage,
};
