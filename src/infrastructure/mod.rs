//! Infrastructure layer - External service implementations

pub mod agent;
pub mod embedding;
pub mod http_client;
pub mod ingestion;
pub mod llm;
pub mod logging;
pub mod observability;
pub mod vector_store;
