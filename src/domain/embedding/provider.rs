//! Embedding provider trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::DomainError;

/// Maps texts to vectors of a fixed dimensionality per deployment
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Embed every text, preserving input order
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Vector length produced by this provider
    fn dimensions(&self) -> usize;
}
