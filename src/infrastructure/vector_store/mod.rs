//! Vector store adapters

mod chroma;
mod config;
mod in_memory;
mod payload;
mod qdrant;
mod registry;

pub use chroma::ChromaStore;
pub use config::{StoreBackendConfig, StoresConfig, DEFAULT_CHROMA_URL, DEFAULT_QDRANT_URL};
pub use in_memory::InMemoryVectorStore;
pub use qdrant::QdrantStore;
pub use registry::LazyStoreRegistry;

use crate::domain::embedding::EmbeddingProvider;
use crate::domain::DomainError;

/// Embed a single query text
pub(crate) async fn embed_query(
    embedder: &dyn EmbeddingProvider,
    text: &str,
) -> Result<Vec<f32>, DomainError> {
    embedder
        .embed(vec![text.to_string()])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            DomainError::provider(embedder.provider_name(), "No embedding returned for query")
        })
}
