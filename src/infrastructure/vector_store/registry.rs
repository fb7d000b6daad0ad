//! Process-wide registry building each slot's store on first use

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::info;

use super::{ChromaStore, InMemoryVectorStore, QdrantStore, StoreBackendConfig, StoresConfig};
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::vector_store::{StoreId, StoreRegistry, VectorStore};
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClient;

/// Lazily connected store clients, shared across concurrent workflows
#[derive(Debug)]
pub struct LazyStoreRegistry {
    config: StoresConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    http: HttpClient,
    a: OnceCell<Arc<dyn VectorStore>>,
    b: OnceCell<Arc<dyn VectorStore>>,
}

impl LazyStoreRegistry {
    pub fn new(
        config: StoresConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        http: HttpClient,
    ) -> Self {
        Self {
            config,
            embedder,
            http,
            a: OnceCell::new(),
            b: OnceCell::new(),
        }
    }

    fn slot(&self, id: StoreId) -> &OnceCell<Arc<dyn VectorStore>> {
        match id {
            StoreId::A => &self.a,
            StoreId::B => &self.b,
        }
    }

    fn build(&self, id: StoreId) -> Result<Arc<dyn VectorStore>, DomainError> {
        let backend = self.config.for_slot(id);
        let embedder = Arc::clone(&self.embedder);

        let store: Arc<dyn VectorStore> = match backend {
            StoreBackendConfig::Qdrant {
                url,
                collection,
                api_key,
            } => {
                require_non_empty(id, "url", url)?;
                require_non_empty(id, "collection", collection)?;
                Arc::new(
                    QdrantStore::new(id, self.http.clone(), url, collection, embedder)
                        .with_api_key(api_key.clone()),
                )
            }
            StoreBackendConfig::Chroma {
                url,
                collection,
                token,
            } => {
                require_non_empty(id, "url", url)?;
                require_non_empty(id, "collection", collection)?;
                Arc::new(
                    ChromaStore::new(id, self.http.clone(), url, collection, embedder)
                        .with_token(token.clone()),
                )
            }
            StoreBackendConfig::InMemory => Arc::new(InMemoryVectorStore::new(id, embedder)),
        };

        info!(store = %id, backend = backend.backend_name(), "Initialized vector store client");
        Ok(store)
    }
}

fn require_non_empty(id: StoreId, field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::configuration(format!(
            "Store {} has an empty '{}'",
            id, field
        )));
    }
    Ok(())
}

#[async_trait]
impl StoreRegistry for LazyStoreRegistry {
    async fn store(&self, id: StoreId) -> Result<Arc<dyn VectorStore>, DomainError> {
        self.slot(id)
            .get_or_try_init(|| async { self.build(id) })
            .await
            .map(Arc::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;

    fn registry(config: StoresConfig) -> LazyStoreRegistry {
        LazyStoreRegistry::new(config, Arc::new(MockEmbeddingProvider::new(8)), HttpClient::new())
    }

    #[tokio::test]
    async fn test_store_is_built_once_per_slot() {
        let registry = registry(StoresConfig {
            a: StoreBackendConfig::InMemory,
            b: StoreBackendConfig::InMemory,
        });

        let first = registry.store(StoreId::A).await.unwrap();
        let second = registry.store(StoreId::A).await.unwrap();
        let other = registry.store(StoreId::B).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(other.store_id(), StoreId::B);
    }

    #[tokio::test]
    async fn test_backends_follow_config() {
        let registry = registry(StoresConfig {
            a: StoreBackendConfig::qdrant("http://localhost:6333", "healthcare"),
            b: StoreBackendConfig::chroma("http://localhost:8000", "engineering"),
        });

        assert_eq!(registry.store(StoreId::A).await.unwrap().backend(), "qdrant");
        assert_eq!(registry.store(StoreId::B).await.unwrap().backend(), "chroma");
    }

    #[tokio::test]
    async fn test_empty_url_is_configuration_error() {
        let registry = registry(StoresConfig {
            a: StoreBackendConfig::qdrant("", "healthcare"),
            b: StoreBackendConfig::InMemory,
        });

        let result = registry.store(StoreId::A).await;
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}
