//! Lookup of the store serving a slot

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use super::{StoreId, VectorStore};
use crate::domain::DomainError;

/// Resolves a slot to its store client
#[async_trait]
pub trait StoreRegistry: Send + Sync + Debug {
    async fn store(&self, id: StoreId) -> Result<Arc<dyn VectorStore>, DomainError>;
}

/// Registry over two already-built stores
#[derive(Debug, Clone)]
pub struct StaticStoreRegistry {
    a: Arc<dyn VectorStore>,
    b: Arc<dyn VectorStore>,
}

impl StaticStoreRegistry {
    pub fn new(a: Arc<dyn VectorStore>, b: Arc<dyn VectorStore>) -> Self {
        Self { a, b }
    }
}

#[async_trait]
impl StoreRegistry for StaticStoreRegistry {
    async fn store(&self, id: StoreId) -> Result<Arc<dyn VectorStore>, DomainError> {
        Ok(match id {
            StoreId::A => Arc::clone(&self.a),
            StoreId::B => Arc::clone(&self.b),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vector_store::MockVectorStore;

    #[tokio::test]
    async fn test_static_registry_resolves_slots() {
        let registry = StaticStoreRegistry::new(
            Arc::new(MockVectorStore::new(StoreId::A)),
            Arc::new(MockVectorStore::new(StoreId::B)),
        );

        assert_eq!(registry.store(StoreId::A).await.unwrap().store_id(), StoreId::A);
        assert_eq!(registry.store(StoreId::B).await.unwrap().store_id(), StoreId::B);
    }
}
