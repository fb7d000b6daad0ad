//! Vector store trait and store slot identifiers

use std::collections::HashMap;
use std::fmt::{self, Debug, Display};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Document, ScoreOrientation};
use crate::domain::DomainError;

/// One of the two configured store slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StoreId {
    A,
    B,
}

impl StoreId {
    pub const ALL: [StoreId; 2] = [StoreId::A, StoreId::B];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }
}

impl Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chunks to write, aligned by position
#[derive(Debug, Clone, Default)]
pub struct UpsertBatch {
    pub ids: Vec<String>,
    pub chunks: Vec<String>,
    pub embeddings: Vec<Vec<f32>>,
    pub metadata: Vec<HashMap<String, String>>,
}

impl UpsertBatch {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// All columns must have the same length
    pub fn validate(&self) -> Result<(), DomainError> {
        let n = self.ids.len();

        if self.chunks.len() != n || self.embeddings.len() != n || self.metadata.len() != n {
            return Err(DomainError::validation(format!(
                "Upsert batch misaligned: {} ids, {} chunks, {} embeddings, {} metadata",
                n,
                self.chunks.len(),
                self.embeddings.len(),
                self.metadata.len()
            )));
        }

        Ok(())
    }
}

/// A similarity index over embedded chunks
#[async_trait]
pub trait VectorStore: Send + Sync + Debug {
    /// Slot this store serves
    fn store_id(&self) -> StoreId;

    /// Backend name for logs and metrics
    fn backend(&self) -> &'static str;

    fn score_orientation(&self) -> ScoreOrientation;

    /// Up to `top_k` nearest chunks; an empty result is not an error
    async fn query(&self, text: &str, top_k: u32) -> Result<Vec<Document>, DomainError>;

    /// Insert or replace chunks keyed by id; returns the number written
    async fn upsert(&self, batch: UpsertBatch) -> Result<usize, DomainError>;

    /// Remove every chunk whose `source` metadata equals `source`
    async fn delete_source(&self, source: &str) -> Result<(), DomainError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_id_display() {
        assert_eq!(StoreId::A.to_string(), "A");
        assert_eq!(StoreId::B.to_string(), "B");
    }

    #[test]
    fn test_upsert_batch_alignment() {
        let batch = UpsertBatch {
            ids: vec!["1".into(), "2".into()],
            chunks: vec!["a".into(), "b".into()],
            embeddings: vec![vec![0.1]],
            metadata: vec![HashMap::new(), HashMap::new()],
        };

        assert!(matches!(batch.validate(), Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_mock_store_scripted_batches() {
        let store = mock::MockVectorStore::new(StoreId::A)
            .with_batch(&[("one", Some("a.txt")), ("two", None)]);

        let first = store.query("q", 3).await.unwrap();
        let second = store.query("q", 3).await.unwrap();

        assert_eq!(first.len(), 2);
        assert!(second.is_empty());
        assert_eq!(store.queries().len(), 2);
    }
}
