//! In-memory cosine-similarity store for development and tests

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::embed_query;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::vector_store::{
    Document, ScoreOrientation, StoreId, UpsertBatch, VectorStore, SOURCE_KEY,
};
use crate::domain::DomainError;

#[derive(Debug, Clone)]
struct StoredChunk {
    id: String,
    text: String,
    embedding: Vec<f32>,
    metadata: HashMap<String, String>,
}

#[derive(Debug)]
pub struct InMemoryVectorStore {
    id: StoreId,
    embedder: Arc<dyn EmbeddingProvider>,
    chunks: RwLock<Vec<StoredChunk>>,
}

impl InMemoryVectorStore {
    pub fn new(id: StoreId, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            id,
            embedder,
            chunks: RwLock::new(Vec::new()),
        }
    }

    pub async fn chunk_count(&self) -> usize {
        self.chunks.read().await.len()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn store_id(&self) -> StoreId {
        self.id
    }

    fn backend(&self) -> &'static str {
        "in_memory"
    }

    fn score_orientation(&self) -> ScoreOrientation {
        ScoreOrientation::HigherIsCloser
    }

    async fn query(&self, text: &str, top_k: u32) -> Result<Vec<Document>, DomainError> {
        let chunks = self.chunks.read().await;
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        let vector = embed_query(self.embedder.as_ref(), text).await?;

        let mut scored: Vec<(f32, &StoredChunk)> = chunks
            .iter()
            .map(|chunk| (cosine_similarity(&vector, &chunk.embedding), chunk))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(top_k as usize)
            .map(|(score, chunk)| {
                Document::new(self.id, chunk.text.clone(), chunk.metadata.clone(), score)
            })
            .collect())
    }

    async fn upsert(&self, batch: UpsertBatch) -> Result<usize, DomainError> {
        batch.validate()?;
        let written = batch.len();
        let mut chunks = self.chunks.write().await;

        let incoming = batch
            .ids
            .into_iter()
            .zip(batch.chunks)
            .zip(batch.embeddings)
            .zip(batch.metadata);

        for (((id, text), embedding), metadata) in incoming {
            let chunk = StoredChunk {
                id,
                text,
                embedding,
                metadata,
            };
            match chunks.iter_mut().find(|c| c.id == chunk.id) {
                Some(existing) => *existing = chunk,
                None => chunks.push(chunk),
            }
        }

        Ok(written)
    }

    async fn delete_source(&self, source: &str) -> Result<(), DomainError> {
        self.chunks
            .write()
            .await
            .retain(|c| c.metadata.get(SOURCE_KEY).map(String::as_str) != Some(source));
        Ok(())
    }
}
