//! Ingestion pipeline: read, classify, route, chunk, embed, upsert

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::chunkers::RecursiveChunker;
use super::reader::FileDocumentReader;
use crate::domain::agent::{DomainClassifier, StoreRouter};
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::ingestion::{ChunkingStrategy, IngestionConfig, IngestionError, IngestionReport};
use crate::domain::vector_store::{StoreId, StoreRegistry, UpsertBatch, SOURCE_KEY};
use crate::infrastructure::observability::record_ingestion;

/// Texts per embedding request
const EMBED_BATCH_SIZE: usize = 64;

/// Loads sources into the store their domain routes to
#[derive(Debug)]
pub struct IngestionPipeline {
    reader: FileDocumentReader,
    classifier: Arc<dyn DomainClassifier>,
    router: StoreRouter,
    stores: Arc<dyn StoreRegistry>,
    embedder: Arc<dyn EmbeddingProvider>,
    chunker: Arc<dyn ChunkingStrategy>,
    config: IngestionConfig,
}

impl IngestionPipeline {
    pub fn new(
        classifier: Arc<dyn DomainClassifier>,
        stores: Arc<dyn StoreRegistry>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            reader: FileDocumentReader::default(),
            classifier,
            router: StoreRouter::default(),
            stores,
            embedder,
            chunker: Arc::new(RecursiveChunker::new()),
            config: IngestionConfig::default(),
        }
    }

    pub fn with_router(mut self, router: StoreRouter) -> Self {
        self.router = router;
        self
    }

    pub fn with_config(mut self, config: IngestionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_reader(mut self, reader: FileDocumentReader) -> Self {
        self.reader = reader;
        self
    }

    pub fn config(&self) -> &IngestionConfig {
        &self.config
    }

    /// Ingest a file; the source name defaults to the file name
    pub async fn ingest_file(
        &self,
        path: &Path,
        source: Option<&str>,
    ) -> Result<IngestionReport, IngestionError> {
        let parsed = self.reader.read(path).await?;
        let source = source
            .map(str::to_string)
            .unwrap_or_else(|| parsed.metadata.source.clone());

        self.ingest_text(&parsed.content, &source).await
    }

    pub async fn ingest_text(
        &self,
        text: &str,
        source: &str,
    ) -> Result<IngestionReport, IngestionError> {
        let source = source.trim();
        if source.is_empty() {
            return Err(IngestionError::Validation("source must not be empty".to_string()));
        }
        if text.trim().is_empty() {
            return Err(IngestionError::Validation(format!("{} has no text content", source)));
        }

        let sample: String = text.chars().take(self.config.classify_sample_chars).collect();
        let domain = self
            .classifier
            .classify(&sample)
            .await
            .map_err(|e| IngestionError::Classification(e.to_string()))?;
        let store_id = self.router.route(domain);

        let chunks = self.chunker.chunk(text, &self.config.chunking())?;
        debug!(
            source = source,
            chunks = chunks.len(),
            chunker = self.chunker.name(),
            "Chunked source"
        );

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embed_all(&texts).await?;

        let batch = UpsertBatch {
            ids: chunks.iter().map(|c| chunk_id(source, c.index)).collect(),
            chunks: texts,
            embeddings,
            metadata: chunks
                .iter()
                .map(|c| {
                    HashMap::from([
                        (SOURCE_KEY.to_string(), source.to_string()),
                        ("domain".to_string(), domain.as_str().to_string()),
                        ("chunk_index".to_string(), c.index.to_string()),
                    ])
                })
                .collect(),
        };

        let store = self
            .stores
            .store(store_id)
            .await
            .map_err(|e| IngestionError::store(store_id, e))?;
        // A shorter re-ingest must not leave higher-index chunks behind
        store
            .delete_source(source)
            .await
            .map_err(|e| IngestionError::store(store_id, e))?;
        let written = store
            .upsert(batch)
            .await
            .map_err(|e| IngestionError::store(store_id, e))?;
        self.forget_elsewhere(source, store_id).await;

        record_ingestion(store_id.as_str(), written);
        info!(
            source = source,
            domain = %domain,
            store = %store_id,
            chunks = written,
            "Ingested source"
        );

        Ok(IngestionReport {
            source: source.to_string(),
            domain,
            store: store_id,
            chunks: written,
        })
    }

    /// Drop the source from the other slot in case an earlier ingest routed it there
    async fn forget_elsewhere(&self, source: &str, kept: StoreId) {
        for id in StoreId::ALL.into_iter().filter(|id| *id != kept) {
            let result = match self.stores.store(id).await {
                Ok(store) => store.delete_source(source).await,
                Err(e) => Err(e),
            };

            if let Err(e) = result {
                warn!(
                    source = source,
                    store = %id,
                    error = %e,
                    "Could not clear source from other store"
                );
            }
        }
    }

    async fn embed_all(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, IngestionError> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(EMBED_BATCH_SIZE) {
            let vectors = self
                .embedder
                .embed(batch.to_vec())
                .await
                .map_err(|e| IngestionError::Embedding(e.to_string()))?;

            if vectors.len() != batch.len() {
                return Err(IngestionError::Embedding(format!(
                    "expected {} vectors, got {}",
                    batch.len(),
                    vectors.len()
                )));
            }
            embeddings.extend(vectors);
        }

        Ok(embeddings)
    }
}

/// Stable id per source and position
fn chunk_id(source: &str, index: usize) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("{}#{}", source, index).as_bytes()).to_string()
}
