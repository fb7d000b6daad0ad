//! Chroma REST (v1) store

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::embed_query;
use super::payload::metadata_from_json;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::vector_store::{
    Document, ScoreOrientation, StoreId, UpsertBatch, VectorStore, SOURCE_KEY,
};
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

#[derive(Debug, Deserialize)]
struct CollectionResponse {
    id: String,
}

/// Chroma answers one list per query embedding
#[derive(Debug, Default, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    documents: Vec<Vec<Option<String>>>,
    #[serde(default)]
    metadatas: Vec<Vec<Option<Map<String, Value>>>>,
    #[serde(default)]
    distances: Vec<Vec<f32>>,
}

/// Collection in a Chroma server; scores are distances
#[derive(Debug)]
pub struct ChromaStore<C: HttpClientTrait> {
    id: StoreId,
    client: C,
    base_url: String,
    collection: String,
    token: Option<String>,
    embedder: Arc<dyn EmbeddingProvider>,
    collection_id: OnceCell<String>,
}

impl<C: HttpClientTrait> ChromaStore<C> {
    pub fn new(
        id: StoreId,
        client: C,
        base_url: impl Into<String>,
        collection: impl Into<String>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            id,
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            collection: collection.into(),
            token: None,
            embedder,
            collection_id: OnceCell::new(),
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        self.token
            .as_deref()
            .map(|token| vec![("x-chroma-token", token)])
            .unwrap_or_default()
    }

    /// Get-or-create the collection and cache its id
    async fn collection_id(&self) -> Result<&str, DomainError> {
        self.collection_id
            .get_or_try_init(|| async {
                let url = format!("{}/api/v1/collections", self.base_url);
                let body = json!({ "name": self.collection, "get_or_create": true });
                let response = self.client.post_json(&url, self.headers(), &body).await?;

                let parsed: CollectionResponse = serde_json::from_value(response).map_err(|e| {
                    DomainError::storage(format!("Unexpected Chroma collection response: {}", e))
                })?;
                info!(
                    store = %self.id,
                    collection = %self.collection,
                    id = %parsed.id,
                    "Resolved Chroma collection"
                );

                Ok::<_, DomainError>(parsed.id)
            })
            .await
            .map(String::as_str)
    }
}

#[async_trait]
impl<C: HttpClientTrait> VectorStore for ChromaStore<C> {
    fn store_id(&self) -> StoreId {
        self.id
    }

    fn backend(&self) -> &'static str {
        "chroma"
    }

    fn score_orientation(&self) -> ScoreOrientation {
        ScoreOrientation::LowerIsCloser
    }

    async fn query(&self, text: &str, top_k: u32) -> Result<Vec<Document>, DomainError> {
        let collection_id = self.collection_id().await?;
        let vector = embed_query(self.embedder.as_ref(), text).await?;

        let url = format!("{}/api/v1/collections/{}/query", self.base_url, collection_id);
        let body = json!({
            "query_embeddings": [vector],
            "n_results": top_k,
            "include": ["documents", "metadatas", "distances"]
        });
        let response = self.client.post_json(&url, self.headers(), &body).await?;

        let parsed: QueryResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::storage(format!("Unexpected Chroma query response: {}", e))
        })?;

        let texts = parsed.documents.into_iter().next().unwrap_or_default();
        let metadatas = parsed.metadatas.into_iter().next().unwrap_or_default();
        let distances = parsed.distances.into_iter().next().unwrap_or_default();

        let documents: Vec<Document> = texts
            .into_iter()
            .enumerate()
            .take(top_k as usize)
            .map(|(i, text)| {
                let metadata = metadata_from_json(metadatas.get(i).and_then(Option::as_ref));
                let distance = distances.get(i).copied().unwrap_or(f32::MAX);
                Document::new(self.id, text.unwrap_or_default(), metadata, distance)
            })
            .collect();

        debug!(store = %self.id, hits = documents.len(), "Chroma query complete");
        Ok(documents)
    }

    async fn upsert(&self, batch: UpsertBatch) -> Result<usize, DomainError> {
        batch.validate()?;
        if batch.is_empty() {
            return Ok(0);
        }

        let collection_id = self.collection_id().await?;
        let url = format!("{}/api/v1/collections/{}/upsert", self.base_url, collection_id);
        let body = json!({
            "ids": batch.ids,
            "embeddings": batch.embeddings,
            "documents": batch.chunks,
            "metadatas": batch.metadata,
        });
        self.client.post_json(&url, self.headers(), &body).await?;

        Ok(batch.len())
    }

    async fn delete_source(&self, source: &str) -> Result<(), DomainError> {
        let collection_id = self.collection_id().await?;
        let url = format!("{}/api/v1/collections/{}/delete", self.base_url, collection_id);
        let body = json!({ "where": { SOURCE_KEY: source } });
        self.client.post_json(&url, self.headers(), &body).await?;

        debug!(store = %self.id, source = source, "Deleted Chroma records for source");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::infrastructure::http_client::mock::MockHttpClient;
    use std::collections::HashMap;

    const COLLECTIONS_URL: &str = "http://chroma:8000/api/v1/collections";
    const QUERY_URL: &str = "http://chroma:8000/api/v1/collections/c-123/query";
    const UPSERT_URL: &str = "http://chroma:8000/api/v1/collections/c-123/upsert";
    const DELETE_URL: &str = "http://chroma:8000/api/v1/collections/c-123/delete";

    fn store(client: MockHttpClient) -> ChromaStore<MockHttpClient> {
        ChromaStore::new(
            StoreId::B,
            client,
            "http://chroma:8000",
            "engineering",
            Arc::new(MockEmbeddingProvider::new(4)),
        )
    }

    fn client() -> MockHttpClient {
        MockHttpClient::new().with_response(
            COLLECTIONS_URL,
            json!({"id": "c-123", "name": "engineering"}),
        )
    }

    #[tokio::test]
    async fn test_query_zips_parallel_lists() {
        let client = client().with_response(
            QUERY_URL,
            json!({
                "ids": [["x", "y"]],
                "documents": [["Steel beams carry load", "Concrete cures slowly"]],
                "metadatas": [[{"source": "structures.pdf"}, null]],
                "distances": [[0.12, 0.4]]
            }),
        );
        let store = store(client);

        let docs = store.query("beam load", 3).await.unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].text(), "Steel beams carry load");
        assert_eq!(docs[0].source(), "structures.pdf");
        assert_eq!(docs[0].score(), 0.12);
        assert_eq!(docs[1].source(), "unknown");
        assert_eq!(store.score_orientation(), ScoreOrientation::LowerIsCloser);

        let body = store.client.requests_to(QUERY_URL)[0].body.clone().unwrap();
        assert_eq!(body["n_results"], 3);
    }

    #[tokio::test]
    async fn test_empty_collection_returns_no_documents() {
        let client = client().with_response(
            QUERY_URL,
            json!({"ids": [[]], "documents": [[]], "metadatas": [[]], "distances": [[]]}),
        );

        assert!(store(client).query("anything", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_collection_id_resolved_once() {
        let client = client()
            .with_response(QUERY_URL, json!({"documents": [[]]}))
            .with_response(UPSERT_URL, json!(true));
        let store = store(client);

        store.query("a", 3).await.unwrap();
        let batch = UpsertBatch {
            ids: vec!["1".to_string()],
            chunks: vec!["text".to_string()],
            embeddings: vec![vec![0.1; 4]],
            metadata: vec![HashMap::new()],
        };
        assert_eq!(store.upsert(batch).await.unwrap(), 1);

        assert_eq!(store.client.requests_to(COLLECTIONS_URL).len(), 1);
        let upsert = store.client.requests_to(UPSERT_URL)[0].body.clone().unwrap();
        assert_eq!(upsert["documents"][0], "text");
    }

    #[tokio::test]
    async fn test_delete_source_uses_where_filter() {
        let client = client().with_response(DELETE_URL, json!(["id-1", "id-2"]));
        let store = store(client);

        store.delete_source("structures.pdf").await.unwrap();

        let body = store.client.requests_to(DELETE_URL)[0].body.clone().unwrap();
        assert_eq!(body, json!({"where": {"source": "structures.pdf"}}));
    }
}
