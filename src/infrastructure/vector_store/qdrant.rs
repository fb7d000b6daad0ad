//! Qdrant REST store

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::embed_query;
use super::payload::{metadata_from_json, payload_for, TEXT_KEY};
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::vector_store::{
    Document, ScoreOrientation, StoreId, UpsertBatch, VectorStore, SOURCE_KEY,
};
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    score: f32,
    #[serde(default)]
    payload: Option<Map<String, Value>>,
}

/// Collection in a Qdrant instance; scores are cosine similarities
#[derive(Debug)]
pub struct QdrantStore<C: HttpClientTrait> {
    id: StoreId,
    client: C,
    base_url: String,
    collection: String,
    api_key: Option<String>,
    embedder: Arc<dyn EmbeddingProvider>,
    collection_ready: OnceCell<()>,
}

impl<C: HttpClientTrait> QdrantStore<C> {
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
            api_key: None,
            embedder,
            collection_ready: OnceCell::new(),
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.base_url, self.collection)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        self.api_key
            .as_deref()
            .map(|key| vec![("api-key", key)])
            .unwrap_or_default()
    }

    /// Create the collection with cosine distance if it does not exist yet
    async fn ensure_collection(&self) -> Result<(), DomainError> {
        self.collection_ready
            .get_or_try_init(|| async {
                let url = self.collection_url();
                match self.client.get_json(&url, self.headers()).await {
                    Ok(_) => Ok::<_, DomainError>(()),
                    Err(DomainError::NotFound { .. }) => {
                        let body = json!({
                            "vectors": {
                                "size": self.embedder.dimensions(),
                                "distance": "Cosine"
                            }
                        });
                        self.client.put_json(&url, self.headers(), &body).await?;
                        info!(
                            store = %self.id,
                            collection = %self.collection,
                            dimensions = self.embedder.dimensions(),
                            "Created Qdrant collection"
                        );
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            })
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl<C: HttpClientTrait> VectorStore for QdrantStore<C> {
    fn store_id(&self) -> StoreId {
        self.id
    }

    fn backend(&self) -> &'static str {
        "qdrant"
    }

    fn score_orientation(&self) -> ScoreOrientation {
        ScoreOrientation::HigherIsCloser
    }

    async fn query(&self, text: &str, top_k: u32) -> Result<Vec<Document>, DomainError> {
        self.ensure_collection().await?;
        let vector = embed_query(self.embedder.as_ref(), text).await?;

        let body = json!({
            "vector": vector,
            "limit": top_k,
            "with_payload": true
        });
        let url = format!("{}/points/search", self.collection_url());
        let response = self.client.post_json(&url, self.headers(), &body).await?;

        let parsed: SearchResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::storage(format!("Unexpected Qdrant search response: {}", e))
        })?;

        let documents: Vec<Document> = parsed
            .result
            .into_iter()
            .take(top_k as usize)
            .map(|point| {
                let text = point
                    .payload
                    .as_ref()
                    .and_then(|p| p.get(TEXT_KEY))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let metadata = metadata_from_json(point.payload.as_ref());
                Document::new(self.id, text, metadata, point.score)
            })
            .collect();

        debug!(store = %self.id, hits = documents.len(), "Qdrant search complete");
        Ok(documents)
    }

    async fn upsert(&self, batch: UpsertBatch) -> Result<usize, DomainError> {
        batch.validate()?;
        if batch.is_empty() {
            return Ok(0);
        }
        self.ensure_collection().await?;

        let points: Vec<Value> = batch
            .ids
            .iter()
            .zip(&batch.chunks)
            .zip(&batch.embeddings)
            .zip(&batch.metadata)
            .map(|(((id, chunk), vector), metadata)| {
                json!({
                    "id": id,
                    "vector": vector,
                    "payload": payload_for(chunk, metadata)
                })
            })
            .collect();

        let url = format!("{}/points?wait=true", self.collection_url());
        self.client
            .put_json(&url, self.headers(), &json!({ "points": points }))
            .await?;

        Ok(batch.len())
    }

    async fn delete_source(&self, source: &str) -> Result<(), DomainError> {
        self.ensure_collection().await?;

        let body = json!({
            "filter": {
                "must": [{ "key": SOURCE_KEY, "match": { "value": source } }]
            }
        });
        let url = format!("{}/points/delete?wait=true", self.collection_url());
        self.client.post_json(&url, self.headers(), &body).await?;

        debug!(store = %self.id, source = source, "Deleted Qdrant points for source");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::infrastructure::http_client::mock::MockHttpClient;
    use std::collections::HashMap;

    const COLLECTION_URL: &str = "http://qdrant:6333/collections/healthcare";
    const SEARCH_URL: &str = "http://qdrant:6333/collections/healthcare/points/search";
    const POINTS_URL: &str = "http://qdrant:6333/collections/healthcare/points?wait=true";
    const DELETE_URL: &str = "http://qdrant:6333/collections/healthcare/points/delete?wait=true";

    fn store(client: MockHttpClient) -> QdrantStore<MockHttpClient> {
        QdrantStore::new(
            StoreId::A,
            client,
            "http://qdrant:6333/",
            "healthcare",
            Arc::new(MockEmbeddingProvider::new(8)),
        )
    }

    fn search_response() -> Value {
        json!({
            "result": [
                {"id": "1", "score": 0.91, "payload": {"text": "Hypertension is high blood pressure", "source": "cardio.pdf", "chunk_index": 0}},
                {"id": "2", "score": 0.75, "payload": {"text": "ACE inhibitors lower blood pressure"}}
            ],
            "status": "ok"
        })
    }

    #[tokio::test]
    async fn test_query_maps_points_to_documents() {
        let client = MockHttpClient::new()
            .with_response(COLLECTION_URL, json!({"result": {}}))
            .with_response(SEARCH_URL, search_response());
        let store = store(client);

        let docs = store.query("blood pressure", 3).await.unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].text(), "Hypertension is high blood pressure");
        assert_eq!(docs[0].source(), "cardio.pdf");
        assert_eq!(docs[0].metadata()["chunk_index"], "0");
        assert_eq!(docs[1].source(), "unknown");
        assert_eq!(docs[0].store(), StoreId::A);

        let search = store.client.requests_to(SEARCH_URL);
        let body = search[0].body.as_ref().unwrap();
        assert_eq!(body["limit"], 3);
        assert_eq!(body["vector"].as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_query_truncates_to_top_k() {
        let client = MockHttpClient::new()
            .with_response(COLLECTION_URL, json!({"result": {}}))
            .with_response(SEARCH_URL, search_response());

        let docs = store(client).query("blood pressure", 1).await.unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_collection_is_created_once() {
        let client = MockHttpClient::new()
            .with_not_found(COLLECTION_URL)
            .with_response(COLLECTION_URL, json!({"result": true}))
            .with_response(SEARCH_URL, json!({"result": []}));
        let store = store(client);

        assert!(store.query("a", 3).await.unwrap().is_empty());
        assert!(store.query("b", 3).await.unwrap().is_empty());

        let calls = store.client.requests_to(COLLECTION_URL);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].method, "GET");
        assert_eq!(calls[1].method, "PUT");
        let body = calls[1].body.as_ref().unwrap();
        assert_eq!(body["vectors"]["size"], 8);
        assert_eq!(body["vectors"]["distance"], "Cosine");
    }

    #[tokio::test]
    async fn test_upsert_sends_points_with_payload() {
        let client = MockHttpClient::new()
            .with_response(COLLECTION_URL, json!({"result": {}}))
            .with_response(POINTS_URL, json!({"result": {"status": "completed"}}));
        let store = store(client);

        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), "notes.txt".to_string());
        let batch = UpsertBatch {
            ids: vec!["id-1".to_string()],
            chunks: vec!["chunk text".to_string()],
            embeddings: vec![vec![0.0; 8]],
            metadata: vec![metadata],
        };

        assert_eq!(store.upsert(batch).await.unwrap(), 1);

        let calls = store.client.requests_to(POINTS_URL);
        let point = &calls[0].body.as_ref().unwrap()["points"][0];
        assert_eq!(point["id"], "id-1");
        assert_eq!(point["payload"]["text"], "chunk text");
        assert_eq!(point["payload"]["source"], "notes.txt");
    }

    #[tokio::test]
    async fn test_delete_source_filters_on_source_payload() {
        let client = MockHttpClient::new()
            .with_response(COLLECTION_URL, json!({"result": {}}))
            .with_response(DELETE_URL, json!({"result": {"status": "completed"}}));
        let store = store(client);

        store.delete_source("cardio.pdf").await.unwrap();

        let calls = store.client.requests_to(DELETE_URL);
        assert_eq!(calls.len(), 1);
        let condition = &calls[0].body.as_ref().unwrap()["filter"]["must"][0];
        assert_eq!(condition["key"], "source");
        assert_eq!(condition["match"]["value"], "cardio.pdf");
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let client = MockHttpClient::new().with_error(COLLECTION_URL, "connection refused");

        let result = store(client).query("q", 3).await;
        assert!(matches!(result, Err(DomainError::Provider { .. })));
    }
}
