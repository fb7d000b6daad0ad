//! Agentic RAG orchestrator
//!
//! Answers a question by classifying its domain, retrieving from the store
//! that domain routes to, letting a validator ask for refined retrieval up to
//! a fixed cap, and generating an answer that cites its sources.
//! The same classifier and router decide where ingested documents land.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::AppState;
use domain::embedding::EmbeddingProvider;
use domain::llm::LlmProvider;
use domain::DomainError;
use infrastructure::{
    agent::{
        LlmAnswerGenerator, LlmCallSettings, LlmDomainClassifier, LlmRetrievalValidator,
        RagOrchestrator,
    },
    embedding::OpenAiEmbeddingProvider,
    http_client::HttpClient,
    ingestion::IngestionPipeline,
    llm::{OpenAiProvider, GROQ_BASE_URL},
    vector_store::LazyStoreRegistry,
};
use tracing::info;

/// Wire the orchestrator and ingestion pipeline from configuration
///
/// Store clients are built lazily on first use, so this makes no network calls.
pub fn create_app_state(config: &AppConfig) -> Result<AppState, DomainError> {
    config.validate()?;

    let http = HttpClient::with_timeout(Duration::from_secs(config.llm.timeout_secs))?;
    let llm = create_llm_provider(config, http.clone())?;
    let embedder = create_embedding_provider(config, http.clone());

    let settings = LlmCallSettings::new(&config.llm.model)
        .with_temperature(config.llm.temperature)
        .with_max_tokens(config.llm.max_tokens);

    let classifier = Arc::new(LlmDomainClassifier::new(llm.clone(), settings.clone()));
    let validator = Arc::new(LlmRetrievalValidator::new(llm.clone(), settings.clone()));
    let generator = Arc::new(LlmAnswerGenerator::new(llm, settings));
    let stores = Arc::new(LazyStoreRegistry::new(
        config.stores.clone(),
        embedder.clone(),
        http,
    ));

    let orchestrator =
        RagOrchestrator::new(classifier.clone(), validator, generator, stores.clone())
            .with_config(config.workflow.clone());
    let ingestion =
        IngestionPipeline::new(classifier, stores, embedder).with_config(config.ingestion.clone());

    info!(
        model = %config.llm.model,
        store_a = config.stores.a.backend_name(),
        store_b = config.stores.b.backend_name(),
        max_iterations = config.workflow.max_iterations,
        "Application services initialized"
    );

    Ok(AppState::new(Arc::new(orchestrator), Arc::new(ingestion)))
}

fn create_llm_provider(
    config: &AppConfig,
    http: HttpClient,
) -> Result<Arc<dyn LlmProvider>, DomainError> {
    let api_key = config.llm_api_key()?;

    let provider = if config.llm.base_url.trim_end_matches('/') == GROQ_BASE_URL {
        OpenAiProvider::groq(http, api_key)
    } else {
        OpenAiProvider::with_base_url(http, api_key, &config.llm.base_url)
    };

    Ok(Arc::new(provider))
}

fn create_embedding_provider(config: &AppConfig, http: HttpClient) -> Arc<dyn EmbeddingProvider> {
    let provider = OpenAiEmbeddingProvider::new(
        http,
        &config.embedding.base_url,
        &config.embedding.model,
        config.embedding.dimensions,
    );

    match config.embedding.api_key.as_deref() {
        Some(key) if !key.trim().is_empty() => Arc::new(provider.with_api_key(key)),
        _ => Arc::new(provider),
    }
}
