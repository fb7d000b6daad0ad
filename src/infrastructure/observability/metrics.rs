//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use super::config::MetricsConfig;

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the /metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Install the Prometheus recorder; `None` when disabled or already installed
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("agentic_rag_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record a finished workflow execution
pub fn record_workflow_run(outcome: &'static str, rounds: usize, duration: Duration) {
    let labels = [("outcome", outcome)];

    counter!("rag_workflow_runs_total", &labels).increment(1);
    histogram!("rag_workflow_duration_seconds", &labels).record(duration.as_secs_f64());
    histogram!("rag_retrieval_rounds").record(rounds as f64);
}

/// Record one store query
pub fn record_store_query(
    store: &'static str,
    backend: &'static str,
    success: bool,
    documents: usize,
) {
    let labels = [
        ("store", store),
        ("backend", backend),
        ("status", if success { "success" } else { "error" }),
    ];

    counter!("rag_store_queries_total", &labels).increment(1);

    if success {
        let store_labels = [("store", store), ("backend", backend)];
        histogram!("rag_store_documents_returned", &store_labels).record(documents as f64);
    }
}

/// Record one HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Record chunks written by ingestion
pub fn record_ingestion(store: &'static str, chunks: usize) {
    counter!("rag_ingested_chunks_total", "store" => store).increment(chunks as u64);
}
