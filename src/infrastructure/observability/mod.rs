//! Observability infrastructure - Prometheus metrics

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::{
    create_metrics_router, init_metrics, record_http_request, record_ingestion, record_store_query,
    record_workflow_run, PrometheusMetrics,
};
