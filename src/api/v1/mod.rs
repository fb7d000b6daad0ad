//! Versioned question and ingestion endpoints

pub mod ask;
pub mod ingest;

use axum::{routing::post, Router};

use super::state::AppState;

pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/ask", post(ask::ask))
        .route("/ingest", post(ingest::ingest_text))
}
