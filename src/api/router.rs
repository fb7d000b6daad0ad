use axum::{middleware, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::health;
use super::middleware::request_middleware;
use super::state::AppState;
use super::v1;

/// Build the HTTP surface: health, `/v1` endpoints, request logging and CORS
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/v1", v1::create_v1_router())
        .with_state(state)
        .layer(middleware::from_fn(request_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
