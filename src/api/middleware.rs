//! Request logging and HTTP metrics

use std::time::Instant;

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};
use tracing::info;

use crate::infrastructure::observability::record_http_request;

/// Log each request and record its latency.
///
/// Spans come from `TraceLayer`; this only emits events.
pub async fn request_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = matched_path(&request);
    let request_id = request_id(&request);

    info!(method = %method, path = %path, request_id = %request_id, "Incoming request");

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status().as_u16();
    record_http_request(method.as_str(), &path, status, duration);

    info!(
        method = %method,
        path = %path,
        status = status,
        duration_ms = duration.as_millis() as u64,
        request_id = %request_id,
        "Request completed"
    );

    response
}

// Route templates keep metric cardinality bounded
fn matched_path(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

fn request_id(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}
