//! POST /v1/ingest

use axum::extract::State;

use crate::api::state::AppState;
use crate::api::types::{ApiError, IngestTextRequest, Json, ValidatedJson};
use crate::domain::ingestion::IngestionReport;

/// Classify, chunk and store raw text
pub async fn ingest_text(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<IngestTextRequest>,
) -> Result<Json<IngestionReport>, ApiError> {
    let source = request.source_name();
    let report = state.ingestion.ingest_text(&request.text, &source).await?;

    Ok(Json(report))
}
