//! POST /v1/ask

use axum::extract::State;
use tracing::{info, warn};

use crate::api::state::AppState;
use crate::api::types::{ApiError, AskRequest, AskResponse, Json, ValidatedJson};

/// Run the retrieval workflow for one question
pub async fn ask(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let result = state.orchestrator.run(&request.query).await;

    match result {
        Ok(workflow) => {
            let response = AskResponse::from_state(&workflow);
            info!(
                rounds = response.rounds.len(),
                sources = response.sources.len(),
                cap_reached = response.cap_reached,
                "Answered query"
            );
            Ok(Json(response))
        }
        Err(e) => {
            warn!(error = %e, kind = e.kind(), "Workflow aborted");
            Err(e.into())
        }
    }
}
