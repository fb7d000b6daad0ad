//! Shared handler state

use std::sync::Arc;

use crate::infrastructure::agent::RagOrchestrator;
use crate::infrastructure::ingestion::IngestionPipeline;

/// Process-wide services; each request runs its own workflow
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<RagOrchestrator>,
    pub ingestion: Arc<IngestionPipeline>,
}

impl AppState {
    pub fn new(orchestrator: Arc<RagOrchestrator>, ingestion: Arc<IngestionPipeline>) -> Self {
        Self {
            orchestrator,
            ingestion,
        }
    }
}
