//! Orchestrator - drives a `WorkflowState` from CLASSIFY to DONE

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use futures::TryFutureExt;
use tracing::{debug, error, info, warn};

use crate::domain::agent::{
    AnswerGenerator, DomainClassifier, Phase, RetrievalValidator, StoreRouter, WorkflowConfig,
    WorkflowError, WorkflowState, WorkflowStep,
};
use crate::domain::vector_store::{StoreId, StoreRegistry};
use crate::infrastructure::observability::{record_store_query, record_workflow_run};

/// Sequential state machine over the classifier, router, stores, validator and generator
///
/// Holds no per-query state, so one instance serves concurrent queries.
#[derive(Debug, Clone)]
pub struct RagOrchestrator {
    classifier: Arc<dyn DomainClassifier>,
    validator: Arc<dyn RetrievalValidator>,
    generator: Arc<dyn AnswerGenerator>,
    stores: Arc<dyn StoreRegistry>,
    router: StoreRouter,
    config: WorkflowConfig,
}

impl RagOrchestrator {
    pub fn new(
        classifier: Arc<dyn DomainClassifier>,
        validator: Arc<dyn RetrievalValidator>,
        generator: Arc<dyn AnswerGenerator>,
        stores: Arc<dyn StoreRegistry>,
    ) -> Self {
        Self {
            classifier,
            validator,
            generator,
            stores,
            router: StoreRouter::default(),
            config: WorkflowConfig::default(),
        }
    }

    pub fn with_config(mut self, config: WorkflowConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_router(mut self, router: StoreRouter) -> Self {
        self.router = router;
        self
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Answer one query; any failed step aborts with no partial answer
    pub async fn run(&self, query: &str) -> Result<WorkflowState, WorkflowError> {
        let query = query.trim();

        if query.is_empty() {
            return Err(WorkflowError::invalid_query("query must not be empty"));
        }

        let start = Instant::now();
        info!(query = query, max_iterations = self.config.max_iterations, "Starting workflow");

        let mut state = WorkflowState::new(query);
        let result = loop {
            if state.is_terminal() {
                break Ok(state);
            }

            match self.step(state).await {
                Ok(next) => state = next,
                Err(e) => break Err(e),
            }
        };

        match &result {
            Ok(state) => {
                info!(
                    rounds = state.rounds().len(),
                    documents = state.documents().len(),
                    cap_reached = state.cap_reached(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Workflow completed"
                );
                record_workflow_run("success", state.rounds().len(), start.elapsed());
            }
            Err(e) => {
                error!(error = %e, "Workflow aborted");
                record_workflow_run(e.kind(), 0, start.elapsed());
            }
        }

        result
    }

    /// Apply the single transition owned by the current phase
    pub async fn step(&self, state: WorkflowState) -> Result<WorkflowState, WorkflowError> {
        match state.phase() {
            Phase::Classify => self.classify(state).await,
            Phase::Route => {
                let state = state.with_route(&self.router)?;
                debug!(phase = %state.phase(), "Routed");
                Ok(state)
            }
            Phase::Retrieve(store) => self.retrieve(state, store).await,
            Phase::Validate => self.validate(state).await,
            Phase::Generate => self.generate(state).await,
            Phase::Done => Ok(state),
        }
    }

    async fn classify(&self, state: WorkflowState) -> Result<WorkflowState, WorkflowError> {
        let query = state.current_query();
        let domain = self
            .call(WorkflowStep::Classify, || self.classifier.classify(query))
            .await?;

        info!(
            round = state.rounds().len() + 1,
            query = query,
            domain = %domain,
            "Classified query"
        );

        state.with_domain(domain)
    }

    async fn retrieve(
        &self,
        state: WorkflowState,
        store: StoreId,
    ) -> Result<WorkflowState, WorkflowError> {
        let client = self
            .stores
            .store(store)
            .await
            .map_err(|e| WorkflowError::store(store, &e))?;
        let client = client.as_ref();
        let query = state.current_query();
        let top_k = self.config.top_k;

        let result = self
            .call(WorkflowStep::Retrieve, || {
                client
                    .query(query, top_k)
                    .map_err(move |e| WorkflowError::store(store, &e))
            })
            .await
            .map_err(|e| match e {
                WorkflowError::Timeout { .. } => {
                    WorkflowError::store_unavailable(store, e.to_string())
                }
                other => other,
            });

        record_store_query(
            store.as_str(),
            client.backend(),
            result.is_ok(),
            result.as_ref().map(Vec::len).unwrap_or(0),
        );

        let batch = result?;
        info!(
            store = %store,
            backend = client.backend(),
            retrieved = batch.len(),
            accumulated = state.documents().len() + batch.len(),
            "Retrieved documents"
        );

        state.with_retrieved(batch)
    }

    async fn validate(&self, state: WorkflowState) -> Result<WorkflowState, WorkflowError> {
        if state.documents().is_empty() {
            info!("No documents retrieved, skipping validation");
            return state.skip_validation();
        }

        let query = state.main_query();
        let documents = state.documents();
        let verdict = self
            .call(WorkflowStep::Validate, || self.validator.validate(query, documents))
            .await?;

        let next = state.with_verdict(verdict, self.config.max_iterations)?;

        if next.cap_reached() {
            warn!(
                max_iterations = self.config.max_iterations,
                "Iteration cap reached, generating with accumulated documents"
            );
        } else {
            info!(
                needs_retrieval = next.needs_retrieval().unwrap_or(false),
                current_query = next.current_query(),
                "Validated retrieval"
            );
        }

        Ok(next)
    }

    async fn generate(&self, state: WorkflowState) -> Result<WorkflowState, WorkflowError> {
        let query = state.main_query();
        let documents = state.documents();
        let answer = self
            .call(WorkflowStep::Generate, || self.generator.generate(query, documents))
            .await?;

        debug!(answer_chars = answer.chars().count(), "Generated answer");

        state.complete(answer)
    }

    /// Run a collaborator call under the step timeout, retrying transport failures
    async fn call<T, F, Fut>(&self, step: WorkflowStep, mut op: F) -> Result<T, WorkflowError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, WorkflowError>>,
    {
        let policy = &self.config.retry;
        let mut attempt = 0;

        loop {
            let outcome = match tokio::time::timeout(self.config.step_timeout(), op()).await {
                Ok(result) => result,
                Err(_) => Err(WorkflowError::timeout(step, self.config.step_timeout_ms)),
            };

            match outcome {
                Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                    let delay = policy.delay_for_attempt(attempt);
                    warn!(
                        step = %step,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying step"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}
