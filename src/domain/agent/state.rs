//! Workflow state and its transitions
//!
//! Every transition consumes the current state and returns the next one,
//! overriding only the fields that step owns.

use std::collections::BTreeSet;
use std::fmt::{self, Display};

use serde::Serialize;

use super::{Domain, StoreRouter, WorkflowError};
use crate::domain::vector_store::{Document, StoreId};

/// Position in the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "store", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Classify,
    Route,
    Retrieve(StoreId),
    Validate,
    Generate,
    Done,
}

impl Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classify => f.write_str("CLASSIFY"),
            Self::Route => f.write_str("ROUTE"),
            Self::Retrieve(store) => write!(f, "RETRIEVE[{}]", store),
            Self::Validate => f.write_str("VALIDATE"),
            Self::Generate => f.write_str("GENERATE"),
            Self::Done => f.write_str("DONE"),
        }
    }
}

/// Validator outcome for one retrieval round
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalVerdict {
    Sufficient,
    Refine { refined_query: String },
}

impl RetrievalVerdict {
    pub fn refine(refined_query: impl Into<String>) -> Self {
        Self::Refine {
            refined_query: refined_query.into(),
        }
    }

    pub fn needs_retrieval(&self) -> bool {
        matches!(self, Self::Refine { .. })
    }

    pub fn refined_query(&self) -> Option<&str> {
        match self {
            Self::Sufficient => None,
            Self::Refine { refined_query } => Some(refined_query),
        }
    }
}

/// Audit record of one RETRIEVE + VALIDATE pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalRound {
    pub round: u32,
    pub query: String,
    pub domain: Domain,
    pub store: StoreId,
    pub retrieved: usize,
    pub needs_retrieval: Option<bool>,
    pub validator_skipped: bool,
}

/// Terminal output; answer and sources only exist together
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Completion {
    pub answer: String,
    pub sources: BTreeSet<String>,
}

/// State threaded through one workflow execution
#[derive(Debug, Clone)]
pub struct WorkflowState {
    main_query: String,
    current_query: String,
    domain: Option<Domain>,
    documents: Vec<Document>,
    needs_retrieval: Option<bool>,
    completion: Option<Completion>,
    phase: Phase,
    rounds: Vec<RetrievalRound>,
    refinements: u32,
    cap_reached: bool,
}

impl WorkflowState {
    pub fn new(main_query: impl Into<String>) -> Self {
        let main_query = main_query.into();

        Self {
            current_query: main_query.clone(),
            main_query,
            domain: None,
            documents: Vec::new(),
            needs_retrieval: None,
            completion: None,
            phase: Phase::Classify,
            rounds: Vec::new(),
            refinements: 0,
            cap_reached: false,
        }
    }

    pub fn main_query(&self) -> &str {
        &self.main_query
    }

    pub fn current_query(&self) -> &str {
        &self.current_query
    }

    pub fn domain(&self) -> Option<Domain> {
        self.domain
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn needs_retrieval(&self) -> Option<bool> {
        self.needs_retrieval
    }

    pub fn answer(&self) -> Option<&str> {
        self.completion.as_ref().map(|c| c.answer.as_str())
    }

    pub fn sources(&self) -> Option<&BTreeSet<String>> {
        self.completion.as_ref().map(|c| &c.sources)
    }

    pub fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn rounds(&self) -> &[RetrievalRound] {
        &self.rounds
    }

    /// Refined queries accepted so far
    pub fn refinements(&self) -> u32 {
        self.refinements
    }

    /// The validator still wanted more evidence when the loop cap stopped it
    pub fn cap_reached(&self) -> bool {
        self.cap_reached
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == Phase::Done
    }

    fn expect_phase(&self, expected: Phase, action: &'static str) -> Result<(), WorkflowError> {
        if self.phase != expected {
            return Err(WorkflowError::InvalidTransition {
                phase: self.phase,
                action,
            });
        }
        Ok(())
    }

    /// CLASSIFY -> ROUTE
    pub fn with_domain(self, domain: Domain) -> Result<Self, WorkflowError> {
        self.expect_phase(Phase::Classify, "set the domain")?;

        Ok(Self {
            domain: Some(domain),
            phase: Phase::Route,
            ..self
        })
    }

    /// ROUTE -> RETRIEVE[store]
    pub fn with_route(self, router: &StoreRouter) -> Result<Self, WorkflowError> {
        self.expect_phase(Phase::Route, "route")?;

        let domain = self.domain.ok_or(WorkflowError::InvalidTransition {
            phase: self.phase,
            action: "route without a domain",
        })?;

        Ok(Self {
            phase: Phase::Retrieve(router.route(domain)),
            ..self
        })
    }

    /// RETRIEVE -> VALIDATE, appending the batch
    pub fn with_retrieved(self, batch: Vec<Document>) -> Result<Self, WorkflowError> {
        let (Phase::Retrieve(store), Some(domain)) = (self.phase, self.domain) else {
            return Err(WorkflowError::InvalidTransition {
                phase: self.phase,
                action: "append documents",
            });
        };

        let round = RetrievalRound {
            round: self.rounds.len() as u32 + 1,
            query: self.current_query.clone(),
            domain,
            store,
            retrieved: batch.len(),
            needs_retrieval: None,
            validator_skipped: false,
        };

        let mut documents = self.documents;
        documents.extend(batch);
        let mut rounds = self.rounds;
        rounds.push(round);

        Ok(Self {
            documents,
            rounds,
            needs_retrieval: None,
            phase: Phase::Validate,
            ..self
        })
    }

    /// VALIDATE -> GENERATE when there is no evidence to judge
    pub fn skip_validation(self) -> Result<Self, WorkflowError> {
        self.expect_phase(Phase::Validate, "skip validation")?;

        let rounds = mark_last_round(self.rounds, false, true);

        Ok(Self {
            needs_retrieval: Some(false),
            rounds,
            phase: Phase::Generate,
            ..self
        })
    }

    /// VALIDATE -> CLASSIFY or GENERATE
    ///
    /// After `max_refinements` accepted refinements a further request for more
    /// evidence is recorded but not followed; `current_query` keeps naming the
    /// query behind the last batch.
    pub fn with_verdict(
        self,
        verdict: RetrievalVerdict,
        max_refinements: u32,
    ) -> Result<Self, WorkflowError> {
        self.expect_phase(Phase::Validate, "record a verdict")?;

        let needs_retrieval = verdict.needs_retrieval();
        let rounds = mark_last_round(self.rounds, needs_retrieval, false);

        match verdict {
            RetrievalVerdict::Sufficient => Ok(Self {
                needs_retrieval: Some(false),
                rounds,
                phase: Phase::Generate,
                ..self
            }),
            RetrievalVerdict::Refine { .. } if self.refinements >= max_refinements => Ok(Self {
                needs_retrieval: Some(true),
                rounds,
                cap_reached: true,
                phase: Phase::Generate,
                ..self
            }),
            RetrievalVerdict::Refine { refined_query } => Ok(Self {
                needs_retrieval: Some(true),
                current_query: refined_query,
                rounds,
                refinements: self.refinements + 1,
                phase: Phase::Classify,
                ..self
            }),
        }
    }

    /// GENERATE -> DONE, deriving sources from every accumulated document
    pub fn complete(self, answer: impl Into<String>) -> Result<Self, WorkflowError> {
        self.expect_phase(Phase::Generate, "complete")?;

        let sources = self
            .documents
            .iter()
            .map(|d| d.source().to_string())
            .collect();

        Ok(Self {
            completion: Some(Completion {
                answer: answer.into(),
                sources,
            }),
            phase: Phase::Done,
            ..self
        })
    }
}

fn mark_last_round(
    mut rounds: Vec<RetrievalRound>,
    needs_retrieval: bool,
    validator_skipped: bool,
) -> Vec<RetrievalRound> {
    if let Some(last) = rounds.last_mut() {
        last.needs_retrieval = Some(needs_retrieval);
        last.validator_skipped = validator_skipped;
    }
    rounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn doc(store: StoreId, text: &str, source: Option<&str>) -> Document {
        let mut metadata = HashMap::new();
        if let Some(source) = source {
            metadata.insert("source".to_string(), source.to_string());
        }
        Document::new(store, text, metadata, 0.5)
    }

    fn at_validate(batch: Vec<Document>) -> WorkflowState {
        WorkflowState::new("q")
            .with_domain(Domain::Healthcare)
            .unwrap()
            .with_route(&StoreRouter::default())
            .unwrap()
            .with_retrieved(batch)
            .unwrap()
    }

    #[test]
    fn test_new_state() {
        let state = WorkflowState::new("What is hypertension?");

        assert_eq!(state.main_query(), "What is hypertension?");
        assert_eq!(state.current_query(), "What is hypertension?");
        assert_eq!(state.phase(), Phase::Classify);
        assert!(state.domain().is_none());
        assert!(state.needs_retrieval().is_none());
        assert!(state.answer().is_none());
        assert!(state.sources().is_none());
    }

    #[test]
    fn test_classify_then_route() {
        let state = WorkflowState::new("beam design")
            .with_domain(Domain::Engineering)
            .unwrap();
        assert_eq!(state.phase(), Phase::Route);

        let state = state.with_route(&StoreRouter::default()).unwrap();
        assert_eq!(state.phase(), Phase::Retrieve(StoreId::B));
        assert_eq!(state.domain(), Some(Domain::Engineering));
    }

    #[test]
    fn test_retrieve_before_route_is_rejected() {
        let result = WorkflowState::new("q").with_retrieved(Vec::new());

        assert!(matches!(
            result,
            Err(WorkflowError::InvalidTransition { phase: Phase::Classify, .. })
        ));
    }

    #[test]
    fn test_retrieved_documents_are_appended() {
        let state = at_validate(vec![doc(StoreId::A, "one", None)]);
        let state = state
            .with_verdict(RetrievalVerdict::refine("q2"), 3)
            .unwrap()
            .with_domain(Domain::Healthcare)
            .unwrap()
            .with_route(&StoreRouter::default())
            .unwrap()
            .with_retrieved(vec![doc(StoreId::A, "two", None)])
            .unwrap();

        let texts: Vec<&str> = state.documents().iter().map(|d| d.text()).collect();
        assert_eq!(texts, vec!["one", "two"]);
        assert_eq!(state.rounds().len(), 2);
        assert_eq!(state.rounds()[1].query, "q2");
    }

    #[test]
    fn test_skip_validation_forces_generate() {
        let state = at_validate(Vec::new()).skip_validation().unwrap();

        assert_eq!(state.needs_retrieval(), Some(false));
        assert_eq!(state.phase(), Phase::Generate);
        assert!(state.rounds()[0].validator_skipped);
    }

    #[test]
    fn test_refine_overwrites_current_query() {
        let state = at_validate(vec![doc(StoreId::A, "one", None)])
            .with_verdict(RetrievalVerdict::refine("refined"), 3)
            .unwrap();

        assert_eq!(state.current_query(), "refined");
        assert_eq!(state.main_query(), "q");
        assert_eq!(state.needs_retrieval(), Some(true));
        assert_eq!(state.phase(), Phase::Classify);
        assert_eq!(state.refinements(), 1);
    }

    #[test]
    fn test_refine_at_cap_goes_to_generate() {
        let state = at_validate(vec![doc(StoreId::A, "one", None)])
            .with_verdict(RetrievalVerdict::refine("refined"), 0)
            .unwrap();

        assert_eq!(state.phase(), Phase::Generate);
        assert_eq!(state.current_query(), "q");
        assert_eq!(state.needs_retrieval(), Some(true));
        assert!(state.cap_reached());
    }

    #[test]
    fn test_complete_sets_answer_and_sources_together() {
        let state = at_validate(vec![
            doc(StoreId::A, "one", Some("a.pdf")),
            doc(StoreId::A, "two", Some("a.pdf")),
            doc(StoreId::A, "three", None),
        ])
        .with_verdict(RetrievalVerdict::Sufficient, 3)
        .unwrap()
        .complete("answer")
        .unwrap();

        assert!(state.is_terminal());
        assert_eq!(state.answer(), Some("answer"));
        let sources: Vec<&str> = state.sources().unwrap().iter().map(String::as_str).collect();
        assert_eq!(sources, vec!["a.pdf", "unknown"]);
    }

    #[test]
    fn test_complete_twice_is_rejected() {
        let state = at_validate(Vec::new())
            .skip_validation()
            .unwrap()
            .complete("first")
            .unwrap();

        assert!(state.complete("second").is_err());
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Retrieve(StoreId::A).to_string(), "RETRIEVE[A]");
        assert_eq!(Phase::Done.to_string(), "DONE");
    }
}
