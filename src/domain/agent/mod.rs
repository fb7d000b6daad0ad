//! Agentic retrieval domain
//!
//! This module provides:
//! - `WorkflowState` and its phase-checked transitions
//! - `Domain` labels and the `StoreRouter` mapping table
//! - The classifier, validator and generator contracts
//! - Loop-control settings and workflow errors

mod collaborators;
mod config;
mod error;
mod routing;
mod state;

pub use collaborators::{AnswerGenerator, DomainClassifier, RetrievalValidator};
pub use config::{RetryPolicy, WorkflowConfig};
pub use error::{WorkflowError, WorkflowStep};
pub use routing::{Domain, StoreRouter};
pub use state::{Completion, Phase, RetrievalRound, RetrievalVerdict, WorkflowState};

#[cfg(test)]
pub use collaborators::mock::{MockAnswerGenerator, MockDomainClassifier, MockRetrievalValidator};
