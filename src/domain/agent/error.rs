//! Workflow error types

use std::fmt::{self, Display};

use thiserror::Error;

use super::Phase;
use crate::domain::DomainError;
use crate::domain::vector_store::StoreId;

/// Collaborator-calling steps of the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    Classify,
    Retrieve,
    Validate,
    Generate,
}

impl WorkflowStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classify => "classify",
            Self::Retrieve => "retrieve",
            Self::Validate => "validate",
            Self::Generate => "generate",
        }
    }
}

impl Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that abort a workflow execution
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WorkflowError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("Retrieval validation failed: {0}")]
    Validation(String),

    #[error("Answer generation failed: {0}")]
    Generation(String),

    #[error("Store {store} unavailable: {message}")]
    StoreUnavailable {
        store: StoreId,
        message: String,
        transient: bool,
    },

    #[error("Model call failed in '{step}': {message}")]
    Provider {
        step: WorkflowStep,
        message: String,
        transient: bool,
    },

    #[error("Timeout in step '{step}' after {timeout_ms}ms")]
    Timeout { step: WorkflowStep, timeout_ms: u64 },

    #[error("Cannot {action} while in phase {phase}")]
    InvalidTransition { phase: Phase, action: &'static str },
}

impl WorkflowError {
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery(message.into())
    }

    pub fn classification(message: impl Into<String>) -> Self {
        Self::Classification(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    pub fn store_unavailable(store: StoreId, message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            store,
            message: message.into(),
            transient: true,
        }
    }

    /// Wrap a store failure, keeping whether it is worth another attempt
    pub fn store(store: StoreId, error: &DomainError) -> Self {
        Self::StoreUnavailable {
            store,
            message: error.to_string(),
            transient: error.is_transient(),
        }
    }

    pub fn provider(step: WorkflowStep, message: impl Into<String>) -> Self {
        Self::Provider {
            step,
            message: message.into(),
            transient: true,
        }
    }

    /// Wrap a model call failure, keeping whether it is worth another attempt
    pub fn model(step: WorkflowStep, error: &DomainError) -> Self {
        Self::Provider {
            step,
            message: error.to_string(),
            transient: error.is_transient(),
        }
    }

    pub fn timeout(step: WorkflowStep, timeout_ms: u64) -> Self {
        Self::Timeout { step, timeout_ms }
    }

    /// Transport failures worth retrying; refused requests and malformed model output are not
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::StoreUnavailable { transient, .. } | Self::Provider { transient, .. } => {
                *transient
            }
            _ => false,
        }
    }

    /// Short label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidQuery(_) => "invalid_query",
            Self::Classification(_) => "classification",
            Self::Validation(_) => "validation",
            Self::Generation(_) => "generation",
            Self::StoreUnavailable { .. } => "store_unavailable",
            Self::Provider { .. } => "provider",
            Self::Timeout { .. } => "timeout",
            Self::InvalidTransition { .. } => "invalid_transition",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WorkflowError::store_unavailable(StoreId::A, "connection refused");
        assert_eq!(err.to_string(), "Store A unavailable: connection refused");

        let err = WorkflowError::timeout(WorkflowStep::Generate, 500);
        assert_eq!(err.to_string(), "Timeout in step 'generate' after 500ms");

        let err = WorkflowError::InvalidTransition {
            phase: Phase::Done,
            action: "record a verdict",
        };
        assert_eq!(err.to_string(), "Cannot record a verdict while in phase DONE");
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(WorkflowError::store_unavailable(StoreId::B, "x").is_retryable());
        assert!(WorkflowError::provider(WorkflowStep::Classify, "x").is_retryable());
        assert!(!WorkflowError::classification("FINANCE").is_retryable());
        assert!(!WorkflowError::timeout(WorkflowStep::Validate, 1).is_retryable());
    }

    #[test]
    fn test_refused_requests_are_not_retryable() {
        let refused = DomainError::rejected("http", "HTTP 401 Unauthorized: invalid api key");
        let err = WorkflowError::model(WorkflowStep::Classify, &refused);
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("401"));

        let err = WorkflowError::store(StoreId::A, &DomainError::validation("bad filter"));
        assert!(!err.is_retryable());

        let down = DomainError::provider("http", "Request failed: connection refused");
        assert!(WorkflowError::model(WorkflowStep::Generate, &down).is_retryable());
        assert!(WorkflowError::store(StoreId::B, &down).is_retryable());
    }
}
