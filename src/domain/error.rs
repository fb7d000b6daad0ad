use thiserror::Error;

/// Core domain errors shared by providers, stores and parsers
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    /// The remote service answered but refused the request (bad key, bad payload)
    #[error("Request rejected by {provider}: {message}")]
    Rejected { provider: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn rejected(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Whether the same call may succeed if repeated
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Provider { .. } | Self::Storage { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Collection 'healthcare' not found");
        assert_eq!(
            error.to_string(),
            "Not found: Collection 'healthcare' not found"
        );
    }

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("Invalid input");
        assert_eq!(error.to_string(), "Validation error: Invalid input");
    }

    #[test]
    fn test_provider_error() {
        let error = DomainError::provider("groq", "rate limited");
        assert_eq!(error.to_string(), "Provider error: groq - rate limited");
    }

    #[test]
    fn test_transient_classification() {
        assert!(DomainError::provider("qdrant", "timeout").is_transient());
        assert!(DomainError::storage("connection reset").is_transient());
        assert!(!DomainError::validation("bad json").is_transient());
        assert!(!DomainError::configuration("missing key").is_transient());
        assert!(!DomainError::rejected("http", "HTTP 401 Unauthorized").is_transient());
    }
}
