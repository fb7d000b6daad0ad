use thiserror::Error;

use crate::domain::vector_store::StoreId;
use crate::domain::DomainError;

/// Failures while loading a source into a store
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Unsupported document format '{extension}' for {file}")]
    UnsupportedFormat { file: String, extension: String },

    #[error("Failed to parse {file}: {message}")]
    Parse { file: String, message: String },

    #[error("Domain classification failed: {0}")]
    Classification(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Store {store} rejected the upsert: {message}")]
    Store { store: StoreId, message: String },

    #[error("Invalid ingestion input: {0}")]
    Validation(String),
}

impl IngestionError {
    pub fn unsupported(file: impl Into<String>, extension: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            file: file.into(),
            extension: extension.into(),
        }
    }

    pub fn parse(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn store(store: StoreId, error: DomainError) -> Self {
        Self::Store {
            store,
            message: error.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::UnsupportedFormat { .. } => "unsupported_format",
            Self::Parse { .. } => "parse",
            Self::Classification(_) => "classification",
            Self::Embedding(_) => "embedding",
            Self::Store { .. } => "store",
            Self::Validation(_) => "validation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_message() {
        let error = IngestionError::unsupported("notes.doc", "doc");
        assert_eq!(
            error.to_string(),
            "Unsupported document format 'doc' for notes.doc"
        );
        assert_eq!(error.kind(), "unsupported_format");
    }

    #[test]
    fn test_store_error_wraps_domain_error() {
        let error = IngestionError::store(StoreId::B, DomainError::storage("disk full"));
        assert_eq!(
            error.to_string(),
            "Store B rejected the upsert: Storage error: disk full"
        );
    }
}
