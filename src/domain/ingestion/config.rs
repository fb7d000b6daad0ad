//! Ingestion settings and results

use serde::{Deserialize, Serialize};

use super::ChunkingConfig;
use crate::domain::agent::Domain;
use crate::domain::vector_store::StoreId;

/// Settings for loading sources into stores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Characters of the source shown to the classifier
    pub classify_sample_chars: usize,
}

impl IngestionConfig {
    pub fn chunking(&self) -> ChunkingConfig {
        ChunkingConfig::new(self.chunk_size, self.chunk_overlap)
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            classify_sample_chars: 4000,
        }
    }
}

/// Outcome of ingesting one source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionReport {
    pub source: String,
    pub domain: Domain,
    pub store: StoreId,
    pub chunks: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IngestionConfig::default();
        assert_eq!(config.chunking(), ChunkingConfig::new(500, 50));
        assert_eq!(config.classify_sample_chars, 4000);
    }

    #[test]
    fn test_report_serialization() {
        let report = IngestionReport {
            source: "cardio.pdf".to_string(),
            domain: Domain::Healthcare,
            store: StoreId::A,
            chunks: 12,
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["domain"], "HEALTHCARE");
        assert_eq!(json["store"], "A");
        assert_eq!(json["chunks"], 12);
    }
}
