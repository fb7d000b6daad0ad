//! Retrieved document type

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::StoreId;

/// Metadata key carrying provenance
pub const SOURCE_KEY: &str = "source";

/// Provenance reported for documents without a `source` entry
pub const UNKNOWN_SOURCE: &str = "unknown";

/// How a store's scores rank results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreOrientation {
    /// Similarity: larger is closer
    HigherIsCloser,
    /// Distance: smaller is closer
    LowerIsCloser,
}

/// A chunk returned by a store query
///
/// Scores are only comparable between documents from the same store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    text: String,
    metadata: HashMap<String, String>,
    score: f32,
    store: StoreId,
}

impl Document {
    pub fn new(
        store: StoreId,
        text: impl Into<String>,
        metadata: HashMap<String, String>,
        score: f32,
    ) -> Self {
        Self {
            text: text.into(),
            metadata,
            score,
            store,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    /// Store slot that produced this document
    pub fn store(&self) -> StoreId {
        self.store
    }

    /// Provenance identifier, `"unknown"` when the chunk carries none
    pub fn source(&self) -> &str {
        self.metadata
            .get(SOURCE_KEY)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_SOURCE)
    }
}
