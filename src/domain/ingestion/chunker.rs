//! Chunking strategy trait and types

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use super::IngestionError;

/// Configuration for chunking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Characters of the previous chunk repeated at the start of the next
    pub chunk_overlap: usize,
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    pub fn validate(&self) -> Result<(), IngestionError> {
        if self.chunk_size == 0 {
            return Err(IngestionError::Validation(
                "chunk_size must be greater than 0".to_string(),
            ));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(IngestionError::Validation(
                "chunk_overlap must be less than chunk_size".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self::new(500, 50)
    }
}

/// A chunk of text extracted from a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub content: String,
    /// 0-based position within the source
    pub index: usize,
}

impl Chunk {
    pub fn new(content: impl Into<String>, index: usize) -> Self {
        Self {
            content: content.into(),
            index,
        }
    }
}

pub trait ChunkingStrategy: Send + Sync + Debug {
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>, IngestionError>;

    fn name(&self) -> &'static str;
}
