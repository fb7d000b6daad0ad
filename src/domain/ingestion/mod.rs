//! Document ingestion domain types and traits
//!
//! - `DocumentParser` turns raw file bytes into text
//! - `ChunkingStrategy` splits text into overlapping chunks
//! - `IngestionError` and `IngestionReport` describe the outcome of loading a source

pub mod chunker;
pub mod config;
pub mod error;
pub mod parser;

pub use chunker::{Chunk, ChunkingConfig, ChunkingStrategy};
pub use config::{IngestionConfig, IngestionReport};
pub use error::IngestionError;
pub use parser::{DocumentMetadata, DocumentParser, ParsedDocument, ParserInput};
