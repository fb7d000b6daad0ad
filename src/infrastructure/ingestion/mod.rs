//! Document ingestion infrastructure: parsers, chunker, file reader and pipeline

pub mod chunkers;
pub mod parsers;
pub mod pipeline;
pub mod reader;

pub use chunkers::RecursiveChunker;
pub use parsers::{DocxParser, PdfParser, PlainTextParser};
pub use pipeline::IngestionPipeline;
pub use reader::{clean_text, FileDocumentReader};
