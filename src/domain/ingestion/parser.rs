//! Document parser trait and types

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use super::IngestionError;

/// Raw file contents handed to a parser
#[derive(Debug, Clone)]
pub struct ParserInput {
    pub bytes: Vec<u8>,
    /// File name, used for format detection and error messages
    pub filename: String,
}

impl ParserInput {
    pub fn new(bytes: impl Into<Vec<u8>>, filename: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            filename: filename.into(),
        }
    }

    /// Lowercased extension, empty when there is none
    pub fn extension(&self) -> String {
        extension_of(&self.filename)
    }
}

/// Metadata extracted from a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub source: String,
    pub mime_type: String,
    pub extracted_at: DateTime<Utc>,
}

impl DocumentMetadata {
    pub fn new(source: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            title: None,
            source: source.into(),
            mime_type: mime_type.into(),
            extracted_at: Utc::now(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Result of parsing a document
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub content: String,
    pub metadata: DocumentMetadata,
}

impl ParsedDocument {
    pub fn new(content: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }
}

/// Turns raw file bytes into plain text
#[async_trait]
pub trait DocumentParser: Send + Sync + Debug {
    /// Lowercase extensions without the dot
    fn supported_extensions(&self) -> &[&str];

    async fn parse(&self, input: ParserInput) -> Result<ParsedDocument, IngestionError>;

    fn supports_file(&self, filename: &str) -> bool {
        let ext = extension_of(filename);

        !ext.is_empty()
            && self
                .supported_extensions()
                .iter()
                .any(|e| e.eq_ignore_ascii_case(&ext))
    }
}

fn extension_of(filename: &str) -> String {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct TextOnly;

    #[async_trait]
    impl DocumentParser for TextOnly {
        fn supported_extensions(&self) -> &[&str] {
            &["txt"]
        }

        async fn parse(&self, input: ParserInput) -> Result<ParsedDocument, IngestionError> {
            Ok(ParsedDocument::new(
                String::from_utf8_lossy(&input.bytes),
                DocumentMetadata::new(input.filename, "text/plain"),
            ))
        }
    }

    #[test]
    fn test_supports_file_is_case_insensitive() {
        assert!(TextOnly.supports_file("notes.TXT"));
        assert!(TextOnly.supports_file("dir/notes.txt"));
        assert!(!TextOnly.supports_file("notes.doc"));
        assert!(!TextOnly.supports_file("txt"));
    }

    #[test]
    fn test_extension() {
        assert_eq!(ParserInput::new(vec![], "Report.PDF").extension(), "pdf");
        assert_eq!(ParserInput::new(vec![], "README").extension(), "");
    }

    #[test]
    fn test_metadata_builder() {
        let metadata = DocumentMetadata::new("a.md", "text/markdown").with_title("Intro");
        assert_eq!(metadata.title.as_deref(), Some("Intro"));
        assert_eq!(metadata.source, "a.md");
    }
}
