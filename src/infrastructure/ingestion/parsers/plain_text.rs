//! Plain text and markdown parser

use async_trait::async_trait;

use super::guess_mime;
use crate::domain::ingestion::{
    DocumentMetadata, DocumentParser, IngestionError, ParsedDocument, ParserInput,
};

/// Decodes UTF-8, replacing invalid sequences
#[derive(Debug, Clone, Default)]
pub struct PlainTextParser;

impl PlainTextParser {
    pub fn new() -> Self {
        Self
    }
}

/// First markdown heading, if any
fn markdown_title(content: &str) -> Option<&str> {
    content
        .lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl DocumentParser for PlainTextParser {
    fn supported_extensions(&self) -> &[&str] {
        &["txt", "text", "md", "markdown"]
    }

    async fn parse(&self, input: ParserInput) -> Result<ParsedDocument, IngestionError> {
        let content = String::from_utf8_lossy(&input.bytes).into_owned();

        let mut metadata = DocumentMetadata::new(&input.filename, guess_mime(&input.filename));
        if matches!(input.extension().as_str(), "md" | "markdown") {
            if let Some(title) = markdown_title(&content) {
                metadata = metadata.with_title(title);
            }
        }

        Ok(ParsedDocument::new(content, metadata))
    }
}
