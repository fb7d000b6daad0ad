//! PDF text extraction

use async_trait::async_trait;

use super::guess_mime;
use crate::domain::ingestion::{
    DocumentMetadata, DocumentParser, IngestionError, ParsedDocument, ParserInput,
};

#[derive(Debug, Clone, Default)]
pub struct PdfParser;

impl PdfParser {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentParser for PdfParser {
    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    async fn parse(&self, input: ParserInput) -> Result<ParsedDocument, IngestionError> {
        let ParserInput { bytes, filename } = input;
        let file = filename.clone();

        // extraction is CPU-bound
        let extract = move || pdf_extract::extract_text_from_mem(&bytes);
        let extracted = tokio::task::spawn_blocking(extract)
            .await
            .map_err(|e| IngestionError::parse(&file, format!("extraction task failed: {}", e)))?;
        let content = extracted.map_err(|e| IngestionError::parse(&file, e.to_string()))?;

        let metadata = DocumentMetadata::new(&filename, guess_mime(&filename));
        Ok(ParsedDocument::new(content, metadata))
    }
}
