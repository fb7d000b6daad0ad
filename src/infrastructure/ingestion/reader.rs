//! Reads files from disk into cleaned plain text

use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::parsers::{DocxParser, PdfParser, PlainTextParser};
use crate::domain::ingestion::{DocumentParser, IngestionError, ParsedDocument, ParserInput};

static NEWLINE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\n\s*").unwrap());
static HORIZONTAL_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());

/// Collapse blank-line runs to one newline and space/tab runs to one space, then trim
pub fn clean_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let text = NEWLINE_RUNS.replace_all(&text, "\n");
    let text = HORIZONTAL_SPACE.replace_all(&text, " ");
    text.trim().to_string()
}

/// Dispatches files to a parser by extension
#[derive(Debug, Clone)]
pub struct FileDocumentReader {
    parsers: Vec<Arc<dyn DocumentParser>>,
}

impl FileDocumentReader {
    pub fn new(parsers: Vec<Arc<dyn DocumentParser>>) -> Self {
        Self { parsers }
    }

    pub fn supported_extensions(&self) -> Vec<&str> {
        self.parsers
            .iter()
            .flat_map(|p| p.supported_extensions().iter().copied())
            .collect()
    }

    pub async fn read(&self, path: &Path) -> Result<ParsedDocument, IngestionError> {
        let file_path = path.display().to_string();

        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(IngestionError::NotFound(file_path));
        }

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&file_path)
            .to_string();

        let parser = self
            .parsers
            .iter()
            .find(|p| p.supports_file(&filename))
            .ok_or_else(|| {
                let extension = ParserInput::new(Vec::new(), &filename).extension();
                IngestionError::unsupported(&file_path, extension)
            })?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| IngestionError::parse(&file_path, e.to_string()))?;
        debug!(path = %file_path, bytes = bytes.len(), "Read source file");

        let mut parsed = parser.parse(ParserInput::new(bytes, filename)).await?;
        parsed.content = clean_text(&parsed.content);

        Ok(parsed)
    }
}

impl Default for FileDocumentReader {
    fn default() -> Self {
        Self::new(vec![
            Arc::new(PlainTextParser::new()),
            Arc::new(PdfParser::new()),
            Arc::new(DocxParser::new()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, TempDir};

    #[test]
    fn test_clean_text() {
        let raw = "  Title\r\n\r\n\n  Body\t\t text   here \n \n\nEnd  ";
        assert_eq!(clean_text(raw), "Title\nBody text here\nEnd");
    }

    #[test]
    fn test_clean_text_keeps_single_newlines() {
        assert_eq!(clean_text("a\nb"), "a\nb");
    }

    #[tokio::test]
    async fn test_reads_text_file() {
        let mut file = Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "Insulin   lowers\n\n\nblood glucose.").unwrap();

        let parsed = FileDocumentReader::default().read(file.path()).await.unwrap();

        assert_eq!(parsed.content, "Insulin lowers\nblood glucose.");
        assert_eq!(parsed.metadata.mime_type, "text/plain");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let result = FileDocumentReader::default()
            .read(&dir.path().join("absent.txt"))
            .await;

        assert!(matches!(result, Err(IngestionError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_legacy_doc_is_unsupported() {
        let file = Builder::new().suffix(".doc").tempfile().unwrap();

        let result = FileDocumentReader::default().read(file.path()).await;

        match result {
            Err(IngestionError::UnsupportedFormat { extension, .. }) => {
                assert_eq!(extension, "doc")
            }
            other => panic!("expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_supported_extensions() {
        let reader = FileDocumentReader::default();
        let extensions = reader.supported_extensions();
        for ext in ["txt", "md", "pdf", "docx"] {
            assert!(extensions.contains(&ext));
        }
        assert!(!extensions.contains(&"doc"));
    }
}
