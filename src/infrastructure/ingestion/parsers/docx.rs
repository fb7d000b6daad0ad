//! DOCX text extraction from `word/document.xml`

use std::io::{Cursor, Read};

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;

use super::guess_mime;
use crate::domain::ingestion::{
    DocumentMetadata, DocumentParser, IngestionError, ParsedDocument, ParserInput,
};

const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Clone, Default)]
pub struct DocxParser;

impl DocxParser {
    pub fn new() -> Self {
        Self
    }

    fn read_document_xml(bytes: &[u8]) -> Result<String, String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| e.to_string())?;
        let mut part = archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| format!("{}: {}", DOCUMENT_PART, e))?;

        let mut xml = String::new();
        part.read_to_string(&mut xml).map_err(|e| e.to_string())?;
        Ok(xml)
    }

    /// Text of `w:t` runs, one line per `w:p` paragraph
    fn extract_text(xml: &str) -> Result<String, String> {
        let mut reader = Reader::from_str(xml);
        let mut text = String::new();
        let mut in_run_text = false;

        loop {
            match reader.read_event().map_err(|e| e.to_string())? {
                Event::Start(e) if e.local_name().as_ref() == b"t" => in_run_text = true,
                Event::End(e) => match e.local_name().as_ref() {
                    b"t" => in_run_text = false,
                    b"p" => text.push('\n'),
                    _ => {}
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"tab" => text.push('\t'),
                    b"br" | b"cr" => text.push('\n'),
                    _ => {}
                },
                Event::Text(t) if in_run_text => {
                    let unescaped = t.unescape().map_err(|e| e.to_string())?;
                    text.push_str(&unescaped);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(text)
    }
}

#[async_trait]
impl DocumentParser for DocxParser {
    fn supported_extensions(&self) -> &[&str] {
        &["docx"]
    }

    async fn parse(&self, input: ParserInput) -> Result<ParsedDocument, IngestionError> {
        let ParserInput { bytes, filename } = input;
        let file = filename.clone();

        let content = tokio::task::spawn_blocking(move || {
            Self::read_document_xml(&bytes).and_then(|xml| Self::extract_text(&xml))
        })
        .await
        .map_err(|e| IngestionError::parse(&file, format!("extraction task failed: {}", e)))?
        .map_err(|e| IngestionError::parse(&file, e))?;

        let metadata = DocumentMetadata::new(&filename, guess_mime(&filename));
        Ok(ParsedDocument::new(content, metadata))
    }
}
