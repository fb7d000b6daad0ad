//! Document parser implementations

mod docx;
mod pdf;
mod plain_text;

pub use docx::DocxParser;
pub use pdf::PdfParser;
pub use plain_text::PlainTextParser;

fn guess_mime(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
