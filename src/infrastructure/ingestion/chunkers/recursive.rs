//! Recursive chunking strategy

use unicode_segmentation::UnicodeSegmentation;

use crate::domain::ingestion::{Chunk, ChunkingConfig, ChunkingStrategy, IngestionError};

/// Chunking strategy that recursively splits text hierarchically
///
/// Splitting order: headers -> paragraphs -> lines -> sentences -> words -> characters.
/// Sizes are counted in characters. Each chunk after the first starts with the
/// last `chunk_overlap` characters of the previous chunk's own text.
#[derive(Debug, Clone, Default)]
pub struct RecursiveChunker;

impl RecursiveChunker {
    pub fn new() -> Self {
        Self
    }

    fn split_by_headers(text: &str) -> Vec<&str> {
        let mut parts = Vec::new();
        let mut section_start = 0;
        let mut offset = 0;

        for line in text.split_inclusive('\n') {
            if line.starts_with('#') && offset > section_start {
                parts.push(text[section_start..offset].trim());
                section_start = offset;
            }
            offset += line.len();
        }
        parts.push(text[section_start..].trim());

        parts.retain(|p| !p.is_empty());
        parts
    }

    fn split_by_paragraphs(text: &str) -> Vec<&str> {
        text.split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect()
    }

    fn split_by_lines(text: &str) -> Vec<&str> {
        text.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
    }

    fn split_by_sentences(text: &str) -> Vec<&str> {
        text.unicode_sentences()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    fn split_by_chars(text: &str, budget: usize) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        chars
            .chunks(budget)
            .map(|c| c.iter().collect::<String>())
            .collect()
    }

    fn recursive_split(text: &str, budget: usize, level: usize) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        if char_len(text) <= budget {
            return vec![text.to_string()];
        }

        let (parts, separator) = match level {
            0 => (Self::split_by_headers(text), "\n\n"),
            1 => (Self::split_by_paragraphs(text), "\n\n"),
            2 => (Self::split_by_lines(text), "\n"),
            3 => (Self::split_by_sentences(text), " "),
            4 => (text.split_whitespace().collect(), " "),
            _ => return Self::split_by_chars(text, budget),
        };

        if parts.len() <= 1 {
            return Self::recursive_split(text, budget, level + 1);
        }

        let mut result = Vec::new();
        let mut current = String::new();

        for part in parts {
            if char_len(part) > budget {
                if !current.is_empty() {
                    result.push(std::mem::take(&mut current));
                }
                result.extend(Self::recursive_split(part, budget, level + 1));
            } else if current.is_empty() {
                current.push_str(part);
            } else if char_len(&current) + separator.len() + char_len(part) <= budget {
                current.push_str(separator);
                current.push_str(part);
            } else {
                result.push(std::mem::replace(&mut current, part.to_string()));
            }
        }

        if !current.is_empty() {
            result.push(current);
        }

        result
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Last `n` characters of `text`
fn tail(text: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }

    let len = char_len(text);
    if len <= n {
        return text;
    }

    text.char_indices()
        .nth(len - n)
        .map(|(i, _)| &text[i..])
        .unwrap_or(text)
}

impl ChunkingStrategy for RecursiveChunker {
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>, IngestionError> {
        config.validate()?;

        let overlap = config.chunk_overlap;
        // room for the overlap tail and its joining space
        let budget = if overlap == 0 {
            config.chunk_size
        } else {
            (config.chunk_size - overlap).saturating_sub(1).max(1)
        };

        let bodies = Self::recursive_split(content, budget, 0);

        let mut chunks = Vec::with_capacity(bodies.len());
        let mut previous: Option<&str> = None;

        for (index, body) in bodies.iter().enumerate() {
            // prefix plus joining space must fit beside the body
            let room = config.chunk_size.saturating_sub(char_len(body) + 1);
            let text = match previous.map(|p| tail(p, overlap.min(room)).trim()) {
                Some(prefix) if !prefix.is_empty() => format!("{} {}", prefix, body),
                _ => body.clone(),
            };
            chunks.push(Chunk::new(text, index));
            previous = Some(body);
        }

        Ok(chunks)
    }

    fn name(&self) -> &'static str {
        "recursive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("word{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_empty_content() {
        let chunks = RecursiveChunker::new()
            .chunk("  \n\n ", &ChunkingConfig::default())
            .unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_small_content_is_single_chunk() {
        let chunks = RecursiveChunker::new()
            .chunk("Small content", &ChunkingConfig::default())
            .unwrap();

        assert_eq!(chunks, vec![Chunk::new("Small content", 0)]);
    }

    #[test]
    fn test_chunks_respect_size_with_overlap() {
        let config = ChunkingConfig::new(100, 20);
        let chunks = RecursiveChunker::new().chunk(&words(200), &config).unwrap();

        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert!(chunk.content.chars().count() <= 100, "chunk {} too long", i);
        }
    }

    #[test]
    fn test_overlap_repeats_previous_tail() {
        let config = ChunkingConfig::new(80, 15);
        let chunks = RecursiveChunker::new().chunk(&words(60), &config).unwrap();

        for pair in chunks.windows(2) {
            let last_word = pair[0].content.split_whitespace().last().unwrap();
            assert!(
                pair[1].content.starts_with(last_word)
                    || pair[1].content.contains(&format!(" {} ", last_word)),
                "'{}' does not carry '{}'",
                pair[1].content,
                last_word
            );
        }
    }

    #[test]
    fn test_zero_overlap_loses_no_words() {
        let text = words(150);
        let chunks = RecursiveChunker::new()
            .chunk(&text, &ChunkingConfig::new(64, 0))
            .unwrap();

        let rejoined: Vec<&str> = chunks
            .iter()
            .flat_map(|c| c.content.split_whitespace())
            .collect();
        let original: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rejoined, original);
    }

    #[test]
    fn test_headers_start_sections() {
        let content = "# Dosage\n\nTake one tablet daily with food.\n\n# Side effects\n\nNausea and headache are common.";
        let chunks = RecursiveChunker::new()
            .chunk(content, &ChunkingConfig::new(60, 0))
            .unwrap();

        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].content.starts_with("# Dosage"));
        assert!(chunks[1].content.starts_with("# Side effects"));
    }

    #[test]
    fn test_sentences_split_before_words() {
        let content = "Steel yields under load. Concrete cracks in tension. Timber creeps over time.";
        let chunks = RecursiveChunker::new()
            .chunk(content, &ChunkingConfig::new(30, 0))
            .unwrap();

        assert_eq!(chunks[0].content, "Steel yields under load.");
        assert_eq!(chunks[1].content, "Concrete cracks in tension.");
    }

    #[test]
    fn test_multibyte_text_without_spaces() {
        let content = "é".repeat(250);
        let chunks = RecursiveChunker::new()
            .chunk(&content, &ChunkingConfig::new(100, 0))
            .unwrap();

        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.content.chars().count() <= 100));
    }

    #[test]
    fn test_invalid_overlap_rejected() {
        let result = RecursiveChunker::new().chunk("text", &ChunkingConfig::new(50, 50));
        assert!(matches!(result, Err(IngestionError::Validation(_))));
    }

    #[test]
    fn test_tail_is_char_aware() {
        assert_eq!(tail("héllo", 3), "llo");
        assert_eq!(tail("hé", 5), "hé");
        assert_eq!(tail("hello", 0), "");
    }

    #[test]
    fn test_zero_overlap_adds_no_prefix() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let chunks = RecursiveChunker::new()
            .chunk(text, &ChunkingConfig::new(20, 0))
            .unwrap();

        assert_eq!(
            chunks.iter().map(|c| c.content.as_str()).collect::<Vec<_>>(),
            vec!["alpha beta gamma", "delta epsilon zeta", "eta theta iota kappa"]
        );
    }

    #[test]
    fn test_maximal_overlap_stays_within_size() {
        let chunks = RecursiveChunker::new()
            .chunk("abcdefghij", &ChunkingConfig::new(2, 1))
            .unwrap();

        assert_eq!(chunks.len(), 10);
        assert!(chunks.iter().all(|c| c.content.chars().count() <= 2));

        let chunks = RecursiveChunker::new()
            .chunk(&words(40), &ChunkingConfig::new(12, 11))
            .unwrap();
        assert!(chunks.iter().all(|c| c.content.chars().count() <= 12));
    }

    #[test]
    fn test_lines_split_before_sentences() {
        let content = "Torque: 40 Nm\nPressure: 3 bar\nClearance: 0.2 mm";
        let chunks = RecursiveChunker::new()
            .chunk(content, &ChunkingConfig::new(32, 0))
            .unwrap();

        assert_eq!(chunks[0].content, "Torque: 40 Nm\nPressure: 3 bar");
        assert_eq!(chunks[1].content, "Clearance: 0.2 mm");
    }
}
