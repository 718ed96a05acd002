use std::collections::HashMap;

use crate::core::errors::ApiError;
use crate::corpus::CorpusRecord;

/// Splits documents into overlapping chunks ready for embedding.
///
/// Windows are measured in characters. When a window does not end the
/// document, the chunk is trimmed back to the nearest paragraph, line, or
/// word boundary found in its tail.
#[derive(Debug, Clone)]
pub struct DocumentChunker {
    chunk_size: usize,
    overlap: usize,
}

/// Chunked `(file, message)` records with stable per-source chunk ids.
#[derive(Debug, Default)]
pub struct ChunkedRecords {
    pub ids: Vec<String>,
    pub texts: Vec<String>,
    /// chunk id -> source file
    pub sources: HashMap<String, String>,
}

impl DocumentChunker {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, ApiError> {
        if chunk_size == 0 {
            return Err(ApiError::BadRequest(
                "chunk_size must be a positive integer.".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(ApiError::BadRequest(
                "overlap must be smaller than chunk_size to avoid loops.".to_string(),
            ));
        }

        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split the incoming documents into chunks. Empty documents are
    /// skipped; emitted chunks are trimmed and never empty.
    pub fn chunk<'a, I>(&self, documents: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut chunks = Vec::new();
        for document in documents {
            if document.trim().is_empty() {
                continue;
            }
            chunks.extend(self.split(document));
        }
        chunks
    }

    /// Chunk `(file, message)` pairs into overlapping snippets. Chunk ids
    /// take the form `{file}::chunk-{index}`.
    pub fn chunk_records(&self, records: &[CorpusRecord]) -> ChunkedRecords {
        let mut out = ChunkedRecords::default();

        for record in records {
            let text = record.message.trim();
            if text.is_empty() {
                continue;
            }

            for (index, chunk) in self.split(text).into_iter().enumerate() {
                let chunk_id = format!("{}::chunk-{}", record.file, index);
                out.sources.insert(chunk_id.clone(), record.file.clone());
                out.ids.push(chunk_id);
                out.texts.push(chunk);
            }
        }

        out
    }

    fn split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let total_chars = chars.len();

        let mut chunks = Vec::new();
        let step = self.chunk_size.saturating_sub(self.overlap).max(1);
        let mut start = 0;

        while start < total_chars {
            let end = (start + self.chunk_size).min(total_chars);
            let window: String = chars[start..end].iter().collect();

            let piece = if end < total_chars {
                trim_to_boundary(&window)
            } else {
                window
            };

            let piece = piece.trim();
            if !piece.is_empty() {
                chunks.push(piece.to_string());
            }

            start += step;
        }

        chunks
    }
}

/// Cut the window back to a paragraph, line, or word boundary found in its
/// last 20%, falling back to the raw window.
fn trim_to_boundary(window: &str) -> String {
    let mut search_start = (window.len() * 80) / 100;
    while search_start > 0 && !window.is_char_boundary(search_start) {
        search_start -= 1;
    }
    let tail = &window[search_start..];

    for separator in ["\n\n", "\n", " "] {
        if let Some(pos) = tail.rfind(separator) {
            let cut = search_start + pos;
            if cut > 0 {
                return window[..cut].to_string();
            }
        }
    }

    window.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(file: &str, message: &str) -> CorpusRecord {
        CorpusRecord {
            file: file.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn rejects_zero_chunk_size() {
        let err = DocumentChunker::new(0, 0).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn rejects_overlap_not_smaller_than_chunk_size() {
        let err = DocumentChunker::new(100, 100).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn short_document_is_a_single_chunk() {
        let chunker = DocumentChunker::new(512, 50).unwrap();
        let chunks = chunker.chunk(["hello world"]);
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn long_document_produces_overlapping_windows() {
        let chunker = DocumentChunker::new(100, 20).unwrap();
        let text = "word ".repeat(100);
        let chunks = chunker.chunk([text.as_str()]);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100);
            assert!(!chunk.is_empty());
        }
    }

    #[test]
    fn empty_documents_are_skipped() {
        let chunker = DocumentChunker::new(100, 10).unwrap();
        let chunks = chunker.chunk(["", "   ", "real content"]);
        assert_eq!(chunks, vec!["real content".to_string()]);
    }

    #[test]
    fn boundary_trim_prefers_whitespace() {
        let chunker = DocumentChunker::new(50, 10).unwrap();
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda";
        let chunks = chunker.chunk([text]);
        assert!(chunks.len() > 1);

        // Every chunk should end on a complete word.
        let words: Vec<&str> = text.split_whitespace().collect();
        for chunk in &chunks {
            let last = chunk.split_whitespace().last().unwrap();
            assert!(words.contains(&last), "chunk ends mid-word: {chunk}");
        }
    }

    #[test]
    fn records_get_per_source_chunk_ids() {
        let chunker = DocumentChunker::new(512, 50).unwrap();
        let records = vec![
            record("a.txt", "first message"),
            record("b.txt", ""),
            record("c.txt", "third message"),
        ];

        let chunked = chunker.chunk_records(&records);
        assert_eq!(chunked.ids, vec!["a.txt::chunk-0", "c.txt::chunk-0"]);
        assert_eq!(chunked.texts.len(), 2);
        assert_eq!(chunked.sources.get("a.txt::chunk-0").unwrap(), "a.txt");
        assert_eq!(chunked.sources.get("c.txt::chunk-0").unwrap(), "c.txt");
    }

    #[test]
    fn multibyte_text_does_not_panic() {
        let chunker = DocumentChunker::new(40, 10).unwrap();
        let text = "日本語のテキストです。".repeat(20);
        let chunks = chunker.chunk([text.as_str()]);
        assert!(!chunks.is_empty());
    }
}
