//! Chunk representation.
//!
//! A chunk is a bounded span of source text treated as an atomic retrieval
//! unit. Chunks are immutable once created: the splitter produces them, the
//! index embeds and serves them, nothing rewrites them.

use serde::{Deserialize, Serialize};

/// An immutable span of source text.
///
/// # Examples
///
/// ```
/// use dexa_rs::core::Chunk;
///
/// let chunk = Chunk::new("report.txt", 0, "Hello, world!".to_string());
/// assert_eq!(chunk.len(), 13);
/// assert_eq!(chunk.source(), "report.txt");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Identifier of the source document.
    source: String,

    /// Byte offset of this span within the source.
    offset: usize,

    /// The span text.
    text: String,
}

impl Chunk {
    /// Creates a new chunk.
    ///
    /// # Arguments
    ///
    /// * `source` - Identifier of the source document (file name, buffer name).
    /// * `offset` - Byte offset of the span within the source.
    /// * `text` - The span text.
    #[must_use]
    pub fn new(source: &str, offset: usize, text: String) -> Self {
        Self {
            source: source.to_string(),
            offset,
            text,
        }
    }

    /// Returns the source identifier.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the byte offset within the source.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the span text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the span length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Checks if the span is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns a preview of the text (first `max_len` bytes, clamped to a
    /// character boundary).
    #[must_use]
    pub fn preview(&self, max_len: usize) -> &str {
        if self.text.len() <= max_len {
            &self.text
        } else {
            let end = find_char_boundary(&self.text, max_len);
            &self.text[..end]
        }
    }
}

/// Finds a valid UTF-8 character boundary at or before the given position.
fn find_char_boundary(s: &str, pos: usize) -> usize {
    if pos >= s.len() {
        return s.len();
    }
    let mut boundary = pos;
    while !s.is_char_boundary(boundary) && boundary > 0 {
        boundary -= 1;
    }
    boundary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_new() {
        let chunk = Chunk::new("doc", 10, "Hello".to_string());
        assert_eq!(chunk.source(), "doc");
        assert_eq!(chunk.offset(), 10);
        assert_eq!(chunk.text(), "Hello");
        assert_eq!(chunk.len(), 5);
    }

    #[test]
    fn test_chunk_empty() {
        let chunk = Chunk::new("doc", 0, String::new());
        assert!(chunk.is_empty());
        assert_eq!(chunk.len(), 0);
    }

    #[test]
    fn test_chunk_preview() {
        let chunk = Chunk::new("doc", 0, "Hello, world!".to_string());
        assert_eq!(chunk.preview(5), "Hello");
        assert_eq!(chunk.preview(100), "Hello, world!");
    }

    #[test]
    fn test_chunk_preview_unicode_boundary() {
        let chunk = Chunk::new("doc", 0, "a世界".to_string());
        // Byte 2 falls inside the first multi-byte character
        let preview = chunk.preview(2);
        assert_eq!(preview, "a");
    }

    #[test]
    fn test_chunk_serialization() {
        let chunk = Chunk::new("doc", 3, "test".to_string());
        let json = serde_json::to_string(&chunk).unwrap();
        let back: Chunk = serde_json::from_str(&json).unwrap();
        assert_eq!(back, chunk);
    }
}
