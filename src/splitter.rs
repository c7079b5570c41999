//! Text splitting into retrieval chunks.
//!
//! Splits raw text blocks into fixed-size chunks with optional overlap,
//! preferring sentence boundaries so retrieval units read whole. Respects
//! UTF-8 character boundaries throughout.

use crate::core::Chunk;
use crate::error::{Result, SplitError};
use unicode_segmentation::UnicodeSegmentation;

/// Default chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 2000;

/// Default overlap between consecutive chunks.
pub const DEFAULT_OVERLAP: usize = 200;

/// Maximum allowed chunk size.
pub const MAX_CHUNK_SIZE: usize = 100_000;

/// Fixed-size text splitter with sentence alignment.
///
/// Output is deterministic for the same input. Chunks carry their byte
/// offset into the source, so with zero overlap they reassemble into the
/// original text.
///
/// # Examples
///
/// ```
/// use dexa_rs::splitter::TextSplitter;
///
/// let splitter = TextSplitter::with_size(100);
/// let text = "Hello, world! ".repeat(20);
/// let chunks = splitter.split("doc", &text).unwrap();
/// assert!(!chunks.is_empty());
/// for chunk in &chunks {
///     assert!(chunk.len() <= 100);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TextSplitter {
    /// Target chunk size in bytes.
    chunk_size: usize,
    /// Overlap between consecutive chunks.
    overlap: usize,
    /// Whether to align chunk boundaries to sentence starts.
    sentence_aware: bool,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSplitter {
    /// Creates a splitter with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
            sentence_aware: true,
        }
    }

    /// Creates a splitter with a custom chunk size and no overlap.
    #[must_use]
    pub const fn with_size(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            overlap: 0,
            sentence_aware: true,
        }
    }

    /// Creates a splitter with custom size and overlap.
    #[must_use]
    pub const fn with_size_and_overlap(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
            sentence_aware: true,
        }
    }

    /// Sets whether to align chunk boundaries to sentence starts.
    #[must_use]
    pub const fn sentence_aware(mut self, enabled: bool) -> Self {
        self.sentence_aware = enabled;
        self
    }

    /// Splits text into chunks tagged with the given source identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid (zero chunk size,
    /// oversized chunk size, or overlap not smaller than the chunk size).
    pub fn split(&self, source: &str, text: &str) -> Result<Vec<Chunk>> {
        if self.chunk_size == 0 {
            return Err(SplitError::InvalidConfig {
                reason: "chunk_size must be > 0".to_string(),
            }
            .into());
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(SplitError::ChunkTooLarge {
                size: self.chunk_size,
                max: MAX_CHUNK_SIZE,
            }
            .into());
        }
        if self.overlap >= self.chunk_size {
            return Err(SplitError::OverlapTooLarge {
                overlap: self.overlap,
                size: self.chunk_size,
            }
            .into());
        }

        if text.is_empty() {
            return Ok(vec![]);
        }

        if text.len() <= self.chunk_size {
            return Ok(vec![Chunk::new(source, 0, text.to_string())]);
        }

        let sentence_starts = if self.sentence_aware {
            sentence_starts(text)
        } else {
            Vec::new()
        };

        let mut chunks = Vec::new();
        let mut start = 0;
        let mut last_start = 0;

        while start < text.len() {
            let target_end = (start + self.chunk_size).min(text.len());
            let end = if target_end >= text.len() {
                text.len()
            } else {
                self.find_boundary(text, &sentence_starts, start, target_end)
            };

            // Guarantee forward progress even when no boundary qualifies
            // (e.g. a multi-byte character spanning the whole window)
            let end = if end <= start {
                next_char_boundary(text, (start + self.chunk_size).min(text.len()))
            } else {
                end
            };

            chunks.push(Chunk::new(source, start, text[start..end].to_string()));

            if end >= text.len() {
                break;
            }

            start = if self.overlap > 0 {
                char_boundary(text, end.saturating_sub(self.overlap))
            } else {
                end
            };

            // Overlap must never move the window backwards
            if start <= last_start {
                start = end;
            }
            last_start = start;
        }

        Ok(chunks)
    }

    /// Finds a chunk end at or before `target`, preferring the start of a
    /// sentence within the back half of the chunk.
    fn find_boundary(
        &self,
        text: &str,
        sentence_starts: &[usize],
        start: usize,
        target: usize,
    ) -> usize {
        let pos = char_boundary(text, target);

        if !self.sentence_aware || pos <= start {
            return pos;
        }

        // Greatest sentence start at or before the target position
        let idx = sentence_starts.partition_point(|&s| s <= pos);
        let candidate = idx.checked_sub(1).map(|i| sentence_starts[i]);

        match candidate {
            // Splitting more than half a chunk early is worse than
            // splitting mid-sentence
            Some(s) if s > start && s >= target.saturating_sub(self.chunk_size / 2) => s,
            _ => pos,
        }
    }
}

/// Byte offsets where sentences begin, per UAX#29 boundaries.
fn sentence_starts(text: &str) -> Vec<usize> {
    text.split_sentence_bounds()
        .scan(0usize, |offset, sentence| {
            let start = *offset;
            *offset += sentence.len();
            Some(start)
        })
        .collect()
}

/// Advances a position to a valid UTF-8 character boundary at or after it.
fn next_char_boundary(s: &str, pos: usize) -> usize {
    if pos >= s.len() {
        return s.len();
    }
    let mut boundary = pos;
    while !s.is_char_boundary(boundary) && boundary < s.len() {
        boundary += 1;
    }
    boundary
}

/// Clamps a position to a valid UTF-8 character boundary at or before it.
fn char_boundary(s: &str, pos: usize) -> usize {
    if pos >= s.len() {
        return s.len();
    }
    let mut boundary = pos;
    while !s.is_char_boundary(boundary) && boundary > 0 {
        boundary -= 1;
    }
    boundary
}
