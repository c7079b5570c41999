//! Hash-based embedder.
//!
//! Produces deterministic pseudo-embeddings from lexical content. Similar
//! text clusters together through word and word-bigram overlap; there is no
//! learned semantic model behind it.

use crate::Result;
use crate::embedding::Embedder;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Deterministic lexical embedder.
///
/// Combines two hashed signals, normalized to unit length for cosine
/// similarity:
/// - single words (primary, vocabulary capture)
/// - word bigrams (secondary, phrase capture)
///
/// Identical input always yields an identical vector, which is what the
/// index's persist/load round-trip guarantee relies on.
///
/// # Examples
///
/// ```
/// use dexa_rs::embedding::{Embedder, HashEmbedder, DEFAULT_DIMENSIONS};
///
/// let embedder = HashEmbedder::new(DEFAULT_DIMENSIONS);
/// let a = embedder.embed("hello world").unwrap();
/// let b = embedder.embed("hello world").unwrap();
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    /// Creates a hash embedder with the given dimensions.
    #[must_use]
    pub const fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// Hashes a string to a u64 value.
    fn hash_token(token: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        hasher.finish()
    }

    /// Scatters one hashed token into the vector.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn scatter(vector: &mut [f32], hash: u64, weight: f32) {
        let idx = (hash as usize) % vector.len();
        let sign = if (hash >> 32) & 1 == 0 { 1.0 } else { -1.0 };
        let magnitude = 1.0 + ((hash >> 40) & 0x7F) as f32 / 127.0;
        vector[idx] += sign * magnitude * weight;
    }

    /// Generates a pseudo-embedding from text.
    fn generate(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        // Lowercase and strip punctuation down to word tokens
        let normalized: String = text
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c.is_whitespace() {
                    c.to_ascii_lowercase()
                } else {
                    ' '
                }
            })
            .collect();
        let words: Vec<&str> = normalized.split_whitespace().collect();

        // Word signal
        for word in &words {
            Self::scatter(&mut vector, Self::hash_token(word), 1.0);
        }

        // Bigram signal
        for pair in words.windows(2) {
            let bigram = format!("{} {}", pair[0], pair[1]);
            Self::scatter(&mut vector, Self::hash_token(&bigram), 0.5);
        }

        // Normalize to unit length for cosine similarity
        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for val in &mut vector {
                *val /= magnitude;
            }
        }

        vector
    }
}

impl Embedder for HashEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.generate(text))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        use rayon::prelude::*;

        Ok(texts.par_iter().map(|text| self.generate(text)).collect())
    }
}
