//! Embedding generation for the retrieval index.
//!
//! The [`Embedder`] trait is the seam between the index and whatever
//! produces vectors. The built-in [`HashEmbedder`] is deterministic and
//! self-contained (lexical overlap, not learned semantics); a model-backed
//! embedder plugs in behind the same trait.

mod hashed;

pub use hashed::HashEmbedder;

use crate::Result;

/// Default embedding dimensions for the built-in hash embedder.
///
/// This is the authoritative source for embedding dimensions across the
/// codebase; the index validates every vector against the embedder's
/// declared dimensions at build time.
pub const DEFAULT_DIMENSIONS: usize = 256;

/// Trait for embedding generators.
///
/// Implementations must be thread-safe (`Send + Sync`) to support parallel
/// embedding during index builds.
///
/// # Examples
///
/// ```
/// use dexa_rs::embedding::{Embedder, HashEmbedder, DEFAULT_DIMENSIONS};
///
/// let embedder = HashEmbedder::new(DEFAULT_DIMENSIONS);
/// let embedding = embedder.embed("Hello, world!").unwrap();
/// assert_eq!(embedding.len(), DEFAULT_DIMENSIONS);
/// ```
pub trait Embedder: Send + Sync {
    /// Returns the embedding dimensions.
    fn dimensions(&self) -> usize;

    /// Generates an embedding for the given text.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding generation fails.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generates embeddings for multiple texts.
    ///
    /// The default implementation calls `embed` for each text sequentially.
    /// Implementations may override this for batch optimization.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding generation fails for any text.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Creates the default embedder.
///
/// # Errors
///
/// Never fails for the hash embedder; the `Result` keeps the signature
/// stable for fallible embedder backends.
pub fn create_embedder() -> Result<Box<dyn Embedder>> {
    Ok(Box::new(HashEmbedder::new(DEFAULT_DIMENSIONS)))
}

/// Computes cosine similarity between two embedding vectors.
///
/// Returns a value between -1.0 (opposite) and 1.0 (identical).
/// For normalized vectors (L2 norm = 1), this is equivalent to the dot
/// product. Returns 0.0 if the vectors have different lengths or zero
/// magnitude.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}
