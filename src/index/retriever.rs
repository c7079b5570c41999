//! Fixed-k retrieval over a shared index.
//!
//! A retriever pairs a read-only index with an embedder and a fixed result
//! count. It drops scores: callers get chunks, ranked best first.

use crate::core::Chunk;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::index::{DEFAULT_TOP_K, EmbeddingIndex};
use std::sync::Arc;

/// Retrieves the top-k most relevant chunks for a query.
///
/// The index is shared behind an `Arc`: it is built once, immutable for
/// the lifetime of all concurrent readers, so retrieval needs no locking.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use dexa_rs::core::Chunk;
/// use dexa_rs::embedding::{HashEmbedder, DEFAULT_DIMENSIONS};
/// use dexa_rs::index::{EmbeddingIndex, Retriever};
///
/// let embedder = HashEmbedder::new(DEFAULT_DIMENSIONS);
/// let chunks = vec![Chunk::new("doc", 0, "glucose levels by outcome".to_string())];
/// let index = EmbeddingIndex::build(&embedder, chunks).unwrap();
/// let retriever = Retriever::new(Arc::new(index), Arc::new(embedder), 1);
/// let hits = retriever.retrieve("glucose").unwrap();
/// assert_eq!(hits.len(), 1);
/// ```
pub struct Retriever {
    index: Arc<EmbeddingIndex>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl Retriever {
    /// Creates a retriever over a shared index with a fixed k.
    #[must_use]
    pub fn new(index: Arc<EmbeddingIndex>, embedder: Arc<dyn Embedder>, top_k: usize) -> Self {
        Self {
            index,
            embedder,
            top_k,
        }
    }

    /// Creates a retriever with the default k.
    #[must_use]
    pub fn with_default_k(index: Arc<EmbeddingIndex>, embedder: Arc<dyn Embedder>) -> Self {
        Self::new(index, embedder, DEFAULT_TOP_K)
    }

    /// Returns the configured result count.
    #[must_use]
    pub const fn top_k(&self) -> usize {
        self.top_k
    }

    /// Returns the number of entries in the underlying index.
    #[must_use]
    pub fn index_len(&self) -> usize {
        self.index.len()
    }

    /// Returns up to `top_k` chunks relevant to the query, best first.
    /// Scores are dropped; ordering is the only signal passed on.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::error::IndexError::EmptyIndex`] from the
    /// underlying query, and any embedding failure.
    pub fn retrieve(&self, query: &str) -> Result<Vec<&Chunk>> {
        let hits = self.index.query(self.embedder.as_ref(), query, self.top_k)?;
        Ok(hits.into_iter().map(|(chunk, _)| chunk).collect())
    }
}
