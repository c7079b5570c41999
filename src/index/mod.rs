//! Embedding index: build, query, persist, load.
//!
//! The index is an append-only collection of (vector, chunk) pairs built in
//! one shot and read-only afterwards. Queries rank by cosine similarity;
//! persistence round-trips through the blob store byte-for-byte, so a
//! reloaded index answers every query identically to the original.

pub mod retriever;

pub use retriever::Retriever;

use crate::core::Chunk;
use crate::embedding::{Embedder, cosine_similarity};
use crate::error::{IndexError, Result, StorageError};
use crate::storage::BlobStore;
use serde::{Deserialize, Serialize};

/// Default number of chunks returned per query.
pub const DEFAULT_TOP_K: usize = 4;

/// Snapshot format version for persisted indexes.
const SNAPSHOT_VERSION: u32 = 1;

/// One indexed entry: a vector and the chunk it represents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct IndexEntry {
    vector: Vec<f32>,
    chunk: Chunk,
}

/// Serialized form of an index.
#[derive(Debug, Serialize, Deserialize)]
struct IndexSnapshot {
    version: u32,
    dimensions: usize,
    entries: Vec<IndexEntry>,
}

/// An in-memory embedding index over text chunks.
///
/// Built once from a chunk set, immutable afterwards. Multiple sessions
/// may share one index behind an `Arc` without locking; only the build
/// phase needs exclusive access, and `build` returns a fresh value so a
/// partially-built index is never observable.
///
/// # Examples
///
/// ```
/// use dexa_rs::core::Chunk;
/// use dexa_rs::embedding::{HashEmbedder, DEFAULT_DIMENSIONS};
/// use dexa_rs::index::EmbeddingIndex;
///
/// let embedder = HashEmbedder::new(DEFAULT_DIMENSIONS);
/// let chunks = vec![Chunk::new("doc", 0, "hello world".to_string())];
/// let index = EmbeddingIndex::build(&embedder, chunks).unwrap();
/// let hits = index.query(&embedder, "hello", 1).unwrap();
/// assert_eq!(hits[0].0.text(), "hello world");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingIndex {
    dimensions: usize,
    entries: Vec<IndexEntry>,
}

impl EmbeddingIndex {
    /// Builds an index by embedding every chunk.
    ///
    /// The whole build aborts on the first embedding failure; no partial
    /// index survives. An empty chunk set yields a valid size-0 index
    /// (which every query then rejects).
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Embedding`] if any embedding call fails, or
    /// [`IndexError::DimensionMismatch`] if the embedder produces a vector
    /// of unexpected length.
    pub fn build(embedder: &dyn Embedder, chunks: Vec<Chunk>) -> Result<Self> {
        let dimensions = embedder.dimensions();

        let texts: Vec<&str> = chunks.iter().map(Chunk::text).collect();
        let vectors = embedder
            .embed_batch(&texts)
            .map_err(|e| IndexError::Embedding(e.to_string()))?;

        for vector in &vectors {
            if vector.len() != dimensions {
                return Err(IndexError::DimensionMismatch {
                    expected: dimensions,
                    actual: vector.len(),
                }
                .into());
            }
        }

        let entries = vectors
            .into_iter()
            .zip(chunks)
            .map(|(vector, chunk)| IndexEntry { vector, chunk })
            .collect::<Vec<_>>();

        tracing::debug!(entries = entries.len(), dimensions, "index built");
        Ok(Self {
            dimensions,
            entries,
        })
    }

    /// Returns up to `k` nearest chunks with their similarity scores,
    /// best first. Ties keep the original chunk order (stable sort).
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::EmptyIndex`] if the index has zero entries,
    /// or an embedding error if the query text cannot be embedded.
    pub fn query(
        &self,
        embedder: &dyn Embedder,
        text: &str,
        k: usize,
    ) -> Result<Vec<(&Chunk, f32)>> {
        if self.entries.is_empty() {
            return Err(IndexError::EmptyIndex.into());
        }

        let query_vector = embedder
            .embed(text)
            .map_err(|e| IndexError::Embedding(e.to_string()))?;

        let mut scored: Vec<(&Chunk, f32)> = self
            .entries
            .iter()
            .map(|entry| (&entry.chunk, cosine_similarity(&query_vector, &entry.vector)))
            .collect();

        // Stable sort preserves build order among equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        Ok(scored)
    }

    /// Returns the number of indexed entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if the index has zero entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the embedding dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Persists the index under a name, replacing any previous snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the store write fails.
    pub fn persist(&self, store: &mut dyn BlobStore, name: &str) -> Result<()> {
        let snapshot = IndexSnapshot {
            version: SNAPSHOT_VERSION,
            dimensions: self.dimensions,
            entries: self.entries.clone(),
        };

        let bytes = serde_json::to_vec(&snapshot).map_err(StorageError::from)?;
        store.put(&index_key(name), &bytes)?;

        tracing::info!(name, entries = self.entries.len(), "index persisted");
        Ok(())
    }

    /// Loads a persisted index by name.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::NotFound`] if no snapshot exists under the
    /// name, or [`IndexError::Corrupt`] if the snapshot cannot be decoded.
    pub fn load(store: &dyn BlobStore, name: &str) -> Result<Self> {
        let bytes = store
            .get(&index_key(name))?
            .ok_or_else(|| IndexError::NotFound {
                name: name.to_string(),
            })?;

        let snapshot: IndexSnapshot =
            serde_json::from_slice(&bytes).map_err(IndexError::from)?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(IndexError::Corrupt(format!(
                "unsupported snapshot version {}",
                snapshot.version
            ))
            .into());
        }

        tracing::debug!(name, entries = snapshot.entries.len(), "index loaded");
        Ok(Self {
            dimensions: snapshot.dimensions,
            entries: snapshot.entries,
        })
    }
}

/// Store key for a named index.
#[must_use]
pub fn index_key(name: &str) -> String {
    format!("index/{name}")
}

/// Strips the index key prefix, if present.
#[must_use]
pub fn index_name(key: &str) -> Option<&str> {
    key.strip_prefix("index/")
}
