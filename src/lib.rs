//! # dexa-rs
//!
//! Data explorer agent: ask natural-language questions about tabular and
//! document data and get computed answers, charts, or retrieval-augmented
//! answers.
//!
//! A language model drives an iterative tool loop: it proposes an action
//! (a dataset computation, a chart, or a final answer), observes the
//! result, and decides the next step. Documents are served through an
//! embedding index with fixed-k retrieval.
//!
//! ## Features
//!
//! - **Agent Loop**: bounded, repair-once action loop over a model provider
//! - **Tool Registry**: schema-validated dataset tools (stats, quality, charts)
//! - **Embedding Index**: deterministic build/query with `SQLite` persistence
//! - **Sessions**: explicit per-interaction state, shareable read-only index

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![warn(unsafe_code)]

pub mod agent;
pub mod cli;
pub mod core;
pub mod embedding;
pub mod error;
pub mod index;
pub mod io;
pub mod session;
pub mod splitter;
pub mod storage;
pub mod tools;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use core::{Chunk, Dataset, Observation, Outcome, Scalar, Transcript, Turn};

// Re-export agent types
pub use agent::{AgentLoop, LoopConfig, ModelProvider, PromptSet, ScriptedProvider};

// Re-export index types
pub use index::{EmbeddingIndex, Retriever};

// Re-export embedding types
pub use embedding::{DEFAULT_DIMENSIONS, Embedder, HashEmbedder, cosine_similarity, create_embedder};

// Re-export tool types
pub use tools::{Tool, ToolRegistry, ToolSchema, register_builtin_tools};

// Re-export session type
pub use session::Session;

// Re-export storage types
pub use storage::{BlobStore, DEFAULT_DB_PATH, SqliteStore};

// Re-export splitter
pub use splitter::TextSplitter;

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
