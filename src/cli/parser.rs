//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// dexa-rs: ask natural-language questions about tabular and document data.
///
/// A data explorer agent: a language model drives dataset tools and a
/// retrieval index through an iterative loop and reports the answer.
#[derive(Parser, Debug)]
#[command(name = "dexa-rs")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the state database file.
    ///
    /// Defaults to `.dexa/dexa-state.db` in the current directory.
    #[arg(short, long, env = "DEXA_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// Directory holding prompt template overrides.
    #[arg(long, env = "DEXA_PROMPT_DIR", global = true)]
    pub prompt_dir: Option<PathBuf>,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the state database.
    ///
    /// Creates the database file and schema if they don't exist.
    Init {
        /// Force re-initialization (destroys existing data).
        #[arg(short, long)]
        force: bool,
    },

    /// Show store status.
    Status,

    /// Reset stored state (delete all indexes).
    Reset {
        /// Skip confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Build and persist an index from a text or CSV file.
    ///
    /// Always rebuilds: an existing index under the same name is
    /// overwritten.
    Index {
        /// Path to the source file.
        file: PathBuf,

        /// Index name (defaults to the file stem).
        #[arg(short, long)]
        name: Option<String>,

        /// Chunk size in bytes.
        #[arg(long, default_value = "2000")]
        chunk_size: usize,

        /// Overlap between chunks in bytes.
        #[arg(long, default_value = "200")]
        overlap: usize,
    },

    /// Query a persisted index and print matching chunks with scores.
    Search {
        /// The search query.
        query: String,

        /// Index name.
        #[arg(short, long, default_value = "default")]
        name: String,

        /// Number of results.
        #[arg(short = 'k', long, default_value = "4")]
        top_k: usize,
    },

    /// List persisted indexes.
    #[command(name = "list", alias = "ls")]
    ListIndexes,

    /// Delete a persisted index.
    #[command(name = "delete", alias = "rm")]
    DeleteIndex {
        /// Index name.
        name: String,

        /// Skip confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Print the built-in tool catalog.
    Tools,

    /// Ask a question about a dataset and/or an indexed document.
    Ask {
        /// The question.
        question: String,

        /// CSV file to load as the dataset.
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Persisted index to retrieve context from.
        #[arg(short, long)]
        index: Option<String>,

        /// Maximum agent iterations.
        #[arg(long, default_value = "15")]
        max_iterations: usize,

        /// Model name override.
        #[arg(long)]
        model: Option<String>,

        /// Directory for chart output files.
        #[arg(long, default_value = "charts")]
        chart_dir: PathBuf,

        /// Number of context chunks to retrieve.
        #[arg(short = 'k', long, default_value = "4")]
        top_k: usize,
    },

    /// Show or scaffold prompt template files.
    Prompts {
        /// Write default templates to the prompt directory.
        #[arg(long)]
        write: bool,

        /// Target directory (defaults to the resolved prompt directory).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

impl Cli {
    /// Returns the database path, using the default if not specified.
    #[must_use]
    pub fn get_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(crate::storage::DEFAULT_DB_PATH))
    }
}
