//! Error types for dexa-rs operations.
//!
//! This module provides a comprehensive error hierarchy using `thiserror` for
//! all agent, index, tool, storage, and CLI operations.

use thiserror::Error;

/// Result type alias for dexa-rs operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for dexa-rs operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Embedding index errors (build, query, persistence).
    #[error("index error: {0}")]
    Index(#[from] IndexError),

    /// Tool registry and tool execution errors.
    #[error("tool error: {0}")]
    Tool(#[from] ToolError),

    /// Agent loop errors.
    #[error("agent error: {0}")]
    Agent(#[from] AgentError),

    /// Text splitting errors.
    #[error("split error: {0}")]
    Split(#[from] SplitError),

    /// Storage-related errors (database operations).
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O errors (file operations).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

/// Embedding-index-specific errors.
#[derive(Error, Debug)]
pub enum IndexError {
    /// Embedding generation failed for a chunk. The whole build aborts;
    /// no partial index is kept.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// Query against an index with zero entries.
    #[error("index is empty")]
    EmptyIndex,

    /// Embedder produced a vector of unexpected length.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimensions declared by the embedder.
        expected: usize,
        /// Dimensions actually produced.
        actual: usize,
    },

    /// No persisted index under the given name.
    #[error("index not found: {name}")]
    NotFound {
        /// Index name that was not found.
        name: String,
    },

    /// Persisted snapshot could not be decoded.
    #[error("index snapshot corrupt: {0}")]
    Corrupt(String),
}

/// Tool registry and execution errors.
#[derive(Error, Debug)]
pub enum ToolError {
    /// A tool with this name is already registered.
    #[error("tool already registered: {name}")]
    Duplicate {
        /// The conflicting tool name.
        name: String,
    },

    /// No tool registered under this name. Nothing was executed.
    #[error("unknown tool: {name}")]
    Unknown {
        /// The unrecognized tool name.
        name: String,
    },

    /// Arguments did not match the tool's schema. Nothing was executed.
    #[error("invalid arguments for {tool}: {reason}")]
    SchemaValidation {
        /// Tool whose schema rejected the arguments.
        tool: String,
        /// Why validation failed.
        reason: String,
    },

    /// The tool itself failed. Not retried; the agent loop records this
    /// as an observation and lets the model decide the next action.
    #[error("tool {tool} failed: {reason}")]
    Execution {
        /// Tool that failed.
        tool: String,
        /// Underlying failure.
        reason: String,
    },
}

/// Agent-loop-specific errors.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Model output could not be parsed into an action after the single
    /// repair attempt. Terminal for the transcript.
    #[error("malformed action after repair attempt: {raw}")]
    MalformedAction {
        /// The raw model output that failed to parse.
        raw: String,
    },

    /// The iteration bound was exhausted before a final answer.
    #[error("iteration limit of {limit} exceeded")]
    IterationLimit {
        /// The configured maximum iterations.
        limit: usize,
    },

    /// The model provider call failed (transport, auth, serialization).
    #[error("provider error: {0}")]
    Provider(String),
}

/// Text-splitting errors.
#[derive(Error, Debug)]
pub enum SplitError {
    /// Invalid splitter configuration.
    #[error("invalid split configuration: {reason}")]
    InvalidConfig {
        /// Reason the configuration is invalid.
        reason: String,
    },

    /// Chunk size exceeds the maximum allowed.
    #[error("chunk size {size} exceeds maximum {max}")]
    ChunkTooLarge {
        /// Requested chunk size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// Overlap must be smaller than the chunk size.
    #[error("overlap {overlap} must be less than chunk size {size}")]
    OverlapTooLarge {
        /// Overlap size.
        overlap: usize,
        /// Chunk size.
        size: usize,
    },
}

/// Storage-specific errors for database operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection or query error.
    #[error("database error: {0}")]
    Database(String),

    /// Storage not initialized (init command not run).
    #[error("store not initialized. Run: dexa-rs init")]
    NotInitialized,

    /// No blob stored under the given key.
    #[error("key not found: {key}")]
    KeyNotFound {
        /// The missing key.
        key: String,
    },

    /// Schema migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// I/O-specific errors for file operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found.
        path: String,
    },

    /// Failed to read file.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to write file.
    #[error("failed to write file: {path}: {reason}")]
    WriteFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// CSV decoding error.
    #[error("failed to decode CSV: {path}: {reason}")]
    Csv {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Generic I/O error wrapper.
    #[error("I/O error: {0}")]
    Generic(String),
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Missing required argument.
    #[error("missing required argument: {0}")]
    MissingArgument(String),

    /// Command execution failed.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),

    /// User cancelled operation.
    #[error("operation cancelled by user")]
    Cancelled,

    /// `ask` was invoked without a dataset or index to work against.
    #[error("nothing to ask about: provide --file and/or --index")]
    NoInput,
}

// Implement From traits for standard library and dependency errors

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(StorageError::Database(err.to_string()))
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for IndexError {
    fn from(err: serde_json::Error) -> Self {
        Self::Corrupt(err.to_string())
    }
}
