//! CLI layer for dexa-rs.
//!
//! Provides the command-line interface using clap, with commands for
//! initializing the store, building and querying indexes, and running
//! the agent loop.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
