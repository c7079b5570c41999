//! Core domain models for dexa-rs.
//!
//! This module contains the fundamental data structures used throughout the
//! system: datasets, chunks, observations, and transcripts. These are pure
//! domain models with no I/O dependencies.

pub mod chunk;
pub mod dataset;
pub mod observation;
pub mod transcript;

pub use chunk::Chunk;
pub use dataset::{Dataset, Scalar};
pub use observation::Observation;
pub use transcript::{ActionRecord, Outcome, Transcript, Turn};
