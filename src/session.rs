//! Per-interaction session state.
//!
//! A session is the explicit object carrying everything one user
//! interaction works against: the dataset, the tool registry, an optional
//! retriever, the chart output directory, and the transcripts recorded so
//! far. There is no process-wide singleton; callers own their sessions
//! and pass them into each run.

use crate::core::{Dataset, Transcript};
use crate::error::Result;
use crate::index::Retriever;
use crate::tools::{ToolContext, ToolRegistry, register_builtin_tools};
use std::path::{Path, PathBuf};

/// Default directory for chart output files.
pub const DEFAULT_CHART_DIR: &str = "charts";

/// State for one conversational session.
///
/// Sessions are independent: two sessions share nothing except a
/// read-only index behind the retriever's `Arc`. One session is
/// single-threaded and cooperative; the loop borrows it for the duration
/// of a run.
///
/// # Examples
///
/// ```
/// use dexa_rs::core::{Dataset, Scalar};
/// use dexa_rs::session::Session;
///
/// let dataset = Dataset::new(
///     vec!["a".to_string()],
///     vec![vec![Scalar::Int(1)]],
/// ).unwrap();
///
/// let session = Session::new()
///     .with_builtin_tools().unwrap()
///     .with_dataset(dataset);
/// assert!(session.dataset().is_some());
/// ```
pub struct Session {
    dataset: Option<Dataset>,
    registry: ToolRegistry,
    retriever: Option<Retriever>,
    chart_dir: PathBuf,
    transcripts: Vec<Transcript>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates an empty session with no tools registered.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dataset: None,
            registry: ToolRegistry::new(),
            retriever: None,
            chart_dir: PathBuf::from(DEFAULT_CHART_DIR),
            transcripts: Vec::new(),
        }
    }

    /// Registers the built-in dataset tools.
    ///
    /// # Errors
    ///
    /// Returns an error if any built-in name is already registered.
    pub fn with_builtin_tools(mut self) -> Result<Self> {
        register_builtin_tools(&mut self.registry)?;
        Ok(self)
    }

    /// Attaches a dataset.
    #[must_use]
    pub fn with_dataset(mut self, dataset: Dataset) -> Self {
        self.dataset = Some(dataset);
        self
    }

    /// Attaches a retriever.
    #[must_use]
    pub fn with_retriever(mut self, retriever: Retriever) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Sets the chart output directory.
    #[must_use]
    pub fn with_chart_dir(mut self, dir: &Path) -> Self {
        self.chart_dir = dir.to_path_buf();
        self
    }

    /// Returns the dataset, if one is attached.
    #[must_use]
    pub const fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    /// Returns the tool registry.
    #[must_use]
    pub const fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Returns a mutable tool registry for custom registrations.
    pub const fn registry_mut(&mut self) -> &mut ToolRegistry {
        &mut self.registry
    }

    /// Returns the retriever, if one is attached.
    #[must_use]
    pub const fn retriever(&self) -> Option<&Retriever> {
        self.retriever.as_ref()
    }

    /// Returns the chart output directory.
    #[must_use]
    pub fn chart_dir(&self) -> &Path {
        &self.chart_dir
    }

    /// Builds the tool context for one invocation.
    #[must_use]
    pub fn tool_context(&self) -> ToolContext<'_> {
        ToolContext::new(self.dataset.as_ref(), &self.chart_dir)
    }

    /// Records a finished transcript.
    pub fn record(&mut self, transcript: Transcript) {
        self.transcripts.push(transcript);
    }

    /// Returns all recorded transcripts in order.
    #[must_use]
    pub fn transcripts(&self) -> &[Transcript] {
        &self.transcripts
    }

    /// Returns the most recently recorded transcript.
    #[must_use]
    pub fn last_transcript(&self) -> Option<&Transcript> {
        self.transcripts.last()
    }
}
