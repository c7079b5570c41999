//! Tools the agent may invoke.
//!
//! A tool is a named, schema-validated operation over the session's
//! dataset. Tools are registered once at startup and never mutated; their
//! side effects are confined to what the call itself declares (the chart
//! tool writes a file, everything else is pure).

pub mod chart;
pub mod dataset;
pub mod registry;
pub mod schema;

pub use chart::HistogramTool;
pub use dataset::{
    ColumnsTool, CorrelationTool, DescribeTool, HeadTool, MissingValuesTool, RowCountTool,
    ValueCountsTool,
};
pub use registry::ToolRegistry;
pub use schema::{ParamKind, ParamSpec, ToolSchema};

use crate::core::{Dataset, Observation};
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Everything a tool call may observe.
///
/// Tools receive the dataset by shared reference and may not mutate it;
/// the chart directory is where file-writing tools place their output.
pub struct ToolContext<'a> {
    /// The dataset under analysis, if the session has one.
    pub dataset: Option<&'a Dataset>,

    /// Directory for chart output files.
    pub chart_dir: PathBuf,
}

impl<'a> ToolContext<'a> {
    /// Creates a context over a dataset.
    #[must_use]
    pub fn new(dataset: Option<&'a Dataset>, chart_dir: &Path) -> Self {
        Self {
            dataset,
            chart_dir: chart_dir.to_path_buf(),
        }
    }

    /// Returns the dataset or a tool-facing error message.
    ///
    /// # Errors
    ///
    /// Returns an execution error if the session carries no dataset.
    pub fn require_dataset(&self, tool: &str) -> Result<&'a Dataset> {
        self.dataset.ok_or_else(|| {
            crate::error::ToolError::Execution {
                tool: tool.to_string(),
                reason: "no dataset loaded in this session".to_string(),
            }
            .into()
        })
    }
}

/// Trait for agent-invocable tools.
///
/// Implementations must be `Send + Sync`; the registry owns them behind
/// trait objects for the lifetime of the process.
pub trait Tool: Send + Sync {
    /// Returns the tool name (the string the model calls it by).
    fn name(&self) -> &'static str;

    /// Returns a one-line description for the tool catalog.
    fn description(&self) -> &'static str;

    /// Returns the input schema.
    fn schema(&self) -> &ToolSchema;

    /// Executes the tool against validated arguments.
    ///
    /// The registry validates `args` against [`Tool::schema`] before this
    /// is called, so implementations may assume present-and-typed
    /// parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if execution fails; the registry wraps it into
    /// [`crate::error::ToolError::Execution`].
    fn call(&self, ctx: &ToolContext<'_>, args: &serde_json::Value) -> Result<Observation>;
}

/// Registers the built-in dataset tools on a registry.
///
/// # Errors
///
/// Returns [`crate::error::ToolError::Duplicate`] if any name is already
/// taken.
pub fn register_builtin_tools(registry: &mut ToolRegistry) -> Result<()> {
    registry.register(Box::new(RowCountTool::new()))?;
    registry.register(Box::new(ColumnsTool::new()))?;
    registry.register(Box::new(HeadTool::new()))?;
    registry.register(Box::new(DescribeTool::new()))?;
    registry.register(Box::new(ValueCountsTool::new()))?;
    registry.register(Box::new(MissingValuesTool::new()))?;
    registry.register(Box::new(CorrelationTool::new()))?;
    registry.register(Box::new(HistogramTool::new()))?;
    Ok(())
}
