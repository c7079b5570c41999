//! Tool registry: name → handler dispatch with validation up front.
//!
//! Registration is configuration time and fails fast on collisions.
//! Invocation validates arguments against the tool's schema before any
//! tool code runs, and wraps tool failures without retrying - whether to
//! try again is the agent loop's call, not the registry's.

use crate::core::Observation;
use crate::error::{Error, Result, ToolError};
use crate::tools::{Tool, ToolContext};
use std::collections::BTreeMap;

/// Registry of agent-invocable tools.
///
/// # Examples
///
/// ```
/// use dexa_rs::tools::{ToolRegistry, RowCountTool};
///
/// let mut registry = ToolRegistry::new();
/// registry.register(Box::new(RowCountTool::new())).unwrap();
/// assert!(registry.contains("row_count"));
/// ```
#[derive(Default)]
pub struct ToolRegistry {
    // BTreeMap keeps catalog listings in a stable order
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Registers a tool.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Duplicate`] if a tool with the same name is
    /// already registered.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<()> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(ToolError::Duplicate { name }.into());
        }

        tracing::debug!(tool = %name, "tool registered");
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Checks whether a tool name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Checks if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Iterates over registered tools in name order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Tool> {
        self.tools.values().map(|tool| &**tool)
    }

    /// Invokes a tool by name.
    ///
    /// Validation order: unknown name first (nothing executes), then
    /// schema validation (nothing executes), then the call itself. A
    /// failing call is wrapped into [`ToolError::Execution`] and not
    /// retried.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Unknown`], [`ToolError::SchemaValidation`],
    /// or [`ToolError::Execution`].
    pub fn invoke(
        &self,
        name: &str,
        ctx: &ToolContext<'_>,
        args: &serde_json::Value,
    ) -> Result<Observation> {
        let tool = self.tools.get(name).ok_or_else(|| ToolError::Unknown {
            name: name.to_string(),
        })?;

        tool.schema().validate(name, args)?;

        tracing::debug!(tool = name, %args, "tool invoked");
        tool.call(ctx, args).map_err(|e| match e {
            // Tool errors pass through unchanged; anything else is wrapped
            Error::Tool(tool_err) => Error::Tool(tool_err),
            other => ToolError::Execution {
                tool: name.to_string(),
                reason: other.to_string(),
            }
            .into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ParamKind, ToolSchema};
    use serde_json::json;
    use std::path::Path;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Test tool that records whether it ever executed.
    struct ProbeTool {
        schema: ToolSchema,
        executed: Arc<AtomicBool>,
        fail: bool,
    }

    impl ProbeTool {
        fn new(executed: Arc<AtomicBool>, fail: bool) -> Self {
            Self {
                schema: ToolSchema::new().required("n", ParamKind::Integer, "a number"),
                executed,
                fail,
            }
        }
    }

    impl Tool for ProbeTool {
        fn name(&self) -> &'static str {
            "probe"
        }

        fn description(&self) -> &'static str {
            "test probe"
        }

        fn schema(&self) -> &ToolSchema {
            &self.schema
        }

        fn call(&self, _ctx: &ToolContext<'_>, args: &serde_json::Value) -> Result<Observation> {
            self.executed.store(true, Ordering::SeqCst);
            if self.fail {
                return Err(ToolError::Execution {
                    tool: "probe".to_string(),
                    reason: "deliberate failure".to_string(),
                }
                .into());
            }
            Ok(Observation::text(args["n"].to_string()))
        }
    }

    fn ctx() -> ToolContext<'static> {
        ToolContext::new(None, Path::new("."))
    }

    #[test]
    fn test_register_and_invoke() {
        let executed = Arc::new(AtomicBool::new(false));
        let mut registry = ToolRegistry::new();
        registry
            .register(Box::new(ProbeTool::new(executed.clone(), false)))
            .unwrap();

        let obs = registry.invoke("probe", &ctx(), &json!({"n": 7})).unwrap();
        assert_eq!(obs.render(), "7");
        assert!(executed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let executed = Arc::new(AtomicBool::new(false));
        let mut registry = ToolRegistry::new();
        registry
            .register(Box::new(ProbeTool::new(executed.clone(), false)))
            .unwrap();

        let err = registry
            .register(Box::new(ProbeTool::new(executed, false)))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Tool(ToolError::Duplicate { ref name }) if name == "probe"
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_tool_never_executes() {
        let executed = Arc::new(AtomicBool::new(false));
        let mut registry = ToolRegistry::new();
        registry
            .register(Box::new(ProbeTool::new(executed.clone(), false)))
            .unwrap();

        let err = registry.invoke("missing", &ctx(), &json!({})).unwrap_err();
        assert!(matches!(err, Error::Tool(ToolError::Unknown { .. })));
        assert!(!executed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_schema_rejection_never_executes() {
        let executed = Arc::new(AtomicBool::new(false));
        let mut registry = ToolRegistry::new();
        registry
            .register(Box::new(ProbeTool::new(executed.clone(), false)))
            .unwrap();

        let err = registry
            .invoke("probe", &ctx(), &json!({"n": "not a number"}))
            .unwrap_err();
        assert!(matches!(err, Error::Tool(ToolError::SchemaValidation { .. })));
        assert!(!executed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_execution_failure_wrapped_not_retried() {
        let executed = Arc::new(AtomicBool::new(false));
        let mut registry = ToolRegistry::new();
        registry
            .register(Box::new(ProbeTool::new(executed.clone(), true)))
            .unwrap();

        let err = registry.invoke("probe", &ctx(), &json!({"n": 1})).unwrap_err();
        assert!(matches!(err, Error::Tool(ToolError::Execution { .. })));
        assert!(executed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_iter_in_name_order() {
        let executed = Arc::new(AtomicBool::new(false));
        let mut registry = ToolRegistry::new();
        registry
            .register(Box::new(ProbeTool::new(executed, false)))
            .unwrap();
        registry
            .register(Box::new(crate::tools::RowCountTool::new()))
            .unwrap();

        let names: Vec<&str> = registry.iter().map(|tool| tool.name()).collect();
        assert_eq!(names, vec!["probe", "row_count"]);
    }

    #[test]
    fn test_empty_registry() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }
}
