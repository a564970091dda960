//! Per-agent tool registry
//!
//! Keeps handlers in registration order: the order is rendered into the
//! decision prompt and gives the label set a stable shape.

use crate::errors::{DispatchError, Result};
use crate::tools::types::{ToolResult, ToolSchema};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// A single deterministic tool operation
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Schema describing the tool to the classifier
    fn schema(&self) -> &ToolSchema;

    /// Run the tool on the raw request text
    ///
    /// Handlers never fail: every outcome, including collaborator failures,
    /// is folded into the returned `ToolResult`.
    async fn call(&self, input: &str) -> ToolResult;
}

/// Tool registry
#[derive(Clone, Default)]
pub struct ToolRegistry {
    /// Handlers in registration order
    tools: Vec<Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    /// Create empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; names must be unique (case-insensitive)
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) -> Result<()> {
        let name = handler.schema().name.clone();
        if self.contains(&name) {
            return Err(DispatchError::Config(format!(
                "tool '{}' registered twice",
                name
            )));
        }
        self.tools.push(handler);
        Ok(())
    }

    /// Get handler by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ToolHandler>> {
        self.tools
            .iter()
            .find(|tool| tool.schema().name.eq_ignore_ascii_case(name))
    }

    /// Check if tool exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Tool names in registration order
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|tool| tool.schema().name.clone()).collect()
    }

    /// Tool schemas in registration order
    pub fn schemas(&self) -> Vec<&ToolSchema> {
        self.tools.iter().map(|tool| tool.schema()).collect()
    }

    /// Numbered catalog for decision prompts
    pub fn render_catalog(&self) -> String {
        self.schemas()
            .iter()
            .enumerate()
            .map(|(i, schema)| format!("{}. {}", i + 1, schema.render()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Execute a tool by name, timing the call
    ///
    /// Returns `None` when no tool has that name.
    pub async fn execute(&self, name: &str, input: &str) -> Option<ToolResult> {
        let handler = self.get(name)?;
        let tool = handler.schema().name.clone();
        let effect = handler.schema().side_effect;

        debug!(tool = %tool, ?effect, input = %input, "invoking tool");
        let start = Instant::now();
        let result = handler.call(input).await.with_duration(start.elapsed());
        info!(
            tool = %tool,
            ?effect,
            status = %result.status,
            duration_ms = result.duration_ms,
            "tool finished"
        );

        Some(result)
    }

    /// Get total number of tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::types::SideEffect;

    struct EchoTool {
        schema: ToolSchema,
    }

    impl EchoTool {
        fn new(name: &str, effect: SideEffect) -> Arc<dyn ToolHandler> {
            Arc::new(Self {
                schema: ToolSchema::new(name, "echo input", "any text", effect),
            })
        }
    }

    #[async_trait]
    impl ToolHandler for EchoTool {
        fn schema(&self) -> &ToolSchema {
            &self.schema
        }

        async fn call(&self, input: &str) -> ToolResult {
            ToolResult::success(&self.schema.name, input)
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool::new("Reader", SideEffect::Read)).unwrap();
        registry.register(EchoTool::new("Writer", SideEffect::Write)).unwrap();
        registry.register(EchoTool::new("Notifier", SideEffect::Notify)).unwrap();
        registry
    }

    #[test]
    fn test_registration_order_is_kept() {
        let registry = registry();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.tool_names(), vec!["Reader", "Writer", "Notifier"]);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = registry();
        let result = registry.register(EchoTool::new("reader", SideEffect::Read));
        assert!(matches!(result, Err(DispatchError::Config(_))));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = registry();
        assert!(registry.contains("WRITER"));
        assert!(!registry.contains("Deleter"));
    }

    #[test]
    fn test_catalog_is_numbered() {
        let catalog = registry().render_catalog();
        assert!(catalog.starts_with("1. Reader:"));
        assert!(catalog.contains("3. Notifier:"));
    }

    #[tokio::test]
    async fn test_execute() {
        let registry = registry();
        let result = registry.execute("writer", "hello").await.unwrap();
        assert_eq!(result.tool, "Writer");
        assert_eq!(result.message, "hello");

        assert!(registry.execute("missing", "hello").await.is_none());
    }
}
