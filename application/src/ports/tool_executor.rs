//! Tool Executor port
//!
//! Defines the interface for invoking capabilities by name.

use async_trait::async_trait;
use reasoning_domain::{RequestContext, ToolDefinition, ToolError, ToolOutput, ToolSpec};
use serde_json::Value;
use std::collections::HashMap;

/// Port for tool execution
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Catalog of available tools, including aliases
    fn tool_spec(&self) -> &ToolSpec;

    /// Canonical name for a tool or alias, if available
    fn resolve(&self, name: &str) -> Option<String> {
        self.tool_spec().resolve(name).map(str::to_string)
    }

    fn has_tool(&self, name: &str) -> bool {
        self.tool_spec().contains(name)
    }

    fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tool_spec().get_resolved(name)
    }

    /// Execute a tool by canonical name or alias.
    async fn execute(
        &self,
        name: &str,
        parameters: &HashMap<String, Value>,
        context: &RequestContext,
    ) -> Result<ToolOutput, ToolError>;
}
