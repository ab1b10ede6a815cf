//! Capability execution contract.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

use super::entities::ToolDefinition;
use super::value_objects::{ToolError, ToolOutput};
use crate::core::query::RequestContext;

/// An invocable tool.
///
/// Implementations must return `Ok` with an empty-result message when a
/// search finds nothing; `Err` is reserved for transport, auth and argument
/// failures, which the executor turns into an observation.
#[async_trait]
pub trait Capability: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    async fn execute(
        &self,
        parameters: &HashMap<String, Value>,
        context: &RequestContext,
    ) -> Result<ToolOutput, ToolError>;
}

/// Read a required, non-blank string parameter.
pub fn require_str<'a>(
    parameters: &'a HashMap<String, Value>,
    key: &str,
) -> Result<&'a str, ToolError> {
    parameters
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ToolError::invalid_argument(format!("Missing required argument: {}", key)))
}

/// Read an optional positive integer parameter, accepting numeric strings.
pub fn optional_usize(parameters: &HashMap<String, Value>, key: &str) -> Option<usize> {
    match parameters.get(key)? {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
