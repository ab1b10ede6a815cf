//! Tool execution outcome types.

use crate::reference::RawReference;
use serde::{Deserialize, Serialize};

/// Error raised by a capability.
///
/// | Code | Meaning |
/// |------|---------|
/// | `INVALID_ARGUMENT` | Missing or malformed parameters |
/// | `NOT_FOUND` | Unknown tool or missing resource (e.g. no active document) |
/// | `EXECUTION_FAILED` | Transport or upstream failure |
/// | `TIMEOUT` | Upstream did not answer in time |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolError {
    pub code: String,
    pub message: String,
}

impl ToolError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", format!("Resource not found: {}", resource.into()))
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new("INVALID_ARGUMENT", message)
    }

    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new("EXECUTION_FAILED", message)
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::new("TIMEOUT", format!("Operation timed out: {}", operation.into()))
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ToolError {}

/// Textual observation plus the sources it cites.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub output: String,
    #[serde(default)]
    pub references: Vec<RawReference>,
}

impl ToolOutput {
    pub fn text(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            references: Vec::new(),
        }
    }

    /// The standard "nothing found" observation.
    pub fn empty(what: impl std::fmt::Display) -> Self {
        Self::text(format!("No results found for {}.", what))
    }

    pub fn with_reference(mut self, reference: RawReference) -> Self {
        self.references.push(reference);
        self
    }

    pub fn with_references(mut self, references: impl IntoIterator<Item = RawReference>) -> Self {
        self.references.extend(references);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_display() {
        let err = ToolError::timeout("pubmed esearch");
        assert_eq!(err.to_string(), "[TIMEOUT] Operation timed out: pubmed esearch");
    }

    #[test]
    fn test_empty_output() {
        let out = ToolOutput::empty("\"quantum tunnelling\"");
        assert_eq!(out.output, "No results found for \"quantum tunnelling\".");
        assert!(out.references.is_empty());
    }
}
