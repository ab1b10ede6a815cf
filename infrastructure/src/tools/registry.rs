//! Capability Registry
//!
//! The [`CapabilityRegistry`] holds the concrete capabilities and implements
//! [`ToolExecutorPort`]. It resolves aliases through the merged
//! [`ToolSpec`] and routes each call to the capability that owns the
//! canonical name.
//!
//! # Usage
//!
//! ```ignore
//! use reasoning_infrastructure::tools::{CapabilityRegistry, WebSearch};
//!
//! let registry = CapabilityRegistry::new()
//!     .register(WebSearch::new(client))
//!     .with_alias("web", "web_search");
//!
//! let output = registry.execute("web", &params, &context).await?;
//! ```
//!
//! Registering a second capability under an existing name replaces the
//! first one.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reasoning_application::ports::tool_executor::ToolExecutorPort;
use reasoning_domain::{Capability, RequestContext, ToolError, ToolOutput, ToolSpec};
use serde_json::Value;

/// Registry of capabilities keyed by canonical tool name.
pub struct CapabilityRegistry {
    capabilities: HashMap<String, Arc<dyn Capability>>,
    tool_spec: ToolSpec,
}

impl CapabilityRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            capabilities: HashMap::new(),
            tool_spec: ToolSpec::new(),
        }
    }

    /// Register a capability
    pub fn register<C: Capability + 'static>(self, capability: C) -> Self {
        self.register_arc(Arc::new(capability))
    }

    /// Register a capability (Arc version)
    pub fn register_arc(mut self, capability: Arc<dyn Capability>) -> Self {
        let definition = capability.definition();
        if self.capabilities.contains_key(&definition.name) {
            tracing::warn!(tool = %definition.name, "Replacing previously registered capability");
        } else {
            tracing::debug!(
                tool = %definition.name,
                category = definition.category.as_str(),
                "Registered capability"
            );
        }

        self.capabilities
            .insert(definition.name.clone(), capability);
        self.tool_spec = self.tool_spec.register(definition);
        self
    }

    /// Map `alias` onto a canonical tool name.
    ///
    /// Aliases whose target is not registered never resolve.
    pub fn with_alias(mut self, alias: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.tool_spec = self.tool_spec.register_alias(alias, canonical);
        self
    }

    pub fn with_aliases<A, C>(mut self, mappings: impl IntoIterator<Item = (A, C)>) -> Self
    where
        A: Into<String>,
        C: Into<String>,
    {
        self.tool_spec = self.tool_spec.register_aliases(mappings);
        self
    }

    /// Canonical names of the registered capabilities, sorted.
    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.capabilities.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolExecutorPort for CapabilityRegistry {
    fn tool_spec(&self) -> &ToolSpec {
        &self.tool_spec
    }

    async fn execute(
        &self,
        name: &str,
        parameters: &HashMap<String, Value>,
        context: &RequestContext,
    ) -> Result<ToolOutput, ToolError> {
        let capability = self
            .tool_spec
            .resolve(name)
            .and_then(|canonical| self.capabilities.get(canonical))
            .ok_or_else(|| ToolError::not_found(format!("tool '{}'", name)))?;

        let start = Instant::now();
        let result = capability.execute(parameters, context).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(output) => tracing::debug!(
                tool = name,
                references = output.references.len(),
                elapsed_ms,
                "Capability completed"
            ),
            Err(e) => tracing::warn!(tool = name, error = %e, elapsed_ms, "Capability failed"),
        }

        result
    }
}
