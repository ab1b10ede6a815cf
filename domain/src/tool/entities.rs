//! Tool domain entities

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const WEB_SEARCH: &str = "web_search";
pub const WEB_CRAWL: &str = "web_crawl";
pub const ACADEMIC_SEARCH: &str = "academic_search";
pub const DOCUMENT_SEARCH: &str = "document_search";

/// What kind of source a tool consults.
///
/// Web and scholarly tools are budgeted per plan; crawl and document
/// tools are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCategory {
    /// General web search (e.g., web_search)
    Web,
    /// Peer-reviewed literature (e.g., academic_search)
    Scholarly,
    /// The user's active document (e.g., document_search)
    Document,
    /// Fetching a known URL (e.g., web_crawl)
    Crawl,
}

impl ToolCategory {
    pub fn as_str(&self) -> &str {
        match self {
            ToolCategory::Web => "web",
            ToolCategory::Scholarly => "scholarly",
            ToolCategory::Document => "document",
            ToolCategory::Crawl => "crawl",
        }
    }

    pub fn is_budgeted(&self) -> bool {
        matches!(self, ToolCategory::Web | ToolCategory::Scholarly)
    }
}

impl std::fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Definition of a capability offered to the planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "web_search")
    pub name: String,
    pub description: String,
    pub category: ToolCategory,
    pub parameters: Vec<ToolParameter>,
}

/// Parameter specification for a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub description: String,
    pub required: bool,
    /// Type hint (e.g., "string", "url", "number")
    pub param_type: String,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: ToolCategory,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category,
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn required_parameters(&self) -> impl Iterator<Item = &ToolParameter> {
        self.parameters.iter().filter(|p| p.required)
    }

    /// One catalog line for prompts: `name(query*, limit) - description`.
    pub fn signature(&self) -> String {
        let params = self
            .parameters
            .iter()
            .map(|p| {
                if p.required {
                    format!("{}*", p.name)
                } else {
                    p.name.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({}) - {}", self.name, params, self.description)
    }
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: "string".to_string(),
        }
    }

    pub fn with_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = param_type.into();
        self
    }
}

/// Catalog of available tools
#[derive(Debug, Clone, Default)]
pub struct ToolSpec {
    tools: HashMap<String, ToolDefinition>,
    /// Alias → canonical name mapping (e.g. "scholar" → "academic_search")
    aliases: HashMap<String, String>,
}

impl ToolSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, tool: ToolDefinition) -> Self {
        self.tools.insert(tool.name.clone(), tool);
        self
    }

    pub fn register_alias(mut self, alias: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), canonical.into());
        self
    }

    pub fn register_aliases(
        mut self,
        mappings: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        for (alias, canonical) in mappings {
            self.aliases.insert(alias.into(), canonical.into());
        }
        self
    }

    /// Resolve an alias to its canonical name (aliases only, not canonical names)
    pub fn resolve_alias(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(|s| s.as_str())
    }

    /// Canonical name for a registered tool or alias; None if unknown.
    /// Canonical names win over colliding aliases.
    pub fn resolve<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if self.tools.contains_key(name) {
            Some(name)
        } else {
            self.resolve_alias(name)
                .filter(|canonical| self.tools.contains_key(*canonical))
        }
    }

    pub fn get_resolved(&self, name: &str) -> Option<&ToolDefinition> {
        self.resolve(name).and_then(|canonical| self.tools.get(canonical))
    }

    pub fn category_of(&self, name: &str) -> Option<ToolCategory> {
        self.get_resolved(name).map(|t| t.category)
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get_resolved(name).is_some()
    }

    /// Definitions sorted by name, for stable prompt rendering.
    pub fn all(&self) -> Vec<&ToolDefinition> {
        let mut tools: Vec<&ToolDefinition> = self.tools.values().collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ToolSpec {
        ToolSpec::new()
            .register(
                ToolDefinition::new(WEB_SEARCH, "Search the web", ToolCategory::Web)
                    .with_parameter(ToolParameter::new("query", "Search terms", true)),
            )
            .register(ToolDefinition::new(
                ACADEMIC_SEARCH,
                "Search papers",
                ToolCategory::Scholarly,
            ))
            .register_aliases([
                ("web", WEB_SEARCH),
                ("search", WEB_SEARCH),
                ("scholar", ACADEMIC_SEARCH),
                ("rag", DOCUMENT_SEARCH),
            ])
    }

    #[test]
    fn test_resolve_aliases() {
        let spec = catalog();
        assert_eq!(spec.resolve("web"), Some(WEB_SEARCH));
        assert_eq!(spec.resolve("search"), Some(WEB_SEARCH));
        assert_eq!(spec.resolve(WEB_SEARCH), Some(WEB_SEARCH));
        assert_eq!(spec.resolve_alias(WEB_SEARCH), None);
        assert_eq!(spec.category_of("scholar"), Some(ToolCategory::Scholarly));
        assert_eq!(spec.resolve("unknown"), None);
    }

    #[test]
    fn test_alias_to_unregistered_tool_is_unknown() {
        let spec = catalog();
        assert_eq!(spec.resolve_alias("rag"), Some(DOCUMENT_SEARCH));
        assert_eq!(spec.resolve("rag"), None);
        assert!(!spec.contains("rag"));
    }

    #[test]
    fn test_canonical_name_takes_priority_over_alias() {
        let spec = ToolSpec::new()
            .register(ToolDefinition::new(WEB_SEARCH, "a", ToolCategory::Web))
            .register(ToolDefinition::new("web", "b", ToolCategory::Crawl))
            .register_alias("web", WEB_SEARCH);
        assert_eq!(spec.get_resolved("web").unwrap().description, "b");
    }

    #[test]
    fn test_signature_and_budget() {
        let spec = catalog();
        assert_eq!(
            spec.get(WEB_SEARCH).unwrap().signature(),
            "web_search(query*) - Search the web"
        );
        assert!(ToolCategory::Web.is_budgeted());
        assert!(ToolCategory::Scholarly.is_budgeted());
        assert!(!ToolCategory::Crawl.is_budgeted());
        assert_eq!(spec.all()[0].name, ACADEMIC_SEARCH);
    }
}
