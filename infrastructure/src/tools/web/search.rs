//! `web_search` capability: search the web using the DuckDuckGo Instant
//! Answer API.
//!
//! The Instant Answer API needs no API key and returns abstracts,
//! definitions and related topics rather than full result listings. A task
//! that needs the body of a page can follow up with `web_crawl` on one of
//! the cited URLs.
//!
//! # Parameters
//!
//! | Name | Type | Required | Description |
//! |------|------|:---:|-------------|
//! | `query` | string | Yes | The search query |
//!
//! # References
//!
//! The abstract URL and the first related-topic links are reported as
//! references, so the run's ledger can cite them.

use async_trait::async_trait;
use reasoning_domain::tool::capability::require_str;
use reasoning_domain::tool::entities::{ToolCategory, ToolDefinition, ToolParameter, WEB_SEARCH};
use reasoning_domain::{Capability, RawReference, RequestContext, ToolError, ToolOutput};
use serde_json::Value;
use std::collections::HashMap;

use crate::tools::fetch_json;

/// DuckDuckGo Instant Answer API endpoint (no API key required).
const DDG_API_URL: &str = "https://api.duckduckgo.com/";

/// Related topics kept in the observation.
const MAX_RELATED_TOPICS: usize = 10;

/// Related-topic links reported as references.
const MAX_TOPIC_REFERENCES: usize = 3;

pub struct WebSearch {
    client: reqwest::Client,
    endpoint: String,
}

impl WebSearch {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint: DDG_API_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl Capability for WebSearch {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            WEB_SEARCH,
            "Search the web using DuckDuckGo. Returns instant answers, abstracts, and related topics.",
            ToolCategory::Web,
        )
        .with_parameter(ToolParameter::new("query", "The search query", true).with_type("string"))
    }

    async fn execute(
        &self,
        parameters: &HashMap<String, Value>,
        _context: &RequestContext,
    ) -> Result<ToolOutput, ToolError> {
        let query = require_str(parameters, "query")?;

        let request = self.client.get(&self.endpoint).query(&[
            ("q", query),
            ("format", "json"),
            ("no_html", "1"),
            ("skip_disambig", "1"),
        ]);
        let body = fetch_json("DuckDuckGo", request).await?;

        Ok(format_search_results(query, &body))
    }
}

/// Turn an Instant Answer response into a markdown observation.
///
/// Sections: AbstractText, Answer, Definition, RelatedTopics (up to 10)
/// and Redirect. A response with none of them is an empty result.
fn format_search_results(query: &str, data: &Value) -> ToolOutput {
    let mut sections: Vec<String> = Vec::new();
    let mut references: Vec<RawReference> = Vec::new();

    if let Some(abstract_text) = non_empty(&data["AbstractText"]) {
        let source = non_empty(&data["AbstractSource"]).unwrap_or("Unknown");
        let url = non_empty(&data["AbstractURL"]);
        sections.push(format!(
            "### Summary ({})\n{}\nSource: {}",
            source,
            abstract_text,
            url.unwrap_or("")
        ));
        if let Some(url) = url {
            let heading = non_empty(&data["Heading"]).unwrap_or(source);
            references.push(RawReference::new(format!("{} ({})", heading, source)).with_url(url));
        }
    }

    if let Some(answer) = non_empty(&data["Answer"]) {
        sections.push(format!("### Instant Answer\n{}", answer));
    }

    if let Some(definition) = non_empty(&data["Definition"]) {
        let source = non_empty(&data["DefinitionSource"]).unwrap_or("Unknown");
        sections.push(format!("### Definition ({})\n{}", source, definition));
        if let Some(url) = non_empty(&data["DefinitionURL"]) {
            references.push(RawReference::new(format!("{} definition", source)).with_url(url));
        }
    }

    if let Some(topics) = data["RelatedTopics"].as_array() {
        // Nested topic groups carry no Text and are skipped
        let topics: Vec<(&str, Option<&str>)> = topics
            .iter()
            .filter_map(|t| non_empty(&t["Text"]).map(|text| (text, non_empty(&t["FirstURL"]))))
            .take(MAX_RELATED_TOPICS)
            .collect();

        if !topics.is_empty() {
            let lines: Vec<String> = topics
                .iter()
                .map(|(text, url)| format!("- {} ({})", text, url.unwrap_or("")))
                .collect();
            sections.push(format!("### Related Topics\n{}", lines.join("\n")));

            references.extend(
                topics
                    .iter()
                    .filter_map(|(text, url)| url.map(|u| RawReference::new(*text).with_url(u)))
                    .take(MAX_TOPIC_REFERENCES),
            );
        }
    }

    if let Some(redirect) = non_empty(&data["Redirect"]) {
        sections.push(format!("### Redirect\n{}", redirect));
        references.push(RawReference::new("Redirect").with_url(redirect));
    }

    if sections.is_empty() {
        return ToolOutput::empty(format!("\"{}\" on the web", query));
    }

    let output = format!("## Search Results for: {}\n\n{}", query, sections.join("\n\n"));
    ToolOutput::text(output).with_references(references)
}

fn non_empty(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}
