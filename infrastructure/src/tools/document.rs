//! `document_search` capability: retrieval over the user's active document.
//!
//! Posts the query to the configured RAG endpoint:
//!
//! ```json
//! { "query": "...", "document_id": "...", "user_id": "...", "k": 5 }
//! ```
//!
//! and expects passages back:
//!
//! ```json
//! { "results": [ { "content": "...", "source": "chapter-3.pdf", "url": null, "score": 0.82 } ] }
//! ```
//!
//! `text` and `document_name` are accepted as aliases of `content` and
//! `source`. The document id comes from the `document_id` parameter or,
//! failing that, from the request context.

use async_trait::async_trait;
use reasoning_domain::tool::capability::{optional_usize, require_str};
use reasoning_domain::tool::entities::{DOCUMENT_SEARCH, ToolCategory, ToolDefinition, ToolParameter};
use reasoning_domain::{Capability, RawReference, RequestContext, ToolError, ToolOutput};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::tools::fetch_json;

#[derive(Debug, Serialize)]
struct RetrievalRequest<'a> {
    query: &'a str,
    document_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
    k: usize,
}

#[derive(Debug, Default, Deserialize)]
struct RetrievalResponse {
    #[serde(default)]
    results: Vec<Passage>,
}

#[derive(Debug, Deserialize)]
struct Passage {
    #[serde(alias = "text", default)]
    content: String,
    #[serde(alias = "document_name", default)]
    source: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    score: Option<f64>,
}

pub struct DocumentSearch {
    client: reqwest::Client,
    endpoint: String,
    max_results: usize,
}

impl DocumentSearch {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            max_results: 5,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }
}

#[async_trait]
impl Capability for DocumentSearch {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            DOCUMENT_SEARCH,
            "Retrieve passages from the document the student is currently studying.",
            ToolCategory::Document,
        )
        .with_parameter(ToolParameter::new("query", "What to look for", true).with_type("string"))
        .with_parameter(
            ToolParameter::new("document_id", "Document to search (defaults to the active one)", false)
                .with_type("string"),
        )
        .with_parameter(ToolParameter::new("k", "Passages to return", false).with_type("number"))
    }

    async fn execute(
        &self,
        parameters: &HashMap<String, Value>,
        context: &RequestContext,
    ) -> Result<ToolOutput, ToolError> {
        let query = require_str(parameters, "query")?;
        let document_id = require_str(parameters, "document_id")
            .ok()
            .or(context.document_id.as_deref())
            .ok_or_else(|| ToolError::invalid_argument("No active document to search"))?;
        let k = optional_usize(parameters, "k").unwrap_or(self.max_results).max(1);

        let request = RetrievalRequest {
            query,
            document_id,
            user_id: context.user_id.as_deref(),
            k,
        };
        let body = fetch_json("Document retrieval", self.client.post(&self.endpoint).json(&request))
            .await?;
        let response: RetrievalResponse = serde_json::from_value(body).map_err(|e| {
            ToolError::execution_failed(format!("Unexpected document retrieval response: {}", e))
        })?;

        Ok(format_passages(query, document_id, response.results))
    }
}

fn format_passages(query: &str, document_id: &str, passages: Vec<Passage>) -> ToolOutput {
    let passages: Vec<Passage> = passages
        .into_iter()
        .filter(|p| !p.content.trim().is_empty())
        .collect();
    if passages.is_empty() {
        return ToolOutput::empty(format!("\"{}\" in document {}", query, document_id));
    }

    let mut sections = Vec::with_capacity(passages.len());
    let mut references = Vec::new();
    for (i, passage) in passages.iter().enumerate() {
        let source = passage.source.as_deref().unwrap_or(document_id);
        let header = match passage.score {
            Some(score) => format!("### Passage {} ({}, relevance {:.2})", i + 1, source, score),
            None => format!("### Passage {} ({})", i + 1, source),
        };
        sections.push(format!("{}\n{}", header, passage.content.trim()));

        let reference = RawReference::new(source);
        references.push(match &passage.url {
            Some(url) => reference.with_url(url.clone()),
            None => reference,
        });
    }

    ToolOutput::text(format!(
        "## Document Passages for: {}\n\n{}",
        query,
        sections.join("\n\n")
    ))
    .with_references(references)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_passages() {
        let response: RetrievalResponse = serde_json::from_value(json!({
            "results": [
                { "content": "Enzymes lower activation energy.", "source": "bio-ch3.pdf", "score": 0.91 },
                { "text": "  ", "document_name": "bio-ch3.pdf" },
                { "text": "Temperature affects enzyme rate.", "url": "https://example.org/notes" }
            ]
        }))
        .unwrap();

        let output = format_passages("enzymes", "doc-7", response.results);
        assert!(output.output.contains("### Passage 1 (bio-ch3.pdf, relevance 0.91)"));
        assert!(output.output.contains("### Passage 2 (doc-7)"));
        assert!(output.output.contains("Temperature affects"));
        assert_eq!(output.references.len(), 2);
        assert_eq!(output.references[0].source, "bio-ch3.pdf");
        assert_eq!(output.references[1].url.as_deref(), Some("https://example.org/notes"));
    }

    #[test]
    fn test_format_passages_empty() {
        let output = format_passages("enzymes", "doc-7", Vec::new());
        assert!(output.output.starts_with("No results found for"));
        assert!(output.output.contains("doc-7"));
    }

    #[test]
    fn test_missing_results_field_is_empty() {
        let response: RetrievalResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.results.is_empty());
    }

    #[test]
    fn test_request_body_omits_missing_user() {
        let body = serde_json::to_value(RetrievalRequest {
            query: "osmosis",
            document_id: "doc-1",
            user_id: None,
            k: 3,
        })
        .unwrap();
        assert_eq!(body, json!({ "query": "osmosis", "document_id": "doc-1", "k": 3 }));
    }

    #[tokio::test]
    async fn test_requires_active_document() {
        let search = DocumentSearch::new(reqwest::Client::new(), "http://127.0.0.1:9/retrieve");
        let mut params = HashMap::new();
        params.insert("query".to_string(), json!("osmosis"));

        let err = search
            .execute(&params, &RequestContext::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, "INVALID_ARGUMENT");
    }
}
