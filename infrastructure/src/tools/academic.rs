//! `academic_search` capability: peer-reviewed literature search.
//!
//! Queries two free sources concurrently and merges their results:
//!
//! - **PubMed** via NCBI E-utilities (`esearch` for ids, then `esummary`)
//! - **Semantic Scholar** Graph API paper search
//!
//! Papers are deduplicated by lower-cased title, first source wins. A
//! failing source is logged and skipped; only when both fail does the
//! capability return an error.
//!
//! # Parameters
//!
//! | Name | Type | Required | Description |
//! |------|------|:---:|-------------|
//! | `query` | string | Yes | Search terms |
//! | `limit` | number | No | Results per source (default from `[tools] max_results`) |

use async_trait::async_trait;
use reasoning_domain::tool::capability::{optional_usize, require_str};
use reasoning_domain::tool::entities::{ACADEMIC_SEARCH, ToolCategory, ToolDefinition, ToolParameter};
use reasoning_domain::{Capability, RawReference, RequestContext, ToolError, ToolOutput, truncate_str};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

use crate::tools::fetch_json;

const PUBMED_SEARCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi";
const PUBMED_SUMMARY_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esummary.fcgi";
const SEMANTIC_SCHOLAR_URL: &str = "https://api.semanticscholar.org/graph/v1/paper/search";

const MAX_LIMIT: usize = 20;
const ABSTRACT_CHARS: usize = 400;
const MAX_AUTHORS: usize = 3;

/// A paper as reported by one source.
#[derive(Debug, Clone, PartialEq)]
struct Paper {
    source: &'static str,
    title: String,
    url: Option<String>,
    authors: Vec<String>,
    published: Option<String>,
    summary: Option<String>,
}

impl Paper {
    fn reference(&self) -> RawReference {
        let label = format!("{} ({})", self.title, self.source);
        match &self.url {
            Some(url) => RawReference::new(label).with_url(url.clone()),
            None => RawReference::new(label),
        }
    }

    fn render(&self, index: usize) -> String {
        let mut line = format!("{}. **{}**", index, self.title);

        let mut byline = Vec::new();
        if !self.authors.is_empty() {
            let mut authors = self.authors[..self.authors.len().min(MAX_AUTHORS)].join(", ");
            if self.authors.len() > MAX_AUTHORS {
                authors.push_str(" et al.");
            }
            byline.push(authors);
        }
        if let Some(published) = &self.published {
            byline.push(published.clone());
        }
        byline.push(self.source.to_string());
        line.push_str(&format!("\n   {}", byline.join(" | ")));

        if let Some(summary) = &self.summary {
            line.push_str(&format!("\n   {}", truncate_str(summary, ABSTRACT_CHARS)));
        }
        if let Some(url) = &self.url {
            line.push_str(&format!("\n   {}", url));
        }
        line
    }
}

pub struct AcademicSearch {
    client: reqwest::Client,
    api_key: Option<String>,
    max_results: usize,
}

impl AcademicSearch {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            api_key: None,
            max_results: 5,
        }
    }

    /// Semantic Scholar API key; requests work without one at a lower rate limit.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.clamp(1, MAX_LIMIT);
        self
    }

    async fn search_pubmed(&self, query: &str, limit: usize) -> Result<Vec<Paper>, ToolError> {
        let retmax = limit.to_string();
        let search = fetch_json(
            "PubMed",
            self.client.get(PUBMED_SEARCH_URL).query(&[
                ("db", "pubmed"),
                ("term", query),
                ("retmax", retmax.as_str()),
                ("retmode", "json"),
                ("sort", "relevance"),
            ]),
        )
        .await?;

        let ids = pubmed_ids(&search);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let id_list = ids.join(",");
        let summary = fetch_json(
            "PubMed",
            self.client.get(PUBMED_SUMMARY_URL).query(&[
                ("db", "pubmed"),
                ("id", id_list.as_str()),
                ("retmode", "json"),
            ]),
        )
        .await?;

        Ok(pubmed_papers(&summary, &ids))
    }

    async fn search_semantic_scholar(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Paper>, ToolError> {
        let limit = limit.to_string();
        let mut request = self.client.get(SEMANTIC_SCHOLAR_URL).query(&[
            ("query", query),
            ("limit", limit.as_str()),
            ("fields", "title,url,abstract,year,authors"),
        ]);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let body = fetch_json("Semantic Scholar", request).await?;
        Ok(semantic_scholar_papers(&body))
    }
}

#[async_trait]
impl Capability for AcademicSearch {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            ACADEMIC_SEARCH,
            "Search peer-reviewed literature (PubMed and Semantic Scholar). Returns titles, authors and abstracts.",
            ToolCategory::Scholarly,
        )
        .with_parameter(ToolParameter::new("query", "Search terms", true).with_type("string"))
        .with_parameter(
            ToolParameter::new("limit", "Results per source", false).with_type("number"),
        )
    }

    async fn execute(
        &self,
        parameters: &HashMap<String, Value>,
        _context: &RequestContext,
    ) -> Result<ToolOutput, ToolError> {
        let query = require_str(parameters, "query")?;
        let limit = optional_usize(parameters, "limit")
            .unwrap_or(self.max_results)
            .clamp(1, MAX_LIMIT);

        let (pubmed, scholar) = tokio::join!(
            self.search_pubmed(query, limit),
            self.search_semantic_scholar(query, limit)
        );

        let mut papers = Vec::new();
        let mut failures = Vec::new();
        for (source, result) in [("PubMed", pubmed), ("Semantic Scholar", scholar)] {
            match result {
                Ok(found) => {
                    tracing::debug!(source, results = found.len(), "Academic source answered");
                    papers.extend(found);
                }
                Err(e) => {
                    tracing::warn!(source, error = %e, "Academic source failed");
                    failures.push(format!("{}: {}", source, e));
                }
            }
        }

        if failures.len() == 2 {
            return Err(ToolError::execution_failed(format!(
                "All academic sources failed ({})",
                failures.join("; ")
            )));
        }

        Ok(format_papers(query, dedupe_by_title(papers)))
    }
}

fn pubmed_ids(search: &Value) -> Vec<String> {
    search["esearchresult"]["idlist"]
        .as_array()
        .map(|ids| {
            ids.iter()
                .filter_map(|id| id.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Build papers from an `esummary` response, in `ids` order.
fn pubmed_papers(summary: &Value, ids: &[String]) -> Vec<Paper> {
    let result = &summary["result"];
    ids.iter()
        .filter_map(|pmid| {
            let article = result.get(pmid)?;
            if article.get("error").is_some() {
                return None;
            }
            let title = text(&article["title"])?;
            Some(Paper {
                source: "PubMed",
                title,
                url: Some(format!("https://pubmed.ncbi.nlm.nih.gov/{}/", pmid)),
                authors: names(&article["authors"]),
                published: text(&article["pubdate"]),
                summary: None,
            })
        })
        .collect()
}

fn semantic_scholar_papers(body: &Value) -> Vec<Paper> {
    let Some(data) = body["data"].as_array() else {
        return Vec::new();
    };

    data.iter()
        .filter_map(|paper| {
            let title = text(&paper["title"])?;
            Some(Paper {
                source: "Semantic Scholar",
                title,
                url: text(&paper["url"]),
                authors: names(&paper["authors"]),
                published: paper["year"].as_u64().map(|y| y.to_string()),
                summary: text(&paper["abstract"]),
            })
        })
        .collect()
}

/// Keep the first paper for each lower-cased title.
fn dedupe_by_title(papers: Vec<Paper>) -> Vec<Paper> {
    let mut seen = HashSet::new();
    papers
        .into_iter()
        .filter(|p| seen.insert(p.title.trim().to_lowercase()))
        .collect()
}

fn format_papers(query: &str, papers: Vec<Paper>) -> ToolOutput {
    if papers.is_empty() {
        return ToolOutput::empty(format!("\"{}\" in the academic literature", query));
    }

    let body = papers
        .iter()
        .enumerate()
        .map(|(i, p)| p.render(i + 1))
        .collect::<Vec<_>>()
        .join("\n\n");

    ToolOutput::text(format!("## Academic Results for: {}\n\n{}", query, body))
        .with_references(papers.iter().map(Paper::reference))
}

fn text(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn names(authors: &Value) -> Vec<String> {
    authors
        .as_array()
        .map(|list| list.iter().filter_map(|a| text(&a["name"])).collect())
        .unwrap_or_default()
}
