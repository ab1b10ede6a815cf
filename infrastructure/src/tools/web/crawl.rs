//! `web_crawl` capability: fetch a URL and extract readable text.
//!
//! HTML is converted to plain text with `scraper`: `script`, `style`,
//! `noscript` and `svg` subtrees are dropped and whitespace is collapsed.
//! Other content types (JSON, plain text) are returned as-is.
//!
//! # Parameters
//!
//! | Name | Type | Required | Description |
//! |------|------|:---:|-------------|
//! | `url` | string | Yes | The URL to fetch |
//! | `max_length` | number | No | Max characters of text to keep (default 50 000) |
//!
//! Crawling is not part of the per-plan tool budget.

use async_trait::async_trait;
use reasoning_domain::tool::capability::{optional_usize, require_str};
use reasoning_domain::tool::entities::{ToolCategory, ToolDefinition, ToolParameter, WEB_CRAWL};
use reasoning_domain::{Capability, RawReference, RequestContext, ToolError, ToolOutput};
use serde_json::Value;
use std::collections::HashMap;

use crate::tools::transport_error;

/// Maximum response body accepted (5 MB).
const MAX_BODY_SIZE: usize = 5 * 1024 * 1024;

/// Default cap on extracted text (50 KB).
const DEFAULT_MAX_TEXT: usize = 50 * 1024;

pub struct WebCrawl {
    client: reqwest::Client,
}

impl WebCrawl {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Capability for WebCrawl {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            WEB_CRAWL,
            "Fetch a web page and return its readable text. Use on URLs found by a search.",
            ToolCategory::Crawl,
        )
        .with_parameter(ToolParameter::new("url", "The URL to fetch", true).with_type("url"))
        .with_parameter(
            ToolParameter::new("max_length", "Maximum characters of text to return", false)
                .with_type("number"),
        )
    }

    async fn execute(
        &self,
        parameters: &HashMap<String, Value>,
        _context: &RequestContext,
    ) -> Result<ToolOutput, ToolError> {
        let url = require_str(parameters, "url")?;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ToolError::invalid_argument(format!(
                "Only http(s) URLs can be crawled: {}",
                url
            )));
        }
        let max_length = optional_usize(parameters, "max_length").unwrap_or(DEFAULT_MAX_TEXT);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error("Crawl", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::execution_failed(format!(
                "HTTP error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        if let Some(length) = response.content_length()
            && length > MAX_BODY_SIZE as u64
        {
            return Err(ToolError::execution_failed(format!(
                "Response too large: {} bytes (max: {} bytes)",
                length, MAX_BODY_SIZE
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error("Crawl", e))?;
        if body.len() > MAX_BODY_SIZE {
            return Err(ToolError::execution_failed(format!(
                "Response too large: {} bytes",
                body.len()
            )));
        }

        let body = String::from_utf8_lossy(&body);
        let text = if content_type.contains("text/html") || content_type.contains("application/xhtml")
        {
            html_to_text(&body)
        } else {
            body.into_owned()
        };

        if text.trim().is_empty() {
            return Ok(ToolOutput::empty(format!("readable text at {}", url)));
        }

        tracing::debug!(url, bytes = text.len(), "Crawled page");

        let reference = RawReference::new(page_title(url)).with_url(url);
        Ok(ToolOutput::text(format!(
            "## Crawled: {}\n\n{}",
            url,
            truncate_text(&text, max_length)
        ))
        .with_reference(reference))
    }
}

/// Extract readable text from HTML, stripping tags, scripts, and styles
pub fn html_to_text(html: &str) -> String {
    use scraper::{Html, Selector};

    let document = Html::parse_document(html);
    let skip_tags = ["script", "style", "noscript", "svg"];

    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next());

    let parts = match body {
        Some(body) => collect_element_text(body, &skip_tags),
        None => collect_element_text(document.root_element(), &skip_tags),
    };

    clean_whitespace(&parts.join(" "))
}

/// Recursively collect text from an element, skipping elements matching skip_tags
fn collect_element_text(element: scraper::ElementRef, skip_tags: &[&str]) -> Vec<String> {
    if skip_tags.contains(&element.value().name()) {
        return Vec::new();
    }

    let mut parts = Vec::new();
    for child in element.children() {
        match child.value() {
            scraper::Node::Text(text) => {
                let t = text.trim();
                if !t.is_empty() {
                    parts.push(t.to_string());
                }
            }
            scraper::Node::Element(_) => {
                if let Some(child_el) = scraper::ElementRef::wrap(child) {
                    parts.extend(collect_element_text(child_el, skip_tags));
                }
            }
            _ => {}
        }
    }
    parts
}

fn clean_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_was_whitespace = false;
    let mut newline_count = 0;

    for ch in text.chars() {
        if ch == '\n' {
            newline_count += 1;
            if newline_count <= 2 {
                result.push('\n');
            }
            prev_was_whitespace = true;
        } else if ch.is_whitespace() {
            if !prev_was_whitespace {
                result.push(' ');
            }
            prev_was_whitespace = true;
            newline_count = 0;
        } else {
            result.push(ch);
            prev_was_whitespace = false;
            newline_count = 0;
        }
    }

    result.trim().to_string()
}

fn truncate_text(text: &str, max_length: usize) -> String {
    if text.len() <= max_length {
        return text.to_string();
    }
    let cut = text.floor_char_boundary(max_length);
    format!(
        "{}\n\n[... truncated at {} bytes, total: {} bytes]",
        &text[..cut],
        cut,
        text.len()
    )
}

/// Host and path of a URL, used as the reference label.
fn page_title(url: &str) -> String {
    let without_scheme = url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(url);
    without_scheme
        .split(['?', '#'])
        .next()
        .unwrap_or(without_scheme)
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_html_to_text_basic() {
        let html = "<html><body><h1>Mitosis</h1><p>Cell division</p></body></html>";
        let text = html_to_text(html);
        assert!(text.contains("Mitosis"));
        assert!(text.contains("Cell division"));
    }

    #[test]
    fn test_html_to_text_strips_script_and_style() {
        let html = r#"
        <html><body>
            <script>var x = 1;</script>
            <style>.foo { color: red; }</style>
            <p>Visible text</p>
            <noscript>No JS</noscript>
        </body></html>
        "#;
        let text = html_to_text(html);
        assert!(text.contains("Visible text"));
        assert!(!text.contains("var x = 1"));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("No JS"));
    }

    #[test]
    fn test_html_to_text_empty() {
        assert!(html_to_text("").trim().is_empty());
    }

    #[test]
    fn test_clean_whitespace() {
        assert_eq!(clean_whitespace("  hello   world  "), "hello world");
        assert_eq!(clean_whitespace("a\n\n\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 100), "short");
        let long = "é".repeat(10);
        let truncated = truncate_text(&long, 5);
        assert!(truncated.starts_with("éé\n\n[... truncated at 4 bytes"));
    }

    #[test]
    fn test_page_title() {
        assert_eq!(
            page_title("https://example.org/biology/cells/?ref=1#top"),
            "example.org/biology/cells"
        );
        assert_eq!(page_title("http://example.org"), "example.org");
    }

    #[tokio::test]
    async fn test_rejects_non_http_urls() {
        let crawler = WebCrawl::new(reqwest::Client::new());
        let mut params = HashMap::new();
        params.insert("url".to_string(), json!("file:///etc/passwd"));

        let err = crawler
            .execute(&params, &RequestContext::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, "INVALID_ARGUMENT");
    }
}
