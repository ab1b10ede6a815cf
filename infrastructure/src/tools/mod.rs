//! Capability adapters
//!
//! Concrete retrieval tools a task may invoke, plus the
//! [`CapabilityRegistry`] that routes calls to them by name or alias.
//!
//! | Tool | Category | Backend |
//! |------|----------|---------|
//! | `web_search` | web | DuckDuckGo Instant Answer API |
//! | `web_crawl` | crawl | direct fetch + HTML→text (`web-tools` feature) |
//! | `academic_search` | scholarly | PubMed E-utilities + Semantic Scholar |
//! | `document_search` | document | configured RAG endpoint |
//!
//! # Aliases
//!
//! - `web`, `search` → `web_search`
//! - `scholar` → `academic_search`
//! - `rag` → `document_search`

pub mod academic;
pub mod document;
pub mod registry;
pub mod web;

pub use academic::AcademicSearch;
pub use document::DocumentSearch;
pub use registry::CapabilityRegistry;
#[cfg(feature = "web-tools")]
pub use web::WebCrawl;
pub use web::WebSearch;

use crate::config::FileToolsConfig;
use reasoning_domain::ToolError;
use reasoning_domain::tool::entities::{ACADEMIC_SEARCH, DOCUMENT_SEARCH, WEB_SEARCH};
use std::time::Duration;

/// Standard alias table.
pub const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("web", WEB_SEARCH),
    ("search", WEB_SEARCH),
    ("scholar", ACADEMIC_SEARCH),
    ("rag", DOCUMENT_SEARCH),
];

/// Build the registry of every capability the configuration enables.
///
/// `document_search` is registered only when a RAG endpoint is configured,
/// and `web_crawl` only when crawling is enabled and compiled in.
pub fn standard_registry(config: &FileToolsConfig) -> Result<CapabilityRegistry, ToolError> {
    let client = build_client(config)?;

    let mut registry = CapabilityRegistry::new()
        .register(WebSearch::new(client.clone()))
        .register(
            AcademicSearch::new(client.clone())
                .with_max_results(config.max_results)
                .with_api_key(std::env::var(&config.semantic_scholar_api_key_env).ok()),
        );

    if let Some(endpoint) = config.rag_endpoint.as_deref() {
        registry = registry.register(
            DocumentSearch::new(client.clone(), endpoint).with_max_results(config.max_results),
        );
    } else {
        tracing::debug!("No RAG endpoint configured, document_search unavailable");
    }

    #[cfg(feature = "web-tools")]
    if config.enable_crawl {
        registry = registry.register(WebCrawl::new(client.clone()));
    }

    Ok(registry.with_aliases(DEFAULT_ALIASES.iter().copied()))
}

fn build_client(config: &FileToolsConfig) -> Result<reqwest::Client, ToolError> {
    let timeout = Duration::from_secs(config.timeout_secs.max(1));
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(5).min(timeout))
        .timeout(timeout)
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| ToolError::execution_failed(format!("Failed to build HTTP client: {}", e)))
}

/// Send `request` and decode a JSON body, mapping failures to tool errors.
pub(crate) async fn fetch_json(
    source: &str,
    request: reqwest::RequestBuilder,
) -> Result<serde_json::Value, ToolError> {
    let response = request.send().await.map_err(|e| transport_error(source, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ToolError::execution_failed(format!(
            "{} returned HTTP {}",
            source,
            status.as_u16()
        )));
    }

    response
        .json()
        .await
        .map_err(|e| ToolError::execution_failed(format!("Failed to parse {} response: {}", source, e)))
}

pub(crate) fn transport_error(source: &str, error: reqwest::Error) -> ToolError {
    if error.is_timeout() {
        ToolError::timeout(source)
    } else {
        ToolError::execution_failed(format!("{} request failed: {}", source, error))
    }
}
