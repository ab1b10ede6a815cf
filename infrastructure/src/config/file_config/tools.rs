//! Tool configuration from TOML (`[tools]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolsConfig {
    /// Per-request timeout for retrieval tools, in seconds.
    pub timeout_secs: u64,
    /// Results kept per search.
    pub max_results: usize,
    pub user_agent: String,
    /// Document retrieval endpoint; `document_search` is unavailable without it.
    pub rag_endpoint: Option<String>,
    /// Optional Semantic Scholar API key env var (raises the rate limit).
    pub semantic_scholar_api_key_env: String,
    /// Register the HTML crawler (needs the `web-tools` feature).
    pub enable_crawl: bool,
}

impl Default for FileToolsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            max_results: 5,
            user_agent: concat!("tutor-reasoning/", env!("CARGO_PKG_VERSION")).to_string(),
            rag_endpoint: None,
            semantic_scholar_api_key_env: "SEMANTIC_SCHOLAR_API_KEY".to_string(),
            enable_crawl: true,
        }
    }
}
