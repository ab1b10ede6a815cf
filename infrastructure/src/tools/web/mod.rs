//! **Web capabilities** - `web_search` and `web_crawl`
//!
//! | Tool | Category | Key Dependency |
//! |------|----------|----------------|
//! | `web_search` | web (budgeted) | `reqwest` |
//! | `web_crawl` | crawl (unbudgeted) | `reqwest` + `scraper` |
//!
//! The crawler is gated behind the `web-tools` Cargo feature:
//!
//! ```toml
//! # infrastructure/Cargo.toml
//! [features]
//! web-tools = ["dep:scraper"]
//!
//! # cli/Cargo.toml (enabled by default for end users)
//! [features]
//! default = ["web-tools"]
//! ```

#[cfg(feature = "web-tools")]
mod crawl;
mod search;

#[cfg(feature = "web-tools")]
pub use crawl::{WebCrawl, html_to_text};
pub use search::WebSearch;
