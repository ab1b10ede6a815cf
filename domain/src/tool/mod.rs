//! Tool domain module
//!
//! Capabilities are the external operations a task may invoke while it
//! reasons: web search, page crawling, scholarly search and retrieval over
//! the user's active document.
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ ToolSpec     │───▶│ Capability   │───▶│ ToolOutput   │
//! │ (catalog)    │    │ ::execute    │    │ + references │
//! └──────┬───────┘    └──────────────┘    └──────────────┘
//!        │
//!        ├─ aliases:    "scholar" → "academic_search"
//!        └─ categories: web / scholarly / document / crawl
//! ```
//!
//! The [`ToolCategory`](entities::ToolCategory) of a tool drives the
//! per-plan tool budget (at most one web-style and one scholarly-style
//! call) and the enforced-tool directive.
//!
//! # Key Types
//!
//! - [`ToolSpec`] - Catalog of tool definitions plus alias mappings
//! - [`ToolDefinition`] - Name, description, category and parameters
//! - [`Capability`] - Execution contract implemented in infrastructure
//! - [`ToolOutput`] / [`ToolError`] - Execution outcome

pub mod capability;
pub mod entities;
pub mod value_objects;

pub use capability::Capability;
pub use entities::{ToolCategory, ToolDefinition, ToolSpec};
pub use value_objects::{ToolError, ToolOutput};
