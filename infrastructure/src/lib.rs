//! Infrastructure layer for tutor-reasoning
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: HTTP LLM providers, retrieval capabilities, the JSONL
//! performance store and configuration file loading.

pub mod config;
pub mod performance;
pub mod providers;
pub mod tools;

// Re-export commonly used types
pub use config::{ConfigLoader, ConfigValidationError, FileConfig, FileOutputConfig};
pub use performance::JsonlPerformanceStore;
pub use providers::{
    GeminiAdapter, OllamaAdapter, OllamaProbe, OpenAiAdapter, ProviderAdapter, RoutingGateway,
    build_adapters, build_probe,
};
pub use tools::{CapabilityRegistry, standard_registry};
