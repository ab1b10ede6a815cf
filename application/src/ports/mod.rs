//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod llm_gateway;
pub mod performance_store;
pub mod provider_probe;
pub mod thought_notifier;
pub mod tool_executor;
