//! Application-level configuration.
//!
//! - [`OrchestrationParams`] - gate, turn budget, reflection and pruning knobs
//! - [`RoutingTable`] - routable models, subject mappings and fallbacks

pub mod orchestration_params;
pub mod routing_table;

pub use orchestration_params::OrchestrationParams;
pub use routing_table::RoutingTable;
