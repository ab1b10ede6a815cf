//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod evaluate_plans;
pub mod execute_plan;
pub mod failover;
pub mod generate_plans;
pub mod orchestrate;
pub mod route_provider;
pub mod synthesize;
