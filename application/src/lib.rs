//! Application layer for tutor-reasoning
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{OrchestrationParams, RoutingTable};
pub use ports::{
    llm_gateway::{GatewayError, GenerationOptions, LlmGateway},
    performance_store::{ModelStats, NoPerformanceStore, PerformanceRecord, PerformanceStore},
    provider_probe::{AssumeAlive, LocalProviderProbe},
    thought_notifier::{NoThoughts, ThoughtNotifier},
    tool_executor::ToolExecutorPort,
};
pub use use_cases::evaluate_plans::{PlanEvaluator, PlanSelection};
pub use use_cases::execute_plan::{ExecutionOutcome, TaskExecutor};
pub use use_cases::failover::{Completion, FailoverInvoker, LlmRequest};
pub use use_cases::generate_plans::{PlanGeneration, PlanGenerator};
pub use use_cases::orchestrate::{OrchestrateError, RunReasoningUseCase};
pub use use_cases::route_provider::ProviderRouter;
pub use use_cases::synthesize::{Synthesis, Synthesizer};
