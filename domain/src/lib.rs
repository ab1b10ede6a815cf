//! Domain layer for tutor-reasoning
//!
//! This crate contains the pure decision logic of the reasoning orchestration
//! engine. It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Complexity Gate
//!
//! Every query is scored 0-100 ([`ComplexityAssessment`]). Simple queries are
//! answered directly; complex queries go through planning.
//!
//! ## Tree of Thought
//!
//! - **Plan**: a named dependency graph of [`Task`]s, one candidate strategy
//! - **Reasoning step**: one Thought/Action/Observation turn of a task
//! - **Pruning**: low confidence abandons the remaining tasks early
//!
//! ## Provider routing
//!
//! A [`ProviderDecision`] names the chosen model plus an ordered fallback
//! chain used when the chosen provider reports quota exhaustion.

pub mod config;
pub mod core;
pub mod orchestration;
pub mod plan;
pub mod prompt;
pub mod reasoning;
pub mod reference;
pub mod routing;
pub mod tool;
pub mod util;

// Re-export commonly used types
pub use config::OutputFormat;
pub use core::{
    error::DomainError,
    query::{ChatRole, ChatTurn, Query, RequestContext, SearchModes},
};
pub use orchestration::{
    complexity::{COMPLEXITY_THRESHOLD, ComplexityAssessment, DEEP_BRANCH_SCORE, assess, assess_with_threshold},
    result::{OrchestrationResult, PipelinePath, SourcePipeline},
    thought::{ThoughtEvent, ThoughtKind},
};
pub use plan::{
    entities::{Plan, Task, TaskStatus, ToolInvocation},
    graph::{PlanValidationError, StrippedDependency, TaskScheduler, validate_plan},
    parser::{default_plan, parse_plans},
    policy::{DirectiveReport, ToolAdmission, ToolDirective, ToolUsage},
    value_objects::{TaskId, TaskResult},
};
pub use prompt::{DEGRADED_NOTICE, PromptTemplate};
pub use reasoning::{
    pruner::{ConfidencePruner, PruneDecision, PruneReason},
    step::{REFLECTION_THRESHOLD, ReasoningStep, parse_reasoning_step, try_parse_reasoning_step},
};
pub use reference::{RawReference, Reference, ReferenceLedger};
pub use routing::{
    category::{QueryCategory, classify_query},
    decision::{ProviderDecision, RoutingLogic, build_fallback_chain},
    provider::{ModelTarget, ProviderKind},
    tier::{ModelProfile, ModelTier},
};
pub use tool::{
    capability::Capability,
    entities::{ToolCategory, ToolDefinition, ToolParameter, ToolSpec},
    value_objects::{ToolError, ToolOutput},
};
pub use util::{
    payload::{extract_json_object, extract_payload},
    truncate_str,
};
