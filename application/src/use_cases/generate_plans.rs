//! Plan generation.
//!
//! One model call proposes candidate plans. Parsed plans are rewritten to
//! obey the [`ToolDirective`] and validated as dependency graphs; anything
//! unusable is dropped. When nothing survives, including when the model
//! call itself fails, the single-task default plan is returned.

use crate::ports::llm_gateway::GenerationOptions;
use crate::ports::tool_executor::ToolExecutorPort;
use crate::use_cases::failover::{FailoverInvoker, LlmRequest};
use reasoning_domain::{
    Plan, PromptTemplate, ProviderDecision, Query, ToolDirective, default_plan, parse_plans,
    validate_plan,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Candidate plans for a query.
#[derive(Debug, Clone)]
pub struct PlanGeneration {
    /// Never empty
    pub plans: Vec<Plan>,
    /// True when the default plan replaced the model's proposal
    pub used_default: bool,
}

pub struct PlanGenerator {
    invoker: Arc<FailoverInvoker>,
    tools: Arc<dyn ToolExecutorPort>,
}

impl PlanGenerator {
    pub fn new(invoker: Arc<FailoverInvoker>, tools: Arc<dyn ToolExecutorPort>) -> Self {
        Self { invoker, tools }
    }

    pub async fn generate(
        &self,
        query: &Query,
        decision: &ProviderDecision,
        directive: &ToolDirective,
        branches: usize,
    ) -> PlanGeneration {
        let catalog = self.tools.tool_spec();
        let prompt = PromptTemplate::planning_prompt(query.text(), catalog, directive, branches);
        let options = GenerationOptions::json();
        let request = LlmRequest::new(&prompt, PromptTemplate::planning_system(), &options)
            .with_history(query.history());

        let response = match self.invoker.call(decision, request).await {
            Ok(completion) => completion.text,
            Err(e) => {
                warn!(error = %e, "Plan generation call failed, using default plan");
                return self.fallback(query, directive);
            }
        };

        let mut plans = Vec::new();
        for mut plan in parse_plans(&response, branches) {
            let report = directive.apply(&mut plan, catalog);
            if !report.is_clean() {
                debug!(
                    plan = %plan.name,
                    enforced = report.enforced,
                    downgraded = report.downgraded,
                    unknown = ?report.unknown,
                    "Adjusted plan tool calls"
                );
            }

            match validate_plan(&mut plan) {
                Ok(stripped) => {
                    for s in &stripped {
                        warn!(plan = %plan.name, task = %s.task, missing = %s.missing, "Stripped unknown dependency");
                    }
                    plans.push(plan);
                }
                Err(e) => warn!(plan = %plan.name, error = %e, "Discarding invalid plan"),
            }
        }

        if plans.is_empty() {
            warn!("No usable plan in model response, using default plan");
            return self.fallback(query, directive);
        }

        info!(count = plans.len(), "Generated candidate plans");
        PlanGeneration {
            plans,
            used_default: false,
        }
    }

    fn fallback(&self, query: &Query, directive: &ToolDirective) -> PlanGeneration {
        PlanGeneration {
            plans: vec![default_plan(query.text(), directive.enforced_tool())],
            used_default: true,
        }
    }
}
