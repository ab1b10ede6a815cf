//! Plan evaluation.
//!
//! The model names the best candidate. A single candidate is returned
//! without asking. Any failure (call error, unparseable reply, unknown
//! name) selects the first candidate.

use crate::ports::llm_gateway::GenerationOptions;
use crate::use_cases::failover::{FailoverInvoker, LlmRequest};
use reasoning_domain::{Plan, PromptTemplate, ProviderDecision, Query, extract_payload};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct Verdict {
    best_plan_name: String,
}

/// The winning plan and how it was picked.
#[derive(Debug, Clone)]
pub struct PlanSelection {
    pub plan: Plan,
    /// Position among the candidates
    pub index: usize,
    /// True when the first candidate was taken because evaluation failed
    pub fallback: bool,
}

pub struct PlanEvaluator {
    invoker: Arc<FailoverInvoker>,
}

impl PlanEvaluator {
    pub fn new(invoker: Arc<FailoverInvoker>) -> Self {
        Self { invoker }
    }

    /// Pick one of `candidates`. Returns `None` only for an empty slate.
    pub async fn select(
        &self,
        query: &Query,
        decision: &ProviderDecision,
        mut candidates: Vec<Plan>,
    ) -> Option<PlanSelection> {
        match candidates.len() {
            0 => return None,
            1 => {
                return candidates.pop().map(|plan| PlanSelection {
                    plan,
                    index: 0,
                    fallback: false,
                });
            }
            _ => {}
        }

        let index = match self.ask(query, decision, &candidates).await {
            Some(index) => {
                info!(plan = %candidates[index].name, "Evaluator selected plan");
                index
            }
            None => {
                warn!(plan = %candidates[0].name, "Plan evaluation failed, using first candidate");
                return Some(PlanSelection {
                    plan: candidates.swap_remove(0),
                    index: 0,
                    fallback: true,
                });
            }
        };

        Some(PlanSelection {
            plan: candidates.swap_remove(index),
            index,
            fallback: false,
        })
    }

    async fn ask(&self, query: &Query, decision: &ProviderDecision, candidates: &[Plan]) -> Option<usize> {
        let prompt = PromptTemplate::evaluation_prompt(query.text(), candidates);
        let options = GenerationOptions::json();
        let request = LlmRequest::new(&prompt, PromptTemplate::evaluation_system(), &options);

        let response = match self.invoker.call(decision, request).await {
            Ok(completion) => completion.text,
            Err(e) => {
                warn!(error = %e, "Plan evaluation call failed");
                return None;
            }
        };

        let verdict: Verdict = extract_payload(&response)?;
        let wanted = verdict.best_plan_name.trim();
        candidates
            .iter()
            .position(|p| p.name == wanted)
            .or_else(|| {
                candidates
                    .iter()
                    .position(|p| p.name.trim().eq_ignore_ascii_case(wanted))
            })
    }
}
