//! Run Reasoning use case.
//!
//! Top-level sequencing of one orchestration run:
//!
//! 1. Score the query with the complexity gate and route it to a model
//! 2. SIMPLE: one direct model call, no planning
//! 3. COMPLEX: [`PlanGenerator`] → [`PlanEvaluator`] → [`TaskExecutor`] →
//!    [`Synthesizer`], streaming thoughts throughout
//!
//! Only the direct path can fail. The tree-of-thought path degrades at every
//! stage instead (default plan, first candidate, raw findings).

use crate::config::OrchestrationParams;
use crate::ports::llm_gateway::{GatewayError, GenerationOptions, LlmGateway};
use crate::ports::performance_store::{NoPerformanceStore, PerformanceStore};
use crate::ports::thought_notifier::ThoughtNotifier;
use crate::ports::tool_executor::ToolExecutorPort;
use crate::use_cases::evaluate_plans::PlanEvaluator;
use crate::use_cases::execute_plan::TaskExecutor;
use crate::use_cases::failover::{FailoverInvoker, LlmRequest};
use crate::use_cases::generate_plans::PlanGenerator;
use crate::use_cases::route_provider::ProviderRouter;
use crate::use_cases::synthesize::Synthesizer;
use reasoning_domain::{
    ComplexityAssessment, OrchestrationResult, PipelinePath, PromptTemplate, ProviderDecision,
    Query, SourcePipeline, Task, TaskResult, ThoughtEvent, ToolDirective, assess_with_threshold,
    default_plan,
};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can end a run without an answer.
#[derive(Error, Debug)]
pub enum OrchestrateError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

/// Use case for answering one query.
///
/// The router is shared across runs so its decision cache survives between
/// questions of a chat session.
pub struct RunReasoningUseCase {
    gateway: Arc<dyn LlmGateway>,
    tools: Arc<dyn ToolExecutorPort>,
    router: Arc<ProviderRouter>,
    performance: Arc<dyn PerformanceStore>,
    params: OrchestrationParams,
}

impl RunReasoningUseCase {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        tools: Arc<dyn ToolExecutorPort>,
        router: Arc<ProviderRouter>,
    ) -> Self {
        Self {
            gateway,
            tools,
            router,
            performance: Arc::new(NoPerformanceStore),
            params: OrchestrationParams::default(),
        }
    }

    pub fn with_performance_store(mut self, store: Arc<dyn PerformanceStore>) -> Self {
        self.performance = store;
        self
    }

    pub fn with_params(mut self, params: OrchestrationParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &OrchestrationParams {
        &self.params
    }

    pub async fn execute(
        &self,
        query: Query,
        notifier: &dyn ThoughtNotifier,
    ) -> Result<OrchestrationResult, OrchestrateError> {
        let transcript = Transcript::new(notifier);
        let complexity = assess_with_threshold(&query, self.params.complexity_threshold);
        let decision = self.router.route(&query, &complexity).await;

        info!(
            score = complexity.score,
            complex = complexity.is_complex,
            model = %decision.chosen,
            logic = %decision.logic,
            category = %decision.query_category,
            "Starting orchestration"
        );

        let invoker = Arc::new(
            FailoverInvoker::new(self.gateway.clone())
                .with_performance_store(self.performance.clone()),
        );

        if complexity.is_complex {
            Ok(self
                .tree_of_thought(&query, &complexity, &decision, invoker, &transcript)
                .await)
        } else {
            self.direct(&query, &complexity, &decision, &invoker, &transcript)
                .await
        }
    }

    async fn direct(
        &self,
        query: &Query,
        complexity: &ComplexityAssessment,
        decision: &ProviderDecision,
        invoker: &FailoverInvoker,
        transcript: &Transcript<'_>,
    ) -> Result<OrchestrationResult, OrchestrateError> {
        transcript.on_thought(&ThoughtEvent::note(format!(
            "Query classified as SIMPLE (score {}), answering directly",
            complexity.score
        )));

        let prompt = PromptTemplate::direct_prompt(query.text());
        let options = GenerationOptions::default();
        let request = LlmRequest::new(&prompt, PromptTemplate::direct_system(), &options)
            .with_history(query.history());
        let completion = invoker.call(decision, request).await?;

        Ok(OrchestrationResult {
            final_answer: completion.text.trim().to_string(),
            thoughts: transcript.take(),
            reasoning_steps: None,
            references: Vec::new(),
            source_pipeline: SourcePipeline::new(PipelinePath::Direct, completion.served_by),
        })
    }

    async fn tree_of_thought(
        &self,
        query: &Query,
        complexity: &ComplexityAssessment,
        decision: &ProviderDecision,
        invoker: Arc<FailoverInvoker>,
        transcript: &Transcript<'_>,
    ) -> OrchestrationResult {
        let branches = complexity.branch_count_above(self.params.deep_branch_score);
        transcript.on_thought(&ThoughtEvent::note(format!(
            "Query classified as COMPLEX (score {}), exploring {} strategies",
            complexity.score, branches
        )));

        let directive = ToolDirective::for_query(query);
        if let Some(tool) = directive.enforced_tool() {
            transcript.on_thought(&ThoughtEvent::note(format!("Every step will use {}", tool)));
        }

        let generation = PlanGenerator::new(invoker.clone(), self.tools.clone())
            .generate(query, decision, &directive, branches)
            .await;
        if generation.used_default {
            transcript.on_thought(&ThoughtEvent::warning(
                "Planning failed, falling back to a single direct step",
            ));
        }
        transcript.on_thought(&ThoughtEvent::note(format!(
            "Generated {} candidate plan(s)",
            generation.plans.len()
        )));

        let plan = match PlanEvaluator::new(invoker.clone())
            .select(query, decision, generation.plans)
            .await
        {
            Some(selection) => selection.plan,
            None => default_plan(query.text(), directive.enforced_tool()),
        };
        transcript.on_thought(&ThoughtEvent::note(format!(
            "Selected plan: {} ({} step(s))",
            plan.name,
            plan.tasks.len()
        )));

        let outcome = TaskExecutor::new(invoker.clone(), self.tools.clone(), self.params.clone())
            .with_directive(directive)
            .run(query, decision, plan, transcript)
            .await;

        let mut findings = outcome.findings();
        if findings.is_empty() {
            findings = "No findings were produced.".to_string();
        }

        let synthesis = Synthesizer::new(invoker)
            .synthesize(query, decision, &findings)
            .await;
        if synthesis.degraded {
            transcript.on_thought(&ThoughtEvent::warning(
                "Synthesis failed, returning the raw findings",
            ));
        } else {
            transcript.on_thought(&ThoughtEvent::note("Synthesized final answer"));
        }

        let served_by = synthesis
            .served_by
            .unwrap_or_else(|| decision.chosen.clone());
        let mut pipeline = SourcePipeline::new(PipelinePath::TreeOfThought, served_by);
        if synthesis.degraded {
            warn!("Run finished in degraded mode");
            pipeline = pipeline.degraded();
        }

        OrchestrationResult {
            final_answer: synthesis.answer,
            thoughts: transcript.take(),
            reasoning_steps: Some(outcome.steps),
            references: outcome.references.numbered(),
            source_pipeline: pipeline,
        }
    }
}

/// Forwards events to the caller's notifier and keeps their text.
struct Transcript<'a> {
    inner: &'a dyn ThoughtNotifier,
    thoughts: Mutex<Vec<String>>,
}

impl<'a> Transcript<'a> {
    fn new(inner: &'a dyn ThoughtNotifier) -> Self {
        Self {
            inner,
            thoughts: Mutex::new(Vec::new()),
        }
    }

    fn take(&self) -> Vec<String> {
        self.thoughts
            .lock()
            .map(|mut t| std::mem::take(&mut *t))
            .unwrap_or_default()
    }
}

impl ThoughtNotifier for Transcript<'_> {
    fn on_thought(&self, event: &ThoughtEvent) {
        if let Ok(mut thoughts) = self.thoughts.lock() {
            thoughts.push(event.content.clone());
        }
        self.inner.on_thought(event);
    }

    fn on_task_start(&self, task: &Task, position: usize, total: usize) {
        self.inner.on_task_start(task, position, total);
    }

    fn on_task_complete(&self, task: &Task, result: &TaskResult) {
        self.inner.on_task_complete(task, result);
    }
}
