//! Hierarchical task execution.
//!
//! Tasks of the selected plan run strictly one at a time. Each scheduling
//! pass takes every task the [`TaskScheduler`] has released and runs them in
//! plan order; the number of passes is capped at a multiple of the task
//! count. A task sees the results of all its direct and transitive
//! dependencies, in completion order. Each task runs a bounded
//! Thought/Action/Observation loop:
//!
//! ```text
//! turn 1..=max_turns:
//!   step = model(task, dependency results + own observations)
//!   low confidence and not yet corrected => one reflection pass
//!   no action            => task result = final_answer, stop
//!   unknown action       => task result = final_answer, stop (warning thought)
//!   known action         => admit under the tool directive, run the tool
//!                           (or the enforced one), append observation, continue
//!   over budget          => append a budget-exhausted observation, continue
//! budget exhausted       => task result = last final_answer seen
//! ```
//!
//! After every task the confidence pruner may abandon the rest of the plan.

use crate::config::OrchestrationParams;
use crate::ports::llm_gateway::{GatewayError, GenerationOptions};
use crate::ports::thought_notifier::ThoughtNotifier;
use crate::ports::tool_executor::ToolExecutorPort;
use crate::use_cases::failover::{FailoverInvoker, LlmRequest};
use reasoning_domain::reasoning::step::DEFAULT_CONFIDENCE;
use reasoning_domain::{
    Plan, PromptTemplate, PruneDecision, PruneReason, ProviderDecision, Query, ReasoningStep,
    ReferenceLedger, Task, TaskId, TaskResult, TaskScheduler, ThoughtEvent, ToolAdmission,
    ToolDirective, ToolUsage, parse_reasoning_step, truncate_str, try_parse_reasoning_step,
};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

const OBSERVATION_PREVIEW_CHARS: usize = 300;

/// Everything a plan execution produced.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    /// The plan with final task statuses and results
    pub plan: Plan,
    /// Every reasoning step, in execution order
    pub steps: Vec<ReasoningStep>,
    pub references: ReferenceLedger,
    /// Completed task ids, in completion order
    pub completed: Vec<TaskId>,
    pub pruned: Option<PruneReason>,
    /// Scheduling passes used
    pub passes: usize,
}

impl ExecutionOutcome {
    /// Completed task results, labelled, in completion order.
    pub fn findings(&self) -> String {
        self.completed
            .iter()
            .filter_map(|id| self.plan.task(id))
            .filter_map(|task| {
                task.result
                    .as_ref()
                    .map(|r| format!("[{}] {}\n{}", task.id, task.description, r.output))
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Mutable state shared by all tasks of one run.
struct RunState {
    steps: Vec<ReasoningStep>,
    references: ReferenceLedger,
    directive: ToolDirective,
    usage: ToolUsage,
}

pub struct TaskExecutor {
    invoker: Arc<FailoverInvoker>,
    tools: Arc<dyn ToolExecutorPort>,
    params: OrchestrationParams,
    directive: Option<ToolDirective>,
}

impl TaskExecutor {
    pub fn new(
        invoker: Arc<FailoverInvoker>,
        tools: Arc<dyn ToolExecutorPort>,
        params: OrchestrationParams,
    ) -> Self {
        Self {
            invoker,
            tools,
            params,
            directive: None,
        }
    }

    /// Tool directive for run-time calls; derived from the query when unset.
    pub fn with_directive(mut self, directive: ToolDirective) -> Self {
        self.directive = Some(directive);
        self
    }

    pub async fn run(
        &self,
        query: &Query,
        decision: &ProviderDecision,
        mut plan: Plan,
        notifier: &dyn ThoughtNotifier,
    ) -> ExecutionOutcome {
        let total = plan.tasks.len();
        let cap = self.params.iteration_cap(total);
        let pruner = self.params.pruner();
        let mut scheduler = TaskScheduler::new(&plan);
        let mut state = RunState {
            steps: Vec::new(),
            references: ReferenceLedger::new(),
            directive: self
                .directive
                .clone()
                .unwrap_or_else(|| ToolDirective::for_query(query)),
            usage: ToolUsage::default(),
        };
        let mut completed: Vec<TaskId> = Vec::new();
        let mut pruned = None;
        let mut passes = 0;

        info!(plan = %plan.name, tasks = total, "Executing plan");

        'passes: loop {
            let ready = scheduler.take_ready();
            if ready.is_empty() {
                break;
            }
            // Each task is released once, so passes stay within the task count.
            passes += 1;
            if passes > cap {
                warn!(cap, "Iteration cap reached, stopping execution");
                break;
            }
            debug!(pass = passes, ready = ready.len(), "Scheduling pass");

            for task_id in ready {
                let Some(task) = plan.task_mut(&task_id) else {
                    continue;
                };
                task.mark_running();
                let task = task.clone();
                let position = completed.len();

                notifier.on_task_start(&task, position + 1, total);
                let dependency_context = dependency_context(&plan, &task, &completed);
                let result = self
                    .run_task(query, decision, &task, &dependency_context, notifier, &mut state)
                    .await;
                let confidence = result.confidence;
                notifier.on_task_complete(&task, &result);
                info!(
                    task = %task.id,
                    confidence,
                    turns = result.turns,
                    exhausted = result.exhausted,
                    "Task completed"
                );

                if let Some(t) = plan.task_mut(&task_id) {
                    t.mark_completed(result);
                }
                scheduler.complete(&task_id);
                completed.push(task_id);

                if let PruneDecision::Prune { reason, .. } =
                    pruner.evaluate(confidence, position, total)
                    && !plan.is_complete()
                {
                    let skipped = plan.skip_remaining();
                    warn!(%reason, confidence, skipped, "Pruning remaining tasks");
                    notifier.on_thought(&ThoughtEvent::warning(format!(
                        "Pruning {} remaining task(s): {} (confidence {:.2})",
                        skipped, reason, confidence
                    )));
                    pruned = Some(reason);
                    break 'passes;
                }
            }
        }

        let stranded = plan.skip_remaining();
        if stranded > 0 {
            warn!(stranded, "Tasks skipped because their dependencies never completed");
            notifier.on_thought(&ThoughtEvent::warning(format!(
                "{} task(s) skipped: their dependencies never completed",
                stranded
            )));
        }

        ExecutionOutcome {
            plan,
            steps: state.steps,
            references: state.references,
            completed,
            pruned,
            passes,
        }
    }

    async fn run_task(
        &self,
        query: &Query,
        decision: &ProviderDecision,
        task: &Task,
        dependency_context: &str,
        notifier: &dyn ThoughtNotifier,
        state: &mut RunState,
    ) -> TaskResult {
        let max_turns = self.params.max_turns.max(1);
        let mut observations = String::new();
        let mut last_answer: Option<String> = None;
        let mut confidence = DEFAULT_CONFIDENCE;

        for turn in 1..=max_turns {
            let context = join_context(dependency_context, &observations);
            let step = self
                .reason(query, decision, task, &context, turn, notifier)
                .await;

            if !step.thought.is_empty() {
                notifier.on_thought(&ThoughtEvent::reasoning(format!(
                    "[{}] {}",
                    task.id, step.thought
                )));
            }
            confidence = step.confidence_score;
            if let Some(answer) = &step.final_answer {
                last_answer = Some(answer.clone());
            }
            state.steps.push(step.clone());

            let Some(action) = step.action.as_deref() else {
                let output = last_answer
                    .clone()
                    .unwrap_or_else(|| fallback_output(&step, &observations));
                return TaskResult::new(output, confidence, turn);
            };

            let Some(tool) = self.tools.resolve(action) else {
                warn!(task = %task.id, tool = action, "Unknown tool requested, ending task");
                notifier.on_thought(&ThoughtEvent::warning(format!(
                    "[{}] Unknown tool '{}' requested; ending task",
                    task.id, action
                )));
                let output = step
                    .final_answer
                    .clone()
                    .or_else(|| last_answer.clone())
                    .unwrap_or_else(|| fallback_output(&step, &observations));
                return TaskResult::new(output, confidence, turn);
            };

            let mut input = step.action_input.clone();
            let tool = match state
                .directive
                .admit(&tool, self.tools.tool_spec(), &mut state.usage)
            {
                ToolAdmission::Allowed => tool,
                ToolAdmission::Redirected { tool: enforced } => {
                    debug!(task = %task.id, requested = %tool, enforced = %enforced, "Redirecting tool call");
                    notifier.on_thought(&ThoughtEvent::warning(format!(
                        "[{}] {} is not available here; using {}",
                        task.id, tool, enforced
                    )));
                    input
                        .entry("query".to_string())
                        .or_insert_with(|| Value::String(task.description.clone()));
                    enforced
                }
                ToolAdmission::OverBudget { category } => {
                    warn!(task = %task.id, tool = %tool, category = category.as_str(), "Tool budget exhausted");
                    notifier.on_thought(&ThoughtEvent::warning(format!(
                        "[{}] {} search budget exhausted; skipping {}",
                        task.id,
                        category.as_str(),
                        tool
                    )));
                    observations.push_str(&format!(
                        "Observation from {} (turn {}): the {} search budget for this plan is exhausted. \
                         Answer from the information already gathered.\n\n",
                        tool,
                        turn,
                        category.as_str()
                    ));
                    continue;
                }
            };

            notifier.on_thought(&ThoughtEvent::action(format!(
                "[{}] Calling {}({})",
                task.id,
                tool,
                render_input(&input)
            )));

            match self
                .tools
                .execute(&tool, &input, query.context())
                .await
            {
                Ok(output) => {
                    let added = state.references.merge(output.references);
                    debug!(task = %task.id, tool = %tool, new_references = added, "Tool succeeded");
                    notifier.on_thought(&ThoughtEvent::observation(format!(
                        "[{}] {}",
                        task.id,
                        truncate_str(&output.output, OBSERVATION_PREVIEW_CHARS)
                    )));
                    observations.push_str(&format!(
                        "Observation from {} (turn {}):\n{}\n\n",
                        tool, turn, output.output
                    ));
                }
                Err(e) => {
                    warn!(task = %task.id, tool = %tool, error = %e, "Tool failed");
                    notifier.on_thought(&ThoughtEvent::warning(format!(
                        "[{}] {} failed: {}",
                        task.id, tool, e
                    )));
                    observations.push_str(&format!(
                        "Observation from {} (turn {}): the tool failed with {}. Try a different approach.\n\n",
                        tool, turn, e
                    ));
                }
            }
        }

        warn!(task = %task.id, max_turns, "Turn budget exhausted");
        let output = last_answer.unwrap_or_else(|| {
            if observations.trim().is_empty() {
                "No answer was produced within the turn budget.".to_string()
            } else {
                observations.trim().to_string()
            }
        });
        TaskResult::new(output, confidence, max_turns).exhausted()
    }

    /// One reasoning step, with a reflection pass when confidence is low.
    async fn reason(
        &self,
        query: &Query,
        decision: &ProviderDecision,
        task: &Task,
        context: &str,
        turn: usize,
        notifier: &dyn ThoughtNotifier,
    ) -> ReasoningStep {
        let prompt = PromptTemplate::react_prompt(
            query.text(),
            task,
            context,
            turn,
            self.params.max_turns.max(1),
            self.tools.tool_spec(),
        );
        let options = GenerationOptions::json();
        let request = LlmRequest::new(&prompt, PromptTemplate::react_system(), &options);

        let step = match self.invoker.call(decision, request).await {
            Ok(completion) => parse_reasoning_step(&completion.text, &task.id, turn),
            Err(e) => return failed_step(task, turn, &e),
        };

        if !step.needs_reflection_below(self.params.reflection_threshold) {
            return step;
        }

        debug!(task = %task.id, confidence = step.confidence_score, "Reflecting on low-confidence step");
        notifier.on_thought(&ThoughtEvent::note(format!(
            "[{}] Low confidence ({:.2}), reflecting",
            task.id, step.confidence_score
        )));

        let prompt = PromptTemplate::reflection_prompt(task, &step, context);
        let request = LlmRequest::new(&prompt, PromptTemplate::react_system(), &options);
        match self.invoker.call(decision, request).await {
            Ok(completion) => match try_parse_reasoning_step(&completion.text, &task.id, turn) {
                Some(corrected) => corrected.into_corrected(),
                None => {
                    warn!(task = %task.id, "Unparseable reflection, keeping original step");
                    step
                }
            },
            Err(e) => {
                warn!(task = %task.id, error = %e, "Reflection call failed, keeping original step");
                step
            }
        }
    }
}

/// Terminal zero-confidence step standing in for a failed model call.
fn failed_step(task: &Task, turn: usize, error: &GatewayError) -> ReasoningStep {
    warn!(task = %task.id, turn, error = %error, "Reasoning call failed");
    ReasoningStep {
        task_id: task.id.clone(),
        turn,
        thought: format!("Model call failed: {}", error),
        action: None,
        action_input: HashMap::new(),
        confidence_score: 0.0,
        corrected: false,
        final_answer: None,
    }
}

/// Results of every completed direct or transitive dependency, in
/// completion order.
fn dependency_context(plan: &Plan, task: &Task, completed: &[TaskId]) -> String {
    let mut ancestors: HashSet<&TaskId> = HashSet::new();
    let mut pending: Vec<&TaskId> = task.depends_on.iter().collect();
    while let Some(id) = pending.pop() {
        if !ancestors.insert(id) {
            continue;
        }
        if let Some(dep) = plan.task(id) {
            pending.extend(dep.depends_on.iter());
        }
    }

    completed
        .iter()
        .filter(|id| ancestors.contains(id))
        .filter_map(|id| plan.task(id))
        .filter_map(|dep| {
            dep.result
                .as_ref()
                .map(|r| format!("Result of [{}] {}:\n{}\n", dep.id, dep.description, r.output))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn join_context(dependencies: &str, observations: &str) -> String {
    match (dependencies.trim().is_empty(), observations.trim().is_empty()) {
        (true, _) => observations.to_string(),
        (false, true) => dependencies.to_string(),
        (false, false) => format!("{}\n{}", dependencies, observations),
    }
}

fn fallback_output(step: &ReasoningStep, observations: &str) -> String {
    if !observations.trim().is_empty() {
        observations.trim().to_string()
    } else if !step.thought.is_empty() {
        step.thought.clone()
    } else {
        "No answer produced.".to_string()
    }
}

fn render_input(input: &HashMap<String, Value>) -> String {
    let mut pairs: Vec<String> = input.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    pairs.sort();
    pairs.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::thought_notifier::NoThoughts;
    use crate::use_cases::failover::tests::{ScriptedGateway, decision_for};
    use crate::use_cases::generate_plans::tests::MockTools;
    use reasoning_domain::tool::entities::{ACADEMIC_SEARCH, DOCUMENT_SEARCH, WEB_SEARCH};
    use reasoning_domain::{
        ModelTarget, ProviderKind, RequestContext, TaskStatus, ThoughtKind, ToolError,
        ToolInvocation,
    };
    use std::sync::Mutex;

    fn final_step(answer: &str, confidence: f64) -> Result<String, GatewayError> {
        Ok(format!(
            r#"{{"thought": "done", "action": "none", "final_answer": "{}", "confidence_score": {}}}"#,
            answer, confidence
        ))
    }

    fn tool_step(tool: &str, query: &str) -> Result<String, GatewayError> {
        Ok(format!(
            r#"{{"thought": "need data", "action": "{}", "action_input": {{"query": "{}"}}, "confidence_score": 0.9}}"#,
            tool, query
        ))
    }

    struct Harness {
        executor: TaskExecutor,
        gateway: Arc<ScriptedGateway>,
        tools: Arc<MockTools>,
    }

    fn harness(responses: Vec<Result<String, GatewayError>>, tools: MockTools) -> Harness {
        let gateway = Arc::new(ScriptedGateway::new(responses));
        let invoker = Arc::new(FailoverInvoker::new(gateway.clone()));
        let tools = Arc::new(tools);
        Harness {
            executor: TaskExecutor::new(invoker, tools.clone(), OrchestrationParams::default()),
            gateway,
            tools,
        }
    }

    fn decision() -> ProviderDecision {
        decision_for(ModelTarget::new(ProviderKind::Gemini, "gemini-2.5-flash"))
    }

    #[tokio::test]
    async fn test_dependencies_run_first_and_feed_context() {
        // b is listed first but depends on a
        let plan = Plan::new("p")
            .with_task(Task::new("b", "use the data").with_dependency("a"))
            .with_task(Task::new("a", "gather data"));
        let h = harness(
            vec![
                tool_step("web_search", "boiling point"),
                final_step("water boils at 100C", 0.9),
                final_step("so tea needs 100C", 0.9),
            ],
            MockTools::new(),
        );
        let events = Mutex::new(Vec::new());
        let notifier = |e: &ThoughtEvent| events.lock().unwrap().push(e.clone());

        let outcome = h
            .executor
            .run(&Query::plain("tea?"), &decision(), plan, &notifier)
            .await;

        assert_eq!(outcome.completed, vec![TaskId::new("a"), TaskId::new("b")]);
        assert!(outcome.plan.tasks.iter().all(|t| t.status == TaskStatus::Completed));
        assert_eq!(outcome.steps.len(), 3);
        assert_eq!(outcome.references.len(), 1);
        assert_eq!(h.tools.call_names(), vec!["web_search"]);

        let prompts = h.gateway.prompts();
        assert!(prompts[1].contains("web_search result"));
        assert!(prompts[2].contains("Result of [a] gather data:\nwater boils at 100C"));

        let findings = outcome.findings();
        assert!(findings.starts_with("[a] gather data\nwater boils at 100C"));
        assert!(findings.ends_with("[b] use the data\nso tea needs 100C"));

        let kinds: Vec<ThoughtKind> = events.lock().unwrap().iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&ThoughtKind::Action));
        assert!(kinds.contains(&ThoughtKind::Observation));
    }

    #[tokio::test]
    async fn test_tool_error_becomes_observation() {
        let plan = Plan::new("p").with_task(Task::new("a", "search"));
        let h = harness(
            vec![tool_step("web_search", "x"), final_step("answered anyway", 0.8)],
            MockTools::with_outputs(vec![Err(ToolError::execution_failed("HTTP 503"))]),
        );

        let outcome = h
            .executor
            .run(&Query::plain("q"), &decision(), plan, &NoThoughts)
            .await;

        let result = outcome.plan.tasks[0].result.clone().unwrap();
        assert_eq!(result.output, "answered anyway");
        assert!(h.gateway.prompts()[1].contains("the tool failed with [EXECUTION_FAILED] HTTP 503"));
    }

    #[tokio::test]
    async fn test_unknown_tool_ends_task() {
        let plan = Plan::new("p").with_task(Task::new("a", "compute"));
        let unknown = Ok(r#"{"thought": "calc", "action": "calculator", "action_input": {"expr": "2+2"},
            "final_answer": "probably 4", "confidence_score": 0.8}"#
            .to_string());
        let h = harness(vec![unknown], MockTools::new());
        let events = Mutex::new(Vec::new());
        let notifier = |e: &ThoughtEvent| events.lock().unwrap().push(e.clone());

        let outcome = h.executor.run(&Query::plain("q"), &decision(), plan, &notifier).await;

        assert_eq!(outcome.plan.tasks[0].result.as_ref().unwrap().output, "probably 4");
        assert_eq!(h.gateway.call_count(), 1);
        assert!(h.tools.call_names().is_empty());
        assert!(
            events
                .lock()
                .unwrap()
                .iter()
                .any(|e| e.kind == ThoughtKind::Warning && e.content.contains("calculator"))
        );
    }

    #[tokio::test]
    async fn test_turn_budget_keeps_last_answer() {
        let plan = Plan::new("p").with_task(Task::new("a", "dig"));
        let with_answer = Ok(r#"{"thought": "more", "action": "web_search", "action_input": {"query": "q"},
            "final_answer": "partial answer", "confidence_score": 0.9}"#
            .to_string());
        let h = harness(
            vec![with_answer, tool_step("web_search", "q2"), tool_step("web_search", "q3")],
            MockTools::new(),
        );

        let outcome = h
            .executor
            .run(&Query::plain("q"), &decision(), plan, &NoThoughts)
            .await;

        let result = outcome.plan.tasks[0].result.clone().unwrap();
        assert_eq!(result.output, "partial answer");
        assert!(result.exhausted);
        assert_eq!(result.turns, 3);
        // one web call per plan; the rest are answered from the budget
        assert_eq!(h.tools.call_names(), vec!["web_search"]);
        assert!(h.gateway.prompts()[2].contains("web search budget for this plan is exhausted"));
    }

    #[tokio::test]
    async fn test_low_confidence_triggers_reflection() {
        let plan = Plan::new("p").with_task(Task::new("a", "think"));
        let h = harness(
            vec![final_step("unsure", 0.4), final_step("better", 0.85)],
            MockTools::new(),
        );

        let outcome = h
            .executor
            .run(&Query::plain("q"), &decision(), plan, &NoThoughts)
            .await;

        assert_eq!(h.gateway.call_count(), 2);
        assert!(h.gateway.prompts()[1].contains("low confidence (0.40)"));
        assert_eq!(outcome.steps.len(), 1);
        assert!(outcome.steps[0].corrected);
        assert_eq!(outcome.plan.tasks[0].result.as_ref().unwrap().output, "better");
    }

    #[tokio::test]
    async fn test_failed_reflection_keeps_original() {
        let plan = Plan::new("p").with_task(Task::new("a", "think"));
        let h = harness(
            vec![final_step("unsure", 0.6), Err(GatewayError::Timeout)],
            MockTools::new(),
        );

        let outcome = h
            .executor
            .run(&Query::plain("q"), &decision(), plan, &NoThoughts)
            .await;

        assert!(!outcome.steps[0].corrected);
        assert_eq!(outcome.plan.tasks[0].result.as_ref().unwrap().output, "unsure");
    }

    #[tokio::test]
    async fn test_critical_failure_prunes_remaining_tasks() {
        let plan = Plan::new("p")
            .with_task(Task::new("a", "first"))
            .with_task(Task::new("b", "second"))
            .with_task(Task::new("c", "third"));
        // low step, then an equally low reflection
        let h = harness(
            vec![final_step("no idea", 0.2), final_step("still no idea", 0.2)],
            MockTools::new(),
        );
        let events = Mutex::new(Vec::new());
        let notifier = |e: &ThoughtEvent| events.lock().unwrap().push(e.clone());

        let outcome = h.executor.run(&Query::plain("q"), &decision(), plan, &notifier).await;

        assert_eq!(outcome.pruned, Some(PruneReason::CriticalFailure));
        assert_eq!(outcome.completed, vec![TaskId::new("a")]);
        assert_eq!(outcome.plan.tasks[1].status, TaskStatus::Skipped);
        assert_eq!(outcome.plan.tasks[2].status, TaskStatus::Skipped);
        assert!(events.lock().unwrap().iter().any(|e| e.content.starts_with("Pruning 2 remaining")));
    }

    #[tokio::test]
    async fn test_stranded_tasks_are_skipped() {
        // validation would strip this; the executor must still terminate
        let plan = Plan::new("p")
            .with_task(Task::new("a", "first"))
            .with_task(Task::new("b", "second").with_dependency("ghost"));
        let h = harness(vec![final_step("A", 0.9)], MockTools::new());

        let outcome = h
            .executor
            .run(&Query::plain("q"), &decision(), plan, &NoThoughts)
            .await;

        assert_eq!(outcome.completed.len(), 1);
        assert_eq!(outcome.plan.tasks[1].status, TaskStatus::Skipped);
    }

    #[tokio::test]
    async fn test_model_failure_degrades_task() {
        let plan = Plan::new("p").with_task(Task::new("a", "first"));
        let h = harness(vec![Err(GatewayError::ConnectionError("down".into()))], MockTools::new());

        let outcome = h
            .executor
            .run(&Query::plain("q"), &decision(), plan, &NoThoughts)
            .await;

        let result = outcome.plan.tasks[0].result.clone().unwrap();
        assert_eq!(result.confidence, 0.0);
        assert!(result.output.contains("Model call failed"));
        assert_eq!(h.gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn test_chain_sees_transitive_results() {
        let plan = Plan::new("chain")
            .with_task(Task::new("c", "conclude").with_dependency("b"))
            .with_task(Task::new("b", "derive").with_dependency("a"))
            .with_task(Task::new("a", "recall"))
            .with_task(Task::new("x", "unrelated"));
        let h = harness(
            vec![
                final_step("ALPHA_FACT", 0.9),
                final_step("SIDE_FACT", 0.9),
                final_step("BETA_FACT", 0.9),
                final_step("GAMMA_FACT", 0.9),
            ],
            MockTools::new(),
        );

        let outcome = h
            .executor
            .run(&Query::plain("q"), &decision(), plan, &NoThoughts)
            .await;

        assert_eq!(
            outcome.completed,
            vec![TaskId::new("a"), TaskId::new("x"), TaskId::new("b"), TaskId::new("c")]
        );
        assert_eq!(outcome.passes, 3);

        let prompts = h.gateway.prompts();
        let c_prompt = &prompts[3];
        assert!(c_prompt.contains("ALPHA_FACT"));
        assert!(c_prompt.contains("BETA_FACT"));
        assert!(!c_prompt.contains("SIDE_FACT"));
        let alpha = c_prompt.find("ALPHA_FACT").unwrap();
        let beta = c_prompt.find("BETA_FACT").unwrap();
        assert!(alpha < beta);
    }

    #[tokio::test]
    async fn test_enforced_tool_replaces_requested_tool() {
        let query = Query::new("What does chapter 3 say?", RequestContext::new().with_document("doc-7"));
        let plan = Plan::new("p").with_task(
            Task::new("a", "read chapter 3")
                .with_tool_call(ToolInvocation::new(DOCUMENT_SEARCH).with_param("query", "chapter 3")),
        );
        let h = harness(
            vec![
                tool_step("web_search", "chapter 3"),
                tool_step("web", "chapter 3 summary"),
                final_step("chapter 3 covers kinetics", 0.9),
            ],
            MockTools::new(),
        );
        let events = Mutex::new(Vec::new());
        let notifier = |e: &ThoughtEvent| events.lock().unwrap().push(e.clone());

        let outcome = h
            .executor
            .with_directive(ToolDirective::for_query(&query))
            .run(&query, &decision(), plan, &notifier)
            .await;

        assert_eq!(h.tools.call_names(), vec![DOCUMENT_SEARCH, DOCUMENT_SEARCH]);
        let calls = h.tools.calls.lock().unwrap();
        assert_eq!(calls[0].1["query"], "chapter 3");
        assert_eq!(calls[1].1["query"], "chapter 3 summary");
        assert_eq!(
            outcome.plan.tasks[0].result.as_ref().unwrap().output,
            "chapter 3 covers kinetics"
        );
        assert!(
            events
                .lock()
                .unwrap()
                .iter()
                .any(|e| e.kind == ThoughtKind::Warning && e.content.contains("using document_search"))
        );
    }

    #[tokio::test]
    async fn test_budget_is_shared_across_tasks() {
        let plan = Plan::new("p")
            .with_task(Task::new("a", "first look"))
            .with_task(Task::new("b", "second look"));
        let h = harness(
            vec![
                tool_step("web_search", "one"),
                final_step("A", 0.9),
                tool_step("web_search", "two"),
                tool_step("academic_search", "three"),
                final_step("B", 0.9),
            ],
            MockTools::new(),
        );

        let outcome = h
            .executor
            .run(&Query::plain("q"), &decision(), plan, &NoThoughts)
            .await;

        assert_eq!(h.tools.call_names(), vec![WEB_SEARCH, ACADEMIC_SEARCH]);
        assert!(h.gateway.prompts()[3].contains("web search budget for this plan is exhausted"));
        assert_eq!(outcome.completed.len(), 2);
    }

    #[tokio::test]
    async fn test_more_sources_lifts_run_budget() {
        let plan = Plan::new("p").with_task(Task::new("a", "survey"));
        let h = harness(
            vec![
                tool_step("web_search", "one"),
                tool_step("web_search", "two"),
                final_step("done", 0.9),
            ],
            MockTools::new(),
        );

        h.executor
            .run(&Query::plain("check multiple sources on this"), &decision(), plan, &NoThoughts)
            .await;

        assert_eq!(h.tools.call_names(), vec![WEB_SEARCH, WEB_SEARCH]);
    }
}
