//! Prompt templates for the reasoning pipeline

use crate::plan::entities::{Plan, Task};
use crate::plan::policy::ToolDirective;
use crate::reasoning::step::ReasoningStep;
use crate::tool::entities::ToolSpec;

/// Notice prepended to raw findings when synthesis fails.
pub const DEGRADED_NOTICE: &str = "Warning: the final synthesis step failed, so the raw findings gathered for each task are shown below.";

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for the direct (simple query) path
    pub fn direct_system() -> &'static str {
        r#"You are a patient, knowledgeable tutor.
Answer the student's question clearly and accurately.
Keep simple answers short; show the key steps when a calculation is involved."#
    }

    pub fn direct_prompt(question: &str) -> String {
        format!("Question: {}\n\nAnswer:", question)
    }

    /// System prompt for plan generation
    pub fn planning_system() -> &'static str {
        r#"You are a planning assistant for a tutoring system.
Break the student's question into small, concrete research or reasoning steps.
Respond ONLY with JSON. Do not add commentary outside the JSON object."#
    }

    pub fn planning_prompt(
        question: &str,
        catalog: &ToolSpec,
        directive: &ToolDirective,
        branches: usize,
    ) -> String {
        let mut prompt = format!(
            r#"Question: {}

Propose {} alternative plans for answering this question. Each plan is a named
list of steps. Each step has an id, a description, the ids of steps it depends
on, and an optional tool call.

Available tools:
"#,
            question, branches
        );

        for tool in catalog.all() {
            prompt.push_str(&format!("- {}\n", tool.signature()));
        }

        prompt.push_str("\nTool rules:\n");
        match directive {
            ToolDirective::Enforced { tool } => prompt.push_str(&format!(
                "- Every step MUST use the tool \"{}\". Do not use any other tool.\n",
                tool
            )),
            ToolDirective::Budgeted { allow_extra } => {
                prompt.push_str("- For each step choose either no tool (tool_call: null) or one tool.\n");
                if !allow_extra {
                    prompt.push_str(
                        "- Use at most ONE web search and at most ONE academic search per plan.\n",
                    );
                }
            }
        }

        prompt.push_str(
            r#"
Respond with JSON in exactly this shape:
{"plans": [{"name": "short plan name", "steps": [
  {"id": "step_1", "description": "...", "depends_on": [],
   "tool_call": {"tool_name": "...", "parameters": {"query": "..."}}},
  {"id": "step_2", "description": "...", "depends_on": ["step_1"], "tool_call": null}
]}]}"#,
        );

        prompt
    }

    /// System prompt for plan evaluation
    pub fn evaluation_system() -> &'static str {
        r#"You are a critical reviewer choosing the most promising plan.
Prefer plans that are complete, well ordered, and avoid unnecessary tool calls.
Respond ONLY with JSON."#
    }

    pub fn evaluation_prompt(question: &str, plans: &[Plan]) -> String {
        let mut prompt = format!("Question: {}\n\nCandidate plans:\n", question);

        for plan in plans {
            prompt.push_str(&format!("\n--- {} ---\n", plan.name));
            for task in &plan.tasks {
                prompt.push_str(&format!("- [{}] {}", task.id, task.description));
                if let Some(tool) = task.tool_name() {
                    prompt.push_str(&format!(" (tool: {})", tool));
                }
                prompt.push('\n');
            }
        }

        prompt.push_str("\nRespond with JSON: {\"best_plan_name\": \"<name of the best plan>\"}");
        prompt
    }

    /// System prompt for one Thought/Action/Observation turn
    pub fn react_system() -> &'static str {
        r#"You are a careful reasoning agent working on one step of a larger plan.
Think about what you know, decide whether a tool is needed, and rate your confidence.
Respond ONLY with a JSON object:
{"thought": "...", "action": "<tool name or none>", "action_input": {...},
 "final_answer": "<answer when action is none>", "confidence_score": 0.0-1.0}"#
    }

    pub fn react_prompt(
        question: &str,
        task: &Task,
        context: &str,
        turn: usize,
        max_turns: usize,
        catalog: &ToolSpec,
    ) -> String {
        let mut prompt = format!(
            "Overall question: {}\n\nCurrent step [{}]: {}\n",
            question, task.id, task.description
        );

        if let Some(call) = &task.tool_call {
            prompt.push_str(&format!("Suggested tool: {}", call.tool_name));
            if !call.parameters.is_empty()
                && let Ok(params) = serde_json::to_string(&call.parameters)
            {
                prompt.push_str(&format!(" with {}", params));
            }
            prompt.push('\n');
        }

        prompt.push_str("\nAvailable tools:\n");
        for tool in catalog.all() {
            prompt.push_str(&format!("- {}\n", tool.signature()));
        }

        if context.trim().is_empty() {
            prompt.push_str("\nNo context gathered yet.\n");
        } else {
            prompt.push_str(&format!("\nContext so far:\n{}\n", context));
        }

        prompt.push_str(&format!("\nThis is turn {} of {}.", turn, max_turns));
        if turn >= max_turns {
            prompt.push_str(" This is your last turn: set action to none and give your final_answer.");
        }
        prompt
    }

    /// User prompt asking the model to re-examine a low-confidence step
    pub fn reflection_prompt(task: &Task, step: &ReasoningStep, context: &str) -> String {
        let previous = serde_json::to_string(step).unwrap_or_else(|_| step.thought.clone());
        format!(
            r#"Step [{}]: {}

Your previous reasoning had low confidence ({:.2}):
{}

Context:
{}

Re-examine it. Fix mistakes, choose a better action if one exists, and give an
honest confidence_score. Respond with the same JSON shape."#,
            task.id,
            task.description,
            step.confidence_score,
            previous,
            if context.trim().is_empty() { "(none)" } else { context },
        )
    }

    /// System prompt for synthesis
    pub fn synthesis_system() -> &'static str {
        r#"You are a tutor writing the final answer for a student.
Combine the findings of each research step into one coherent, well-structured answer.
Resolve contradictions, keep citations like [1] that appear in the findings,
and do not invent facts that are not supported by the findings."#
    }

    pub fn synthesis_prompt(question: &str, findings: &str) -> String {
        format!(
            r#"Question: {}

Findings from each step:
{}

Write the final answer."#,
            question, findings
        )
    }

    /// Answer returned when synthesis fails: the notice plus raw findings.
    pub fn degraded_answer(findings: &str) -> String {
        format!("{}\n\n{}", DEGRADED_NOTICE, findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::{ToolCategory, ToolDefinition, WEB_SEARCH};

    fn catalog() -> ToolSpec {
        ToolSpec::new().register(ToolDefinition::new(WEB_SEARCH, "Search the web", ToolCategory::Web))
    }

    #[test]
    fn test_planning_prompt_enforced() {
        let directive = ToolDirective::Enforced {
            tool: "document_search".to_string(),
        };
        let prompt = PromptTemplate::planning_prompt("Explain chapter 1", &catalog(), &directive, 3);
        assert!(prompt.contains("Propose 3 alternative plans"));
        assert!(prompt.contains("MUST use the tool \"document_search\""));
        assert!(prompt.contains("web_search() - Search the web"));
    }

    #[test]
    fn test_planning_prompt_budget() {
        let strict = PromptTemplate::planning_prompt(
            "q",
            &catalog(),
            &ToolDirective::Budgeted { allow_extra: false },
            2,
        );
        assert!(strict.contains("at most ONE web search"));

        let relaxed = PromptTemplate::planning_prompt(
            "q",
            &catalog(),
            &ToolDirective::Budgeted { allow_extra: true },
            2,
        );
        assert!(!relaxed.contains("at most ONE"));
    }

    #[test]
    fn test_react_prompt_last_turn() {
        let task = Task::new("step_1", "Find the boiling point");
        let prompt = PromptTemplate::react_prompt("q", &task, "", 3, 3, &catalog());
        assert!(prompt.contains("No context gathered yet"));
        assert!(prompt.contains("last turn"));
    }

    #[test]
    fn test_degraded_answer_keeps_findings() {
        let answer = PromptTemplate::degraded_answer("[step_1] A\n[step_2] B");
        assert!(answer.starts_with(DEGRADED_NOTICE));
        assert!(answer.ends_with("[step_1] A\n[step_2] B"));
    }
}
