//! Reasoning steps produced by a task's Thought/Action/Observation loop.

use crate::plan::value_objects::TaskId;
use crate::util::payload::extract_json_object;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Steps below this confidence get one reflection pass.
pub const REFLECTION_THRESHOLD: f64 = 0.7;

/// Confidence assumed when the model omits or garbles its score.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

const UNPARSED_THOUGHT: &str = "Could not parse a structured reasoning step";
const EMPTY_ANSWER: &str = "Best effort: the model returned no usable answer.";

/// Action values that mean "no tool, I am done".
const TERMINAL_ACTIONS: &[&str] = &["none", "null", "finish", "final_answer", "answer", "no_tool"];

/// One Thought/Action/Observation turn of a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningStep {
    pub task_id: TaskId,
    /// 1-based turn within the task
    pub turn: usize,
    pub thought: String,
    /// Capability to invoke next; `None` means the step is terminal
    pub action: Option<String>,
    #[serde(default)]
    pub action_input: HashMap<String, Value>,
    pub confidence_score: f64,
    /// True for a step produced by a reflection pass
    pub corrected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_answer: Option<String>,
}

impl ReasoningStep {
    /// Terminal step carrying `answer` (used for fallbacks).
    pub fn best_effort(task_id: TaskId, turn: usize, raw: &str) -> Self {
        let answer = raw.trim();
        Self {
            task_id,
            turn,
            thought: UNPARSED_THOUGHT.to_string(),
            action: None,
            action_input: HashMap::new(),
            confidence_score: DEFAULT_CONFIDENCE,
            corrected: false,
            final_answer: Some(if answer.is_empty() {
                EMPTY_ANSWER.to_string()
            } else {
                answer.to_string()
            }),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.action.is_none()
    }

    pub fn needs_reflection(&self) -> bool {
        self.needs_reflection_below(REFLECTION_THRESHOLD)
    }

    pub fn needs_reflection_below(&self, threshold: f64) -> bool {
        !self.corrected && self.confidence_score < threshold
    }

    /// Mark this step as the product of reflection.
    pub fn into_corrected(mut self) -> Self {
        self.corrected = true;
        self
    }

    /// The answer text, or an empty string.
    pub fn answer(&self) -> &str {
        self.final_answer.as_deref().unwrap_or("")
    }
}

/// Parse a reasoning step, degrading to a best-effort terminal step.
pub fn parse_reasoning_step(raw: &str, task_id: &TaskId, turn: usize) -> ReasoningStep {
    try_parse_reasoning_step(raw, task_id, turn)
        .unwrap_or_else(|| ReasoningStep::best_effort(task_id.clone(), turn, raw))
}

/// Parse a reasoning step; `None` when no step-shaped object is present.
pub fn try_parse_reasoning_step(raw: &str, task_id: &TaskId, turn: usize) -> Option<ReasoningStep> {
    let payload = extract_json_object(raw)?;
    let fields = payload.as_object()?;

    if !["thought", "action", "final_answer"]
        .iter()
        .any(|key| fields.contains_key(*key))
    {
        return None;
    }

    let thought = fields
        .get("thought")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let action = fields
        .get("action")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|a| !a.is_empty() && !TERMINAL_ACTIONS.contains(&a.to_ascii_lowercase().as_str()))
        .map(str::to_string);

    let action_input = match fields.get("action_input") {
        Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => {
            HashMap::from([("query".to_string(), Value::String(s.trim().to_string()))])
        }
        _ => HashMap::new(),
    };

    let final_answer = match fields.get("final_answer") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Null) | Some(Value::String(_)) | None => None,
        Some(other) => Some(other.to_string()),
    };

    Some(ReasoningStep {
        task_id: task_id.clone(),
        turn,
        thought,
        action,
        action_input,
        confidence_score: parse_confidence(fields.get("confidence_score")),
        corrected: false,
        final_answer,
    })
}

fn parse_confidence(value: Option<&Value>) -> f64 {
    let score = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match score {
        Some(s) if s.is_finite() => s.clamp(0.0, 1.0),
        _ => DEFAULT_CONFIDENCE,
    }
}
