//! Plan parsing from model responses.
//!
//! Expected payload, optionally wrapped in a fenced block:
//!
//! ```json
//! {
//!   "plans": [
//!     {
//!       "name": "Survey then compare",
//!       "steps": [
//!         "A plain string step",
//!         {
//!           "id": "step_2",
//!           "description": "Find recent studies",
//!           "depends_on": ["step_1"],
//!           "tool_call": {"tool_name": "academic_search", "parameters": {"query": "..."}}
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Parsing is tolerant: string steps become tasks without a tool call, a
//! structurally invalid `tool_call` is dropped for that task only, and plans
//! with no usable steps are skipped.

use super::entities::{Plan, Task, ToolInvocation};
use crate::util::payload::extract_json_object;
use serde_json::Value;

/// Tool names models use to mean "no tool".
const NO_TOOL_NAMES: &[&str] = &["none", "null", "no_tool", "no tool", "n/a"];

/// Parse up to `max_plans` candidate plans from a model response.
///
/// Returns an empty vector when nothing usable is found; callers fall back
/// to [`default_plan`].
pub fn parse_plans(response: &str, max_plans: usize) -> Vec<Plan> {
    let Some(payload) = extract_json_object(response) else {
        return Vec::new();
    };

    let entries: Vec<&Value> = match payload.get("plans").and_then(|v| v.as_array()) {
        Some(plans) => plans.iter().collect(),
        // A single plan object without the wrapper
        None if payload.get("steps").is_some() || payload.get("tasks").is_some() => {
            vec![&payload]
        }
        None => Vec::new(),
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| parse_plan_entry(entry, index))
        .take(max_plans)
        .collect()
}

/// The single-task plan used when no candidate plan can be recovered.
pub fn default_plan(query: &str, enforced_tool: Option<&str>) -> Plan {
    let mut task = Task::new("step_1", format!("Answer the question directly: {}", query.trim()));
    if let Some(tool) = enforced_tool {
        task = task.with_tool_call(ToolInvocation::new(tool).with_param("query", query.trim()));
    }
    Plan::new("Direct Answer").with_task(task)
}

fn parse_plan_entry(entry: &Value, index: usize) -> Option<Plan> {
    let name = entry
        .get("name")
        .and_then(json_value_to_string)
        .unwrap_or_else(|| format!("Plan {}", index + 1));

    let steps = entry
        .get("steps")
        .or_else(|| entry.get("tasks"))
        .and_then(|v| v.as_array())?;

    let mut plan = Plan::new(name);
    for (position, step) in steps.iter().enumerate() {
        if let Some(task) = parse_step(step, position) {
            plan.tasks.push(task);
        }
    }

    if plan.tasks.is_empty() {
        return None;
    }
    Some(plan)
}

fn parse_step(step: &Value, position: usize) -> Option<Task> {
    let fallback_id = format!("step_{}", position + 1);

    match step {
        Value::String(text) if !text.trim().is_empty() => Some(Task::new(fallback_id, text.trim())),
        Value::Object(fields) => {
            let id = fields
                .get("id")
                .and_then(json_value_to_string)
                .unwrap_or(fallback_id);
            let description = ["description", "task", "step", "title"]
                .iter()
                .find_map(|key| fields.get(*key).and_then(json_value_to_string))?;

            let mut task = Task::new(id, description);

            if let Some(deps) = fields
                .get("depends_on")
                .or_else(|| fields.get("dependencies"))
                .and_then(|v| v.as_array())
            {
                for dep in deps.iter().filter_map(json_value_to_string) {
                    if !task.depends_on.iter().any(|d| d.as_str() == dep) {
                        task = task.with_dependency(dep);
                    }
                }
            }

            task.tool_call = fields.get("tool_call").and_then(parse_tool_call);
            Some(task)
        }
        _ => None,
    }
}

/// `None` for "no tool" markers and for anything structurally invalid.
fn parse_tool_call(value: &Value) -> Option<ToolInvocation> {
    let fields = value.as_object()?;
    let tool_name = fields
        .get("tool_name")
        .or_else(|| fields.get("name"))
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|name| !name.is_empty())?;

    if NO_TOOL_NAMES.contains(&tool_name.to_ascii_lowercase().as_str()) {
        return None;
    }

    let parameters = match fields.get("parameters") {
        None | Some(Value::Null) => Default::default(),
        Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Some(_) => return None,
    };

    Some(ToolInvocation {
        tool_name: tool_name.to_string(),
        parameters,
    })
}

/// Strings as-is, numbers stringified, everything else (and blanks) `None`.
fn json_value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
