//! Plan and task entities.

use super::value_objects::{TaskId, TaskResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting for dependencies
    #[default]
    Pending,
    /// Inside its Thought/Action/Observation loop
    Running,
    Completed,
    /// Abandoned after pruning or because a dependency never completed
    Skipped,
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Skipped => "skipped",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Skipped)
    }
}

/// Suggested tool call attached to a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub tool_name: String,
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,
}

impl ToolInvocation {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            parameters: HashMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// A unit of work within a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    #[serde(default)]
    pub depends_on: Vec<TaskId>,
    #[serde(default)]
    pub tool_call: Option<ToolInvocation>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub result: Option<TaskResult>,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            depends_on: Vec::new(),
            tool_call: None,
            status: TaskStatus::Pending,
            result: None,
        }
    }

    pub fn with_dependency(mut self, task_id: impl Into<TaskId>) -> Self {
        self.depends_on.push(task_id.into());
        self
    }

    pub fn with_tool_call(mut self, call: ToolInvocation) -> Self {
        self.tool_call = Some(call);
        self
    }

    pub fn tool_name(&self) -> Option<&str> {
        self.tool_call.as_ref().map(|c| c.tool_name.as_str())
    }

    pub fn mark_running(&mut self) {
        self.status = TaskStatus::Running;
    }

    pub fn mark_completed(&mut self, result: TaskResult) {
        self.status = TaskStatus::Completed;
        self.result = Some(result);
    }

    pub fn mark_skipped(&mut self) {
        self.status = TaskStatus::Skipped;
    }
}

/// One candidate strategy for answering a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub name: String,
    pub tasks: Vec<Task>,
}

impl Plan {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tasks: Vec::new(),
        }
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn task_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| &t.id == id)
    }

    pub fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == id)
    }

    pub fn is_complete(&self) -> bool {
        self.tasks.iter().all(|t| t.status.is_terminal())
    }

    /// (completed, total)
    pub fn progress(&self) -> (usize, usize) {
        let completed = self
            .tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();
        (completed, self.tasks.len())
    }

    /// Tool names used by the plan's tasks, in plan order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tasks.iter().filter_map(|t| t.tool_name()).collect()
    }

    /// Skip every task that has not reached a terminal state.
    pub fn skip_remaining(&mut self) -> usize {
        let mut skipped = 0;
        for task in self.tasks.iter_mut().filter(|t| !t.status.is_terminal()) {
            task.mark_skipped();
            skipped += 1;
        }
        skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_progress() {
        let mut plan = Plan::new("Direct")
            .with_task(Task::new("a", "first"))
            .with_task(Task::new("b", "second").with_dependency("a"));

        assert_eq!(plan.progress(), (0, 2));
        plan.task_mut(&"a".into())
            .unwrap()
            .mark_completed(TaskResult::new("done", 0.9, 1));
        assert_eq!(plan.progress(), (1, 2));
        assert!(!plan.is_complete());

        assert_eq!(plan.skip_remaining(), 1);
        assert!(plan.is_complete());
        assert_eq!(plan.progress(), (1, 2));
    }

    #[test]
    fn test_tool_names() {
        let plan = Plan::new("p")
            .with_task(Task::new("a", "x").with_tool_call(ToolInvocation::new("web_search")))
            .with_task(Task::new("b", "y"));
        assert_eq!(plan.tool_names(), vec!["web_search"]);
    }
}
