//! Value objects for plan execution.

use serde::{Deserialize, Serialize};

/// Stable identifier of a task within one plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for TaskId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Terminal text of a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub output: String,
    /// Confidence of the last reasoning step that produced `output`
    pub confidence: f64,
    /// Turns consumed (1..=turn budget)
    pub turns: usize,
    /// True when the turn budget ran out before a terminal step
    pub exhausted: bool,
}

impl TaskResult {
    pub fn new(output: impl Into<String>, confidence: f64, turns: usize) -> Self {
        Self {
            output: output.into(),
            confidence,
            turns,
            exhausted: false,
        }
    }

    pub fn exhausted(mut self) -> Self {
        self.exhausted = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_id() {
        let id: TaskId = "step_1".into();
        assert_eq!(id.as_str(), "step_1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"step_1\"");
    }
}
