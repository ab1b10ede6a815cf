//! Early termination of a plan on low confidence.

use serde::Serialize;

/// Why the remaining tasks were abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PruneReason {
    /// Very low confidence on one of the first tasks
    CriticalFailure,
    /// Low confidence persisting into later tasks
    SustainedLowPerformance,
}

impl PruneReason {
    pub fn as_str(&self) -> &str {
        match self {
            PruneReason::CriticalFailure => "critical failure",
            PruneReason::SustainedLowPerformance => "sustained low performance",
        }
    }
}

impl std::fmt::Display for PruneReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneDecision {
    Continue,
    Prune {
        reason: PruneReason,
        /// Tasks after the current one that will not run
        abandoned: usize,
    },
}

impl PruneDecision {
    pub fn should_prune(&self) -> bool {
        matches!(self, PruneDecision::Prune { .. })
    }
}

/// Stateless pruning rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidencePruner {
    /// Tasks with index below this are judged by `critical_threshold`
    pub warmup_tasks: usize,
    pub critical_threshold: f64,
    pub sustained_threshold: f64,
}

impl Default for ConfidencePruner {
    fn default() -> Self {
        Self {
            warmup_tasks: 2,
            critical_threshold: 0.3,
            sustained_threshold: 0.5,
        }
    }
}

impl ConfidencePruner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide after the task at `task_index` (0-based, execution order) completed.
    pub fn evaluate(&self, confidence: f64, task_index: usize, total_tasks: usize) -> PruneDecision {
        let reason = if task_index < self.warmup_tasks {
            (confidence < self.critical_threshold).then_some(PruneReason::CriticalFailure)
        } else {
            (confidence < self.sustained_threshold).then_some(PruneReason::SustainedLowPerformance)
        };

        match reason {
            Some(reason) => PruneDecision::Prune {
                reason,
                abandoned: total_tasks.saturating_sub(task_index + 1),
            },
            None => PruneDecision::Continue,
        }
    }
}
