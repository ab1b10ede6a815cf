//! Orchestration parameters for run loop control.
//!
//! These are application-layer knobs, not domain policy: the domain fixes
//! the defaults and the config file may override them.

use reasoning_domain::{COMPLEXITY_THRESHOLD, ConfidencePruner, DEEP_BRANCH_SCORE, REFLECTION_THRESHOLD};
use serde::{Deserialize, Serialize};

/// Run loop control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationParams {
    /// Scores above this take the tree-of-thought path.
    pub complexity_threshold: u8,
    /// Scores above this request three candidate plans instead of two.
    pub deep_branch_score: u8,
    /// Thought/Action/Observation turns per task.
    pub max_turns: usize,
    /// Steps below this confidence get one reflection pass.
    pub reflection_threshold: f64,
    /// Safety cap on scheduler pops, as a multiple of the task count.
    pub iteration_factor: usize,
    pub pruning_warmup_tasks: usize,
    pub critical_confidence: f64,
    pub sustained_confidence: f64,
}

impl Default for OrchestrationParams {
    fn default() -> Self {
        let pruner = ConfidencePruner::default();
        Self {
            complexity_threshold: COMPLEXITY_THRESHOLD,
            deep_branch_score: DEEP_BRANCH_SCORE,
            max_turns: 3,
            reflection_threshold: REFLECTION_THRESHOLD,
            iteration_factor: 2,
            pruning_warmup_tasks: pruner.warmup_tasks,
            critical_confidence: pruner.critical_threshold,
            sustained_confidence: pruner.sustained_threshold,
        }
    }
}

impl OrchestrationParams {
    pub fn pruner(&self) -> ConfidencePruner {
        ConfidencePruner {
            warmup_tasks: self.pruning_warmup_tasks,
            critical_threshold: self.critical_confidence,
            sustained_threshold: self.sustained_confidence,
        }
    }

    pub fn iteration_cap(&self, task_count: usize) -> usize {
        self.iteration_factor.max(1) * task_count
    }

    // ==================== Builder Methods ====================

    pub fn with_max_turns(mut self, turns: usize) -> Self {
        self.max_turns = turns;
        self
    }

    pub fn with_complexity_threshold(mut self, threshold: u8) -> Self {
        self.complexity_threshold = threshold;
        self
    }

    pub fn with_reflection_threshold(mut self, threshold: f64) -> Self {
        self.reflection_threshold = threshold;
        self
    }
}
