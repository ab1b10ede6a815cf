//! Orchestration configuration from TOML (`[orchestration]` section)

use reasoning_application::OrchestrationParams;
use serde::{Deserialize, Serialize};

/// Raw orchestration knobs. Every field defaults to [`OrchestrationParams::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOrchestrationConfig {
    pub complexity_threshold: u8,
    pub deep_branch_score: u8,
    pub max_turns: usize,
    pub reflection_threshold: f64,
    pub iteration_factor: usize,
    pub pruning_warmup_tasks: usize,
    pub critical_confidence: f64,
    pub sustained_confidence: f64,
}

impl Default for FileOrchestrationConfig {
    fn default() -> Self {
        let params = OrchestrationParams::default();
        Self {
            complexity_threshold: params.complexity_threshold,
            deep_branch_score: params.deep_branch_score,
            max_turns: params.max_turns,
            reflection_threshold: params.reflection_threshold,
            iteration_factor: params.iteration_factor,
            pruning_warmup_tasks: params.pruning_warmup_tasks,
            critical_confidence: params.critical_confidence,
            sustained_confidence: params.sustained_confidence,
        }
    }
}

impl FileOrchestrationConfig {
    pub fn to_params(&self) -> OrchestrationParams {
        OrchestrationParams {
            complexity_threshold: self.complexity_threshold,
            deep_branch_score: self.deep_branch_score,
            max_turns: self.max_turns,
            reflection_threshold: self.reflection_threshold,
            iteration_factor: self.iteration_factor,
            pruning_warmup_tasks: self.pruning_warmup_tasks,
            critical_confidence: self.critical_confidence,
            sustained_confidence: self.sustained_confidence,
        }
    }
}
