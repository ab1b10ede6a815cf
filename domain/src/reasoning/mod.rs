//! Per-task reasoning: Thought/Action/Observation steps and pruning.

pub mod pruner;
pub mod step;
