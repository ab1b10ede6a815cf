//! Thought events streamed to callers while a run is in progress.

use serde::{Deserialize, Serialize};

/// What produced a thought event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThoughtKind {
    /// Orchestrator progress note (classification, plan count, synthesis)
    Note,
    /// Model reasoning for the current turn
    Reasoning,
    /// A capability invocation
    Action,
    /// The textual result of a capability invocation
    Observation,
    /// A degradation or pruning notice
    Warning,
}

/// A single streamed event.
///
/// Serializes as `{"type": "thought", "kind": ..., "content": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "thought")]
pub struct ThoughtEvent {
    pub kind: ThoughtKind,
    pub content: String,
}

impl ThoughtEvent {
    pub fn new(kind: ThoughtKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    pub fn note(content: impl Into<String>) -> Self {
        Self::new(ThoughtKind::Note, content)
    }

    pub fn reasoning(content: impl Into<String>) -> Self {
        Self::new(ThoughtKind::Reasoning, content)
    }

    pub fn action(content: impl Into<String>) -> Self {
        Self::new(ThoughtKind::Action, content)
    }

    pub fn observation(content: impl Into<String>) -> Self {
        Self::new(ThoughtKind::Observation, content)
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self::new(ThoughtKind::Warning, content)
    }
}
