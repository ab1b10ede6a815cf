//! Top-level orchestration result.

use crate::reasoning::step::ReasoningStep;
use crate::reference::Reference;
use crate::routing::provider::ModelTarget;
use serde::{Deserialize, Serialize, Serializer};

/// Which path produced the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePath {
    /// SIMPLE query answered in one model call, no tools
    Direct,
    /// COMPLEX query answered through plan → execute → synthesize
    TreeOfThought,
}

impl PipelinePath {
    pub fn as_str(&self) -> &str {
        match self {
            PipelinePath::Direct => "direct",
            PipelinePath::TreeOfThought => "tot",
        }
    }
}

/// Short tag identifying the path taken and the provider that served it,
/// rendered as e.g. `direct:gemini/gemini-2.5-flash`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePipeline {
    pub path: PipelinePath,
    pub served_by: ModelTarget,
    /// Synthesis failed and raw findings were returned instead
    pub degraded: bool,
}

impl SourcePipeline {
    pub fn new(path: PipelinePath, served_by: ModelTarget) -> Self {
        Self {
            path,
            served_by,
            degraded: false,
        }
    }

    pub fn degraded(mut self) -> Self {
        self.degraded = true;
        self
    }

    pub fn is_direct(&self) -> bool {
        self.path == PipelinePath::Direct
    }
}

impl std::fmt::Display for SourcePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.path.as_str(), self.served_by)?;
        if self.degraded {
            write!(f, "+raw")?;
        }
        Ok(())
    }
}

impl Serialize for SourcePipeline {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Final answer plus everything gathered on the way.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestrationResult {
    #[serde(rename = "finalAnswer")]
    pub final_answer: String,
    /// Every streamed thought, in emission order
    pub thoughts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_steps: Option<Vec<ReasoningStep>>,
    pub references: Vec<Reference>,
    #[serde(rename = "sourcePipeline")]
    pub source_pipeline: SourcePipeline,
}
