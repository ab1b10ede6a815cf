//! Model capability tiers and the routable model catalog.

use super::category::QueryCategory;
use super::provider::ModelTarget;
use serde::{Deserialize, Serialize};

/// Coarse capability class of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// flash / mini / small / haiku / lite class
    Fast,
    Balanced,
    /// pro / opus / large class
    Powerful,
}

const POWERFUL_MARKERS: &[&str] = &["pro", "opus", "large", "70b", "405b", "ultra"];
const FAST_MARKERS: &[&str] = &["flash", "mini", "small", "haiku", "lite", "nano", "8b", "7b", "3b"];

impl ModelTier {
    /// Infer the tier from the model name.
    pub fn infer(model: &str) -> Self {
        let lowered = model.to_lowercase();
        let segments: Vec<&str> = lowered
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|s| !s.is_empty())
            .collect();
        let has = |markers: &[&str]| segments.iter().any(|s| markers.contains(s));

        if has(POWERFUL_MARKERS) {
            ModelTier::Powerful
        } else if has(FAST_MARKERS) {
            ModelTier::Fast
        } else {
            ModelTier::Balanced
        }
    }

    /// Tier wanted for a complexity score (0-100).
    pub fn for_complexity(score: u8) -> Self {
        match score {
            0..=40 => ModelTier::Fast,
            41..=75 => ModelTier::Balanced,
            _ => ModelTier::Powerful,
        }
    }

    /// Rank distance between two tiers (0 = same tier).
    pub fn distance(&self, other: &ModelTier) -> u8 {
        (*self as i8 - *other as i8).unsigned_abs()
    }
}

/// One routable model in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelProfile {
    pub target: ModelTarget,
    /// Categories this model is known to be good at (empty = generalist)
    #[serde(default)]
    pub strengths: Vec<QueryCategory>,
    /// Explicit tier; inferred from the model name when absent
    #[serde(default)]
    pub tier: Option<ModelTier>,
    /// Relative weight for random choice among equally ranked candidates
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

impl ModelProfile {
    pub fn new(target: ModelTarget) -> Self {
        Self {
            target,
            strengths: Vec::new(),
            tier: None,
            weight: default_weight(),
        }
    }

    pub fn with_strength(mut self, category: QueryCategory) -> Self {
        self.strengths.push(category);
        self
    }

    pub fn with_tier(mut self, tier: ModelTier) -> Self {
        self.tier = Some(tier);
        self
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    pub fn effective_tier(&self) -> ModelTier {
        self.tier
            .unwrap_or_else(|| ModelTier::infer(&self.target.model))
    }

    pub fn is_strong_at(&self, category: QueryCategory) -> bool {
        self.strengths.contains(&category)
    }
}
