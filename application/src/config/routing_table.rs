//! Routing table: the models the provider router may choose from.

use reasoning_domain::{ModelProfile, ModelTarget, ProviderKind};
use std::collections::HashMap;

/// Everything the provider router needs besides the query.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingTable {
    /// Baseline remote model; fallback #1 for every other provider
    pub baseline: ModelTarget,
    /// Locally hosted model; fallback #2 and the quota failover target
    pub local: ModelTarget,
    /// Used when no other rule matches
    pub default_model: ModelTarget,
    pub catalog: Vec<ModelProfile>,
    /// Lower-cased subject → specialized model
    pub subject_models: HashMap<String, ModelTarget>,
    pub performance_window_days: i64,
    pub min_samples: usize,
}

impl RoutingTable {
    pub fn new(baseline: ModelTarget, local: ModelTarget) -> Self {
        Self {
            default_model: baseline.clone(),
            baseline,
            local,
            catalog: Vec::new(),
            subject_models: HashMap::new(),
            performance_window_days: 30,
            min_samples: 3,
        }
    }

    pub fn with_default_model(mut self, target: ModelTarget) -> Self {
        self.default_model = target;
        self
    }

    pub fn with_profile(mut self, profile: ModelProfile) -> Self {
        self.catalog.push(profile);
        self
    }

    pub fn with_subject(mut self, subject: &str, target: ModelTarget) -> Self {
        self.subject_models
            .insert(subject.trim().to_lowercase(), target);
        self
    }

    pub fn with_performance_window(mut self, days: i64, min_samples: usize) -> Self {
        self.performance_window_days = days;
        self.min_samples = min_samples;
        self
    }

    pub fn subject_model(&self, subject: &str) -> Option<&ModelTarget> {
        self.subject_models.get(&subject.trim().to_lowercase())
    }

    pub fn profiles_for(&self, provider: ProviderKind) -> impl Iterator<Item = &ModelProfile> {
        self.catalog
            .iter()
            .filter(move |p| p.target.provider == provider)
    }
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::new(
            ModelTarget::new(ProviderKind::Gemini, "gemini-2.5-flash"),
            ModelTarget::new(ProviderKind::Ollama, "llama3.1:8b"),
        )
    }
}
