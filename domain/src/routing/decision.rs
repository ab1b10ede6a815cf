//! Provider routing decision and fallback chain construction.

use super::category::QueryCategory;
use super::provider::ModelTarget;
use serde::{Deserialize, Serialize};

/// Which rule produced a routing decision, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingLogic {
    /// A model mapped to the request's subject
    SubjectSpecialized,
    /// Tier matched to complexity within the preferred provider
    ComplexityTiered,
    /// Best model for the category over the rolling performance window
    HistoricalPerformance,
    SystemDefault,
}

impl RoutingLogic {
    pub fn as_str(&self) -> &str {
        match self {
            RoutingLogic::SubjectSpecialized => "subject_specialized",
            RoutingLogic::ComplexityTiered => "complexity_tiered",
            RoutingLogic::HistoricalPerformance => "historical_performance",
            RoutingLogic::SystemDefault => "system_default",
        }
    }
}

impl std::fmt::Display for RoutingLogic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The model chosen for a query plus where to go when it runs out of quota.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderDecision {
    pub chosen: ModelTarget,
    pub logic: RoutingLogic,
    pub query_category: QueryCategory,
    /// Ordered fallback chain, never containing `chosen`'s provider
    pub fallbacks: Vec<ModelTarget>,
}

impl ProviderDecision {
    pub fn new(
        chosen: ModelTarget,
        logic: RoutingLogic,
        query_category: QueryCategory,
        baseline: &ModelTarget,
        local: &ModelTarget,
    ) -> Self {
        let fallbacks = build_fallback_chain(&chosen, baseline, local);
        Self {
            chosen,
            logic,
            query_category,
            fallbacks,
        }
    }

    /// The locally hosted entry of the fallback chain, if any.
    pub fn local_fallback(&self) -> Option<&ModelTarget> {
        self.fallbacks.iter().find(|t| t.provider.is_local())
    }
}

/// Baseline remote first (unless already chosen), then local (unless already chosen).
pub fn build_fallback_chain(
    chosen: &ModelTarget,
    baseline: &ModelTarget,
    local: &ModelTarget,
) -> Vec<ModelTarget> {
    let mut chain = Vec::with_capacity(2);
    if chosen.provider != baseline.provider {
        chain.push(baseline.clone());
    }
    if chosen.provider != local.provider {
        chain.push(local.clone());
    }
    chain
}
