//! Provider routing.
//!
//! Rules, first match wins:
//!
//! 1. a model mapped to the request's subject
//! 2. the complexity-matched tier within the preferred provider, filtered
//!    by category strengths, weighted-random among equally ranked models
//! 3. the best model for the query category over the performance window
//! 4. the system default
//!
//! Decisions are cached per query and context. A local preference is
//! downgraded to the baseline provider when the liveness probe fails.

use crate::config::RoutingTable;
use crate::ports::performance_store::{NoPerformanceStore, PerformanceStore};
use crate::ports::provider_probe::{AssumeAlive, LocalProviderProbe};
use rand::distributions::{Distribution, WeightedIndex};
use reasoning_domain::{
    ComplexityAssessment, ModelProfile, ModelTarget, ModelTier, ProviderDecision, Query,
    QueryCategory, RoutingLogic, classify_query,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

pub struct ProviderRouter {
    table: RoutingTable,
    performance: Arc<dyn PerformanceStore>,
    probe: Arc<dyn LocalProviderProbe>,
    cache: RwLock<HashMap<String, ProviderDecision>>,
}

impl ProviderRouter {
    pub fn new(table: RoutingTable) -> Self {
        Self {
            table,
            performance: Arc::new(NoPerformanceStore),
            probe: Arc::new(AssumeAlive),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_performance_store(mut self, store: Arc<dyn PerformanceStore>) -> Self {
        self.performance = store;
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn LocalProviderProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn table(&self) -> &RoutingTable {
        &self.table
    }

    /// Choose a model for `query`, reusing a cached decision when present.
    pub async fn route(&self, query: &Query, complexity: &ComplexityAssessment) -> ProviderDecision {
        let key = cache_key(query);
        if let Some(cached) = self.cache.read().ok().and_then(|c| c.get(&key).cloned()) {
            debug!(model = %cached.chosen, "Routing cache hit");
            return cached;
        }

        let decision = self.decide(query, complexity).await;
        info!(
            model = %decision.chosen,
            logic = %decision.logic,
            category = %decision.query_category,
            "Routed query"
        );

        // Stale or lost entries are acceptable; a poisoned lock just skips caching.
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key, decision.clone());
        }
        decision
    }

    async fn decide(&self, query: &Query, complexity: &ComplexityAssessment) -> ProviderDecision {
        let category = classify_query(query.text());
        let context = query.context();
        let decision = |chosen: ModelTarget, logic: RoutingLogic| {
            ProviderDecision::new(chosen, logic, category, &self.table.baseline, &self.table.local)
        };

        if let Some(target) = context
            .subject
            .as_deref()
            .and_then(|s| self.table.subject_model(s))
        {
            return decision(target.clone(), RoutingLogic::SubjectSpecialized);
        }

        let mut preferred = context
            .preferred_provider
            .unwrap_or(self.table.baseline.provider);
        if preferred.is_local() && !self.probe.is_alive().await {
            warn!(
                provider = %preferred,
                fallback = %self.table.baseline.provider,
                "Local provider failed liveness probe, using baseline"
            );
            preferred = self.table.baseline.provider;
        }

        let candidates: Vec<&ModelProfile> = self.table.profiles_for(preferred).collect();
        if let Some(target) = pick_tiered(&candidates, category, complexity.score) {
            return decision(target, RoutingLogic::ComplexityTiered);
        }

        let window = chrono::Duration::days(self.table.performance_window_days);
        if let Some(target) = self
            .performance
            .best_model(category, window, self.table.min_samples)
        {
            return decision(target, RoutingLogic::HistoricalPerformance);
        }

        decision(self.table.default_model.clone(), RoutingLogic::SystemDefault)
    }

    pub fn cached_decisions(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }
}

/// Key over the query text and everything in its context.
fn cache_key(query: &Query) -> String {
    let context = serde_json::to_string(query.context()).unwrap_or_default();
    format!("{}\u{1f}{}", query.text(), context)
}

/// Tier-matched choice among `candidates`.
///
/// Models strong at `category` are preferred when any exist. Among those,
/// the ones whose tier is closest to the complexity's tier form the top
/// rank, and one of them is drawn by weight.
fn pick_tiered(
    candidates: &[&ModelProfile],
    category: QueryCategory,
    score: u8,
) -> Option<ModelTarget> {
    let specialists: Vec<&ModelProfile> = candidates
        .iter()
        .copied()
        .filter(|p| p.is_strong_at(category))
        .collect();
    let pool = if specialists.is_empty() {
        candidates.to_vec()
    } else {
        specialists
    };

    let wanted = ModelTier::for_complexity(score);
    let best_distance = pool
        .iter()
        .map(|p| p.effective_tier().distance(&wanted))
        .min()?;
    let ranked: Vec<&ModelProfile> = pool
        .into_iter()
        .filter(|p| p.effective_tier().distance(&wanted) == best_distance)
        .collect();

    let weights: Vec<u32> = ranked.iter().map(|p| p.weight).collect();
    let chosen = match WeightedIndex::new(&weights) {
        Ok(dist) => ranked[dist.sample(&mut rand::thread_rng())],
        // All weights zero: fall back to the first ranked model
        Err(_) => ranked[0],
    };
    Some(chosen.target.clone())
}
