//! Port for model performance feedback.
//!
//! Every model call records whether it succeeded and how long it took. The
//! provider router reads the aggregate back to find the historically best
//! model for a query category.

use chrono::{DateTime, Duration, Utc};
use reasoning_domain::{ModelTarget, QueryCategory};
use serde::{Deserialize, Serialize};

/// Outcome of one model call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub model: ModelTarget,
    pub category: QueryCategory,
    pub success: bool,
    pub latency_ms: u64,
    pub timestamp: DateTime<Utc>,
}

impl PerformanceRecord {
    pub fn new(model: ModelTarget, category: QueryCategory, success: bool, latency_ms: u64) -> Self {
        Self {
            model,
            category,
            success,
            latency_ms,
            timestamp: Utc::now(),
        }
    }
}

/// Aggregate over a window for one model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelStats {
    pub model: ModelTarget,
    pub samples: usize,
    pub successes: usize,
    pub mean_latency_ms: f64,
}

impl ModelStats {
    pub fn success_rate(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.successes as f64 / self.samples as f64
        }
    }
}

/// Pick the best model: highest success rate, then lowest mean latency,
/// ignoring models with fewer than `min_samples` samples.
pub fn best_of(stats: &[ModelStats], min_samples: usize) -> Option<&ModelStats> {
    stats
        .iter()
        .filter(|s| s.samples >= min_samples.max(1))
        .max_by(|a, b| {
            a.success_rate()
                .total_cmp(&b.success_rate())
                .then_with(|| b.mean_latency_ms.total_cmp(&a.mean_latency_ms))
        })
}

/// Port for recording and querying performance feedback.
///
/// `record` is synchronous and non-fallible; storage failures are logged by
/// the adapter and never disturb a run.
pub trait PerformanceStore: Send + Sync {
    fn record(&self, record: PerformanceRecord);

    /// Per-model aggregates for `category` over the trailing `window`.
    fn stats(&self, category: QueryCategory, window: Duration) -> Vec<ModelStats>;

    fn best_model(
        &self,
        category: QueryCategory,
        window: Duration,
        min_samples: usize,
    ) -> Option<ModelTarget> {
        let stats = self.stats(category, window);
        best_of(&stats, min_samples).map(|s| s.model.clone())
    }
}

/// No-op implementation for tests and when feedback is disabled.
pub struct NoPerformanceStore;

impl PerformanceStore for NoPerformanceStore {
    fn record(&self, _record: PerformanceRecord) {}

    fn stats(&self, _category: QueryCategory, _window: Duration) -> Vec<ModelStats> {
        Vec::new()
    }
}

/// Fold records into per-model stats, first-seen model order.
pub fn aggregate<'a>(records: impl IntoIterator<Item = &'a PerformanceRecord>) -> Vec<ModelStats> {
    let mut stats: Vec<(ModelStats, u64)> = Vec::new();
    for record in records {
        let index = match stats.iter().position(|(s, _)| s.model == record.model) {
            Some(i) => i,
            None => {
                stats.push((
                    ModelStats {
                        model: record.model.clone(),
                        samples: 0,
                        successes: 0,
                        mean_latency_ms: 0.0,
                    },
                    0,
                ));
                stats.len() - 1
            }
        };
        let (entry, total_latency) = &mut stats[index];
        entry.samples += 1;
        if record.success {
            entry.successes += 1;
        }
        *total_latency += record.latency_ms;
        entry.mean_latency_ms = *total_latency as f64 / entry.samples as f64;
    }
    stats.into_iter().map(|(s, _)| s).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reasoning_domain::ProviderKind;

    fn record(model: &str, success: bool, latency_ms: u64) -> PerformanceRecord {
        PerformanceRecord::new(
            ModelTarget::new(ProviderKind::Gemini, model),
            QueryCategory::Math,
            success,
            latency_ms,
        )
    }

    #[test]
    fn test_aggregate_and_best() {
        let records = vec![
            record("a", true, 100),
            record("a", false, 300),
            record("a", true, 200),
            record("b", true, 400),
            record("b", true, 500),
            record("b", true, 600),
            record("c", true, 10),
        ];
        let stats = aggregate(&records);
        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0].samples, 3);
        assert_eq!(stats[0].mean_latency_ms, 200.0);

        // c has too few samples; b beats a on success rate despite latency
        let best = best_of(&stats, 3).unwrap();
        assert_eq!(best.model.model, "b");
    }

    #[test]
    fn test_latency_breaks_ties() {
        let records = vec![
            record("slow", true, 900),
            record("fast", true, 100),
            record("slow", true, 900),
            record("fast", true, 100),
        ];
        let stats = aggregate(&records);
        assert_eq!(best_of(&stats, 2).unwrap().model.model, "fast");
        assert!(best_of(&stats, 3).is_none());
    }
}
