//! Routing configuration from TOML (`[routing]` section)

use reasoning_domain::ModelProfile;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Raw routing configuration.
///
/// ```toml
/// [routing]
/// default_model = "gemini/gemini-2.5-flash"
///
/// [[routing.models]]
/// target = "gemini/gemini-2.5-pro"
/// strengths = ["math", "coding"]
///
/// [routing.subjects]
/// chemistry = "openai/gpt-4o"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRoutingConfig {
    /// Fallback when no rule matches (defaults to the baseline model).
    pub default_model: Option<String>,
    /// Provider the tiered selection prefers when the request names none.
    pub preferred_provider: Option<String>,
    /// Routable models with their category strengths.
    pub models: Vec<ModelProfile>,
    /// Subject → specialized model (`provider/model`).
    pub subjects: HashMap<String, String>,
    pub performance_window_days: i64,
    pub min_samples: usize,
    /// JSONL performance log (default: data dir).
    pub performance_log: Option<PathBuf>,
}

impl Default for FileRoutingConfig {
    fn default() -> Self {
        Self {
            default_model: None,
            preferred_provider: None,
            models: Vec::new(),
            subjects: HashMap::new(),
            performance_window_days: 30,
            min_samples: 3,
            performance_log: None,
        }
    }
}

impl FileRoutingConfig {
    /// Performance log location: configured path or the platform data dir.
    pub fn performance_log_path(&self) -> Option<PathBuf> {
        self.performance_log.clone().or_else(|| {
            dirs::data_dir().map(|d| d.join("tutor-reasoning").join("performance.jsonl"))
        })
    }

    /// How long performance records stay relevant: the routing window.
    pub fn performance_retention(&self) -> chrono::Duration {
        chrono::Duration::days(self.performance_window_days.max(1))
    }
}
