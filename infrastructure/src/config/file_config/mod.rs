//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod logging;
mod orchestration;
mod output;
mod providers;
mod routing;
mod tools;

pub use logging::FileLoggingConfig;
pub use orchestration::FileOrchestrationConfig;
pub use output::FileOutputConfig;
pub use providers::{FileGeminiConfig, FileOllamaConfig, FileOpenAiConfig, FileProvidersConfig};
pub use routing::FileRoutingConfig;
pub use tools::FileToolsConfig;

use reasoning_application::RoutingTable;
use reasoning_domain::{ModelTarget, ProviderKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Error, Debug, PartialEq)]
pub enum ConfigValidationError {
    #[error("{field} must be between 0.0 and 1.0 (got {value})")]
    ConfidenceOutOfRange { field: &'static str, value: f64 },

    #[error("orchestration.max_turns cannot be 0")]
    ZeroTurns,

    #[error("orchestration.complexity_threshold cannot exceed 100 (got {0})")]
    ComplexityThresholdOutOfRange(u8),

    #[error("{0}: model id cannot be empty")]
    EmptyModelId(String),

    #[error("{field}: {message}")]
    InvalidModelTarget { field: String, message: String },

    #[error("routing.preferred_provider: {0}")]
    InvalidProvider(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Provider endpoints and the baseline/local models
    pub providers: FileProvidersConfig,
    /// Routable models, subject mappings and the performance window
    pub routing: FileRoutingConfig,
    /// Gate, turn budget, reflection and pruning knobs
    pub orchestration: FileOrchestrationConfig,
    /// Retrieval tool settings
    pub tools: FileToolsConfig,
    pub logging: FileLoggingConfig,
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, stopping at the first problem.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let o = &self.orchestration;
        if o.max_turns == 0 {
            return Err(ConfigValidationError::ZeroTurns);
        }
        if o.complexity_threshold > 100 {
            return Err(ConfigValidationError::ComplexityThresholdOutOfRange(
                o.complexity_threshold,
            ));
        }
        for (field, value) in [
            ("orchestration.reflection_threshold", o.reflection_threshold),
            ("orchestration.critical_confidence", o.critical_confidence),
            ("orchestration.sustained_confidence", o.sustained_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigValidationError::ConfidenceOutOfRange { field, value });
            }
        }

        parse_target("providers.baseline", &self.providers.baseline)?;
        parse_target("providers.local", &self.providers.local)?;
        if let Some(default) = &self.routing.default_model {
            parse_target("routing.default_model", default)?;
        }
        for (subject, target) in &self.routing.subjects {
            parse_target(&format!("routing.subjects.{}", subject), target)?;
        }
        self.preferred_provider()?;

        Ok(())
    }

    /// Build the router's table. Call [`validate`](Self::validate) first for
    /// precise error messages.
    pub fn routing_table(&self) -> Result<RoutingTable, ConfigValidationError> {
        let baseline = parse_target("providers.baseline", &self.providers.baseline)?;
        let local = parse_target("providers.local", &self.providers.local)?;

        let mut table = RoutingTable::new(baseline, local).with_performance_window(
            self.routing.performance_window_days,
            self.routing.min_samples,
        );
        if let Some(default) = &self.routing.default_model {
            table = table.with_default_model(parse_target("routing.default_model", default)?);
        }
        for profile in &self.routing.models {
            table = table.with_profile(profile.clone());
        }
        for (subject, target) in &self.routing.subjects {
            let target = parse_target(&format!("routing.subjects.{}", subject), target)?;
            table = table.with_subject(subject, target);
        }
        Ok(table)
    }

    pub fn preferred_provider(&self) -> Result<Option<ProviderKind>, ConfigValidationError> {
        self.routing
            .preferred_provider
            .as_deref()
            .map(|p| p.parse().map_err(|e| ConfigValidationError::InvalidProvider(format!("{}", e))))
            .transpose()
    }
}

fn parse_target(field: &str, value: &str) -> Result<ModelTarget, ConfigValidationError> {
    if value.trim().is_empty() {
        return Err(ConfigValidationError::EmptyModelId(field.to_string()));
    }
    value
        .parse()
        .map_err(|e| ConfigValidationError::InvalidModelTarget {
            field: field.to_string(),
            message: format!("{}", e),
        })
}
