//! LLM Gateway port
//!
//! Defines the interface for generating text with a concrete model on a
//! concrete provider.

use async_trait::async_trait;
use reasoning_domain::{ChatTurn, ModelTarget};
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// Quota or rate limit exhausted; triggers the failover hop
    #[error("Quota exhausted on {provider}: {message}")]
    QuotaExhausted { provider: String, message: String },

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,
}

impl GatewayError {
    pub fn quota(provider: impl std::fmt::Display, message: impl Into<String>) -> Self {
        GatewayError::QuotaExhausted {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Whether this error should trigger the failover hop.
    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, GatewayError::QuotaExhausted { .. })
    }
}

/// Per-call generation options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOptions {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    /// Ask the provider for a JSON response when it supports it
    pub json_mode: bool,
}

impl GenerationOptions {
    pub fn json() -> Self {
        Self {
            json_mode: true,
            ..Self::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }
}

/// Gateway for LLM communication
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Generate a completion for `prompt` after replaying `history`.
    ///
    /// Must return [`GatewayError::QuotaExhausted`] for quota and rate-limit
    /// failures so callers can fail over.
    async fn generate_with_history(
        &self,
        target: &ModelTarget,
        history: &[ChatTurn],
        prompt: &str,
        system_prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_detection() {
        assert!(GatewayError::quota("gemini", "429").is_quota_exhausted());
        assert!(!GatewayError::Timeout.is_quota_exhausted());
        assert_eq!(
            GatewayError::quota("gemini", "RESOURCE_EXHAUSTED").to_string(),
            "Quota exhausted on gemini: RESOURCE_EXHAUSTED"
        );
    }

    #[test]
    fn test_options_builder() {
        let options = GenerationOptions::json()
            .with_temperature(0.2)
            .with_max_output_tokens(512);
        assert!(options.json_mode);
        assert_eq!(options.temperature, Some(0.2));
        assert_eq!(options.max_output_tokens, Some(512));
    }
}
