//! LLM provider adapters.
//!
//! Each adapter speaks one provider's HTTP API. [`RoutingGateway`] holds all
//! of them and dispatches on the provider of the requested [`ModelTarget`].
//!
//! [`ModelTarget`]: reasoning_domain::ModelTarget

pub mod gemini;
pub mod http;
pub mod ollama;
pub mod openai;
pub mod routing;

pub use gemini::GeminiAdapter;
pub use ollama::{OllamaAdapter, OllamaProbe};
pub use openai::OpenAiAdapter;
pub use routing::RoutingGateway;

use crate::config::FileProvidersConfig;
use async_trait::async_trait;
use reasoning_application::ports::llm_gateway::{GatewayError, GenerationOptions};
use reasoning_domain::{ChatTurn, ProviderKind};
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn generate(
        &self,
        model: &str,
        history: &[ChatTurn],
        prompt: &str,
        system_prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GatewayError>;
}

/// Build one adapter per supported provider from configuration.
///
/// Adapters are created even without an API key; the provider then answers
/// with an authorization error that surfaces on first use.
pub fn build_adapters(
    config: &FileProvidersConfig,
) -> Result<Vec<Arc<dyn ProviderAdapter>>, GatewayError> {
    let gemini_key = config.gemini.resolve_api_key();
    if gemini_key.is_none() {
        tracing::warn!(
            env = %config.gemini.api_key_env,
            "No Gemini API key configured, remote calls will be rejected"
        );
    }

    Ok(vec![
        Arc::new(GeminiAdapter::new(
            &config.gemini.base_url,
            gemini_key,
            Duration::from_secs(config.gemini.timeout_secs),
        )?),
        Arc::new(OllamaAdapter::new(
            &config.ollama.base_url,
            Duration::from_secs(config.ollama.timeout_secs),
        )?),
        Arc::new(OpenAiAdapter::new(
            &config.openai.base_url,
            config.openai.resolve_api_key(),
            Duration::from_secs(config.openai.timeout_secs),
        )?),
    ])
}

/// Liveness probe for the locally hosted provider.
pub fn build_probe(config: &FileProvidersConfig) -> Result<OllamaProbe, GatewayError> {
    OllamaProbe::new(
        &config.ollama.base_url,
        Duration::from_millis(config.ollama.probe_timeout_ms),
    )
}
