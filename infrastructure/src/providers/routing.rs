use super::ProviderAdapter;
use async_trait::async_trait;
use reasoning_application::ports::llm_gateway::{GatewayError, GenerationOptions, LlmGateway};
use reasoning_domain::{ChatTurn, ModelTarget, ProviderKind};
use std::sync::Arc;
use tracing::debug;

/// Gateway dispatching each call to the adapter of the target's provider.
///
/// Provider choice is already made by the router, so resolution here is a
/// plain lookup: the first registered adapter of that kind wins.
pub struct RoutingGateway {
    providers: Vec<Arc<dyn ProviderAdapter>>,
}

impl RoutingGateway {
    pub fn new(providers: Vec<Arc<dyn ProviderAdapter>>) -> Self {
        Self { providers }
    }

    pub fn provider_kinds(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(|p| p.kind()).collect()
    }

    fn resolve_provider(&self, kind: ProviderKind) -> Result<&dyn ProviderAdapter, GatewayError> {
        self.providers
            .iter()
            .find(|p| p.kind() == kind)
            .map(|p| p.as_ref())
            .ok_or_else(|| {
                GatewayError::ModelNotAvailable(format!("No adapter registered for provider {}", kind))
            })
    }
}

#[async_trait]
impl LlmGateway for RoutingGateway {
    async fn generate_with_history(
        &self,
        target: &ModelTarget,
        history: &[ChatTurn],
        prompt: &str,
        system_prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GatewayError> {
        let provider = self.resolve_provider(target.provider)?;
        debug!(model = %target, json = options.json_mode, "Dispatching model call");
        provider
            .generate(&target.model, history, prompt, system_prompt, options)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // -- Mock ProviderAdapter --------------------------------------------------

    struct MockProvider {
        kind: ProviderKind,
        models: Mutex<Vec<String>>,
    }

    impl MockProvider {
        fn new(kind: ProviderKind) -> Arc<Self> {
            Arc::new(Self {
                kind,
                models: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ProviderAdapter for MockProvider {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        async fn generate(
            &self,
            model: &str,
            _history: &[ChatTurn],
            _prompt: &str,
            _system_prompt: &str,
            _options: &GenerationOptions,
        ) -> Result<String, GatewayError> {
            self.models.lock().unwrap().push(model.to_string());
            Ok(format!("{} answered", self.kind))
        }
    }

    fn adapters(list: &[Arc<MockProvider>]) -> Vec<Arc<dyn ProviderAdapter>> {
        list.iter()
            .map(|p| p.clone() as Arc<dyn ProviderAdapter>)
            .collect()
    }

    #[tokio::test]
    async fn dispatches_on_target_provider() {
        let gemini = MockProvider::new(ProviderKind::Gemini);
        let ollama = MockProvider::new(ProviderKind::Ollama);
        let gw = RoutingGateway::new(adapters(&[gemini.clone(), ollama.clone()]));

        let target = ModelTarget::new(ProviderKind::Ollama, "llama3.1:8b");
        let text = gw
            .generate_with_history(&target, &[], "q", "", &GenerationOptions::default())
            .await
            .unwrap();

        assert_eq!(text, "ollama answered");
        assert_eq!(*ollama.models.lock().unwrap(), vec!["llama3.1:8b".to_string()]);
        assert!(gemini.models.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_adapter_is_model_not_available() {
        let gw = RoutingGateway::new(adapters(&[MockProvider::new(ProviderKind::Gemini)]));

        let target = ModelTarget::new(ProviderKind::OpenAi, "gpt-4o");
        let err = gw
            .generate_with_history(&target, &[], "q", "", &GenerationOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::ModelNotAvailable(_)));
        assert!(!err.is_quota_exhausted());
    }

    #[test]
    fn lists_registered_kinds() {
        let gw = RoutingGateway::new(adapters(&[
            MockProvider::new(ProviderKind::Gemini),
            MockProvider::new(ProviderKind::OpenAi),
        ]));
        assert_eq!(gw.provider_kinds(), vec![ProviderKind::Gemini, ProviderKind::OpenAi]);
    }
}
