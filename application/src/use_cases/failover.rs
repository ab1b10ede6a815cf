//! Call-with-failover shared by every model call of a run.
//!
//! The chosen model is tried first. On a quota or rate-limit error the same
//! request is retried exactly once on the decision's locally hosted
//! fallback; every other error, and any error from the retry, propagates.
//! Each attempt is recorded in the performance store.

use crate::ports::llm_gateway::{GatewayError, GenerationOptions, LlmGateway};
use crate::ports::performance_store::{NoPerformanceStore, PerformanceRecord, PerformanceStore};
use reasoning_domain::{ChatTurn, ModelTarget, ProviderDecision};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Text produced by a model plus who produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub served_by: ModelTarget,
    /// True when the local fallback answered after a quota error
    pub failed_over: bool,
}

/// A single model request, independent of which model will serve it.
#[derive(Debug, Clone, Copy)]
pub struct LlmRequest<'a> {
    pub history: &'a [ChatTurn],
    pub prompt: &'a str,
    pub system_prompt: &'a str,
    pub options: &'a GenerationOptions,
}

impl<'a> LlmRequest<'a> {
    pub fn new(prompt: &'a str, system_prompt: &'a str, options: &'a GenerationOptions) -> Self {
        Self {
            history: &[],
            prompt,
            system_prompt,
            options,
        }
    }

    pub fn with_history(mut self, history: &'a [ChatTurn]) -> Self {
        self.history = history;
        self
    }
}

pub struct FailoverInvoker {
    gateway: Arc<dyn LlmGateway>,
    performance: Arc<dyn PerformanceStore>,
}

impl FailoverInvoker {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            gateway,
            performance: Arc::new(NoPerformanceStore),
        }
    }

    pub fn with_performance_store(mut self, store: Arc<dyn PerformanceStore>) -> Self {
        self.performance = store;
        self
    }

    /// Call the decision's chosen model, failing over once on quota errors.
    pub async fn call(
        &self,
        decision: &ProviderDecision,
        request: LlmRequest<'_>,
    ) -> Result<Completion, GatewayError> {
        let primary = &decision.chosen;

        match self.attempt(decision, primary, request).await {
            Ok(text) => Ok(Completion {
                text,
                served_by: primary.clone(),
                failed_over: false,
            }),
            Err(error) if error.is_quota_exhausted() && !primary.provider.is_local() => {
                let Some(local) = decision.local_fallback() else {
                    warn!(model = %primary, "Quota exhausted and no local fallback configured");
                    return Err(error);
                };
                warn!(from = %primary, to = %local, "Quota exhausted, failing over to local provider");
                let text = self.attempt(decision, local, request).await?;
                Ok(Completion {
                    text,
                    served_by: local.clone(),
                    failed_over: true,
                })
            }
            Err(error) => Err(error),
        }
    }

    async fn attempt(
        &self,
        decision: &ProviderDecision,
        target: &ModelTarget,
        request: LlmRequest<'_>,
    ) -> Result<String, GatewayError> {
        let started = Instant::now();
        let result = self
            .gateway
            .generate_with_history(
                target,
                request.history,
                request.prompt,
                request.system_prompt,
                request.options,
            )
            .await;
        let latency_ms = started.elapsed().as_millis() as u64;

        debug!(model = %target, latency_ms, success = result.is_ok(), "Model call finished");
        self.performance.record(PerformanceRecord::new(
            target.clone(),
            decision.query_category,
            result.is_ok(),
            latency_ms,
        ));
        result
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ports::performance_store::ModelStats;
    use async_trait::async_trait;
    use reasoning_domain::{ProviderKind, QueryCategory, RoutingLogic};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted gateway: pops one queued result per call and records the
    /// target and prompt of every call.
    pub(crate) struct ScriptedGateway {
        responses: Mutex<VecDeque<Result<String, GatewayError>>>,
        pub calls: Mutex<Vec<(ModelTarget, String)>>,
    }

    impl ScriptedGateway {
        pub(crate) fn new(responses: Vec<Result<String, GatewayError>>) -> Self {
            Self {
                responses: Mutex::new(VecDeque::from(responses)),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub(crate) fn prompts(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(_, p)| p.clone()).collect()
        }
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        async fn generate_with_history(
            &self,
            target: &ModelTarget,
            _history: &[ChatTurn],
            prompt: &str,
            _system_prompt: &str,
            _options: &GenerationOptions,
        ) -> Result<String, GatewayError> {
            self.calls
                .lock()
                .unwrap()
                .push((target.clone(), prompt.to_string()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GatewayError::RequestFailed("No more responses".to_string())))
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        records: Mutex<Vec<PerformanceRecord>>,
    }

    impl PerformanceStore for RecordingStore {
        fn record(&self, record: PerformanceRecord) {
            self.records.lock().unwrap().push(record);
        }

        fn stats(&self, _category: QueryCategory, _window: chrono::Duration) -> Vec<ModelStats> {
            Vec::new()
        }
    }

    fn gemini() -> ModelTarget {
        ModelTarget::new(ProviderKind::Gemini, "gemini-2.5-flash")
    }

    fn ollama() -> ModelTarget {
        ModelTarget::new(ProviderKind::Ollama, "llama3.1:8b")
    }

    pub(crate) fn decision_for(chosen: ModelTarget) -> ProviderDecision {
        ProviderDecision::new(
            chosen,
            RoutingLogic::SystemDefault,
            QueryCategory::General,
            &gemini(),
            &ollama(),
        )
    }

    fn request<'a>(options: &'a GenerationOptions) -> LlmRequest<'a> {
        LlmRequest::new("prompt", "system", options)
    }

    #[tokio::test]
    async fn test_success_on_primary() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok("hi".to_string())]));
        let invoker = FailoverInvoker::new(gateway.clone());
        let options = GenerationOptions::default();

        let completion = invoker.call(&decision_for(gemini()), request(&options)).await.unwrap();
        assert_eq!(completion.text, "hi");
        assert_eq!(completion.served_by, gemini());
        assert!(!completion.failed_over);
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn test_quota_fails_over_once_to_local() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Err(GatewayError::quota("gemini", "429")),
            Ok("local answer".to_string()),
        ]));
        let store = Arc::new(RecordingStore::default());
        let invoker = FailoverInvoker::new(gateway.clone()).with_performance_store(store.clone());
        let options = GenerationOptions::default();

        let completion = invoker.call(&decision_for(gemini()), request(&options)).await.unwrap();
        assert_eq!(completion.served_by, ollama());
        assert!(completion.failed_over);

        let calls = gateway.calls.lock().unwrap();
        assert_eq!(calls[0].0, gemini());
        assert_eq!(calls[1].0, ollama());
        assert_eq!(calls[0].1, calls[1].1);

        let records = store.records.lock().unwrap();
        assert_eq!(records.len(), 2);
        assert!(!records[0].success);
        assert!(records[1].success);
    }

    #[tokio::test]
    async fn test_no_second_hop() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Err(GatewayError::quota("gemini", "429")),
            Err(GatewayError::quota("ollama", "busy")),
            Ok("never".to_string()),
        ]));
        let invoker = FailoverInvoker::new(gateway.clone());
        let options = GenerationOptions::default();

        let err = invoker.call(&decision_for(gemini()), request(&options)).await.unwrap_err();
        assert!(err.is_quota_exhausted());
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn test_local_primary_does_not_fail_over() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Err(GatewayError::quota("ollama", "busy"))]));
        let invoker = FailoverInvoker::new(gateway.clone());
        let options = GenerationOptions::default();

        assert!(invoker.call(&decision_for(ollama()), request(&options)).await.is_err());
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn test_other_errors_propagate() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Err(GatewayError::Timeout)]));
        let invoker = FailoverInvoker::new(gateway.clone());
        let options = GenerationOptions::default();

        let err = invoker.call(&decision_for(gemini()), request(&options)).await.unwrap_err();
        assert_eq!(err, GatewayError::Timeout);
        assert_eq!(gateway.call_count(), 1);
    }
}
