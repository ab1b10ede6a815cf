//! Final answer synthesis for the complex path.

use crate::ports::llm_gateway::GenerationOptions;
use crate::use_cases::failover::{FailoverInvoker, LlmRequest};
use reasoning_domain::{ModelTarget, PromptTemplate, ProviderDecision, Query};
use std::sync::Arc;
use tracing::{info, warn};

/// Synthesized answer and who wrote it.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub answer: String,
    /// None when synthesis failed and the raw findings were returned
    pub served_by: Option<ModelTarget>,
    pub degraded: bool,
}

pub struct Synthesizer {
    invoker: Arc<FailoverInvoker>,
}

impl Synthesizer {
    pub fn new(invoker: Arc<FailoverInvoker>) -> Self {
        Self { invoker }
    }

    /// Combine task findings into one answer.
    ///
    /// Never fails: when the model call errors, the findings are returned
    /// verbatim behind a visible degradation notice.
    pub async fn synthesize(
        &self,
        query: &Query,
        decision: &ProviderDecision,
        findings: &str,
    ) -> Synthesis {
        let prompt = PromptTemplate::synthesis_prompt(query.text(), findings);
        let options = GenerationOptions::default();
        let request = LlmRequest::new(&prompt, PromptTemplate::synthesis_system(), &options)
            .with_history(query.history());

        match self.invoker.call(decision, request).await {
            Ok(completion) => {
                info!(model = %completion.served_by, "Synthesis complete");
                Synthesis {
                    answer: completion.text.trim().to_string(),
                    served_by: Some(completion.served_by),
                    degraded: false,
                }
            }
            Err(e) => {
                warn!(error = %e, "Synthesis failed, returning raw findings");
                Synthesis {
                    answer: PromptTemplate::degraded_answer(findings),
                    served_by: None,
                    degraded: true,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::GatewayError;
    use crate::use_cases::failover::tests::{ScriptedGateway, decision_for};
    use reasoning_domain::{ChatTurn, DEGRADED_NOTICE, ProviderKind, RequestContext};

    fn synthesizer(responses: Vec<Result<String, GatewayError>>) -> (Synthesizer, Arc<ScriptedGateway>) {
        let gateway = Arc::new(ScriptedGateway::new(responses));
        let invoker = Arc::new(FailoverInvoker::new(gateway.clone()));
        (Synthesizer::new(invoker), gateway)
    }

    fn decision() -> reasoning_domain::ProviderDecision {
        decision_for(ModelTarget::new(ProviderKind::Gemini, "gemini-2.5-flash"))
    }

    #[tokio::test]
    async fn test_synthesis_uses_findings() {
        let (synth, gateway) = synthesizer(vec![Ok("  Final answer.  ".to_string())]);
        let query = Query::new(
            "Why is the sky blue?",
            RequestContext::default().with_history(vec![ChatTurn::user("hi")]),
        );

        let result = synth.synthesize(&query, &decision(), "[a] scattering\nRayleigh").await;

        assert_eq!(result.answer, "Final answer.");
        assert!(!result.degraded);
        assert_eq!(result.served_by.unwrap().model, "gemini-2.5-flash");
        assert!(gateway.prompts()[0].contains("Rayleigh"));
    }

    #[tokio::test]
    async fn test_failure_returns_raw_findings() {
        let (synth, _) = synthesizer(vec![Err(GatewayError::Timeout)]);

        let result = synth
            .synthesize(&Query::plain("q"), &decision(), "[a] step\nraw finding")
            .await;

        assert!(result.degraded);
        assert!(result.served_by.is_none());
        assert!(result.answer.starts_with(DEGRADED_NOTICE));
        assert!(result.answer.contains("raw finding"));
    }
}
