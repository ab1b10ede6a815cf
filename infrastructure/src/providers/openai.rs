//! OpenAI-compatible adapter (`/v1/chat/completions`).

use super::ProviderAdapter;
use super::http::{build_client, send_json};
use super::ollama::chat_messages;
use async_trait::async_trait;
use reasoning_application::ports::llm_gateway::{GatewayError, GenerationOptions};
use reasoning_domain::{ChatTurn, ProviderKind};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

pub struct OpenAiAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAiAdapter {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn generate(
        &self,
        model: &str,
        history: &[ChatTurn],
        prompt: &str,
        system_prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GatewayError> {
        debug!(model, history = history.len(), "OpenAI chat completion");
        let mut body = json!({
            "model": model,
            "messages": chat_messages(history, prompt, system_prompt),
        });
        if let Some(t) = options.temperature {
            body["temperature"] = json!(t);
        }
        if let Some(max) = options.max_output_tokens {
            body["max_tokens"] = json!(max);
        }
        if options.json_mode {
            body["response_format"] = json!({"type": "json_object"});
        }

        let mut request = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&body);
        // Local OpenAI-compatible servers often run without a key
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = send_json(ProviderKind::OpenAi, request).await?;
        response_text(&response)
    }
}

fn response_text(response: &Value) -> Result<String, GatewayError> {
    response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| GatewayError::InvalidResponse("OpenAI: missing choices[0].message.content".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text() {
        let response = json!({"choices": [{"message": {"role": "assistant", "content": "hi"}}]});
        assert_eq!(response_text(&response).unwrap(), "hi");
        assert!(response_text(&json!({"choices": []})).is_err());
    }
}
