//! Ollama adapter (`/api/chat`) and liveness probe (`/api/tags`).

use super::ProviderAdapter;
use super::http::{build_client, send_json};
use async_trait::async_trait;
use reasoning_application::ports::llm_gateway::{GatewayError, GenerationOptions};
use reasoning_application::ports::provider_probe::LocalProviderProbe;
use reasoning_domain::{ChatRole, ChatTurn, ProviderKind};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

pub struct OllamaAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaAdapter {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ProviderAdapter for OllamaAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Ollama
    }

    async fn generate(
        &self,
        model: &str,
        history: &[ChatTurn],
        prompt: &str,
        system_prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GatewayError> {
        debug!(model, history = history.len(), "Ollama chat");
        let body = request_body(model, history, prompt, system_prompt, options);
        let request = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body);

        let response = send_json(ProviderKind::Ollama, request).await?;
        response
            .pointer("/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| GatewayError::InvalidResponse("Ollama: missing message content".to_string()))
    }
}

/// Chat messages in the OpenAI-style role vocabulary shared by Ollama and
/// OpenAI-compatible servers.
pub(crate) fn chat_messages(history: &[ChatTurn], prompt: &str, system_prompt: &str) -> Vec<Value> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    if !system_prompt.is_empty() {
        messages.push(json!({"role": "system", "content": system_prompt}));
    }
    for turn in history {
        let role = match turn.role {
            ChatRole::User => "user",
            ChatRole::Model => "assistant",
        };
        messages.push(json!({"role": role, "content": turn.content}));
    }
    messages.push(json!({"role": "user", "content": prompt}));
    messages
}

fn request_body(
    model: &str,
    history: &[ChatTurn],
    prompt: &str,
    system_prompt: &str,
    options: &GenerationOptions,
) -> Value {
    let mut body = json!({
        "model": model,
        "messages": chat_messages(history, prompt, system_prompt),
        "stream": false,
    });
    if options.json_mode {
        body["format"] = json!("json");
    }

    let mut model_options = serde_json::Map::new();
    if let Some(t) = options.temperature {
        model_options.insert("temperature".into(), json!(t));
    }
    if let Some(max) = options.max_output_tokens {
        model_options.insert("num_predict".into(), json!(max));
    }
    if !model_options.is_empty() {
        body["options"] = Value::Object(model_options);
    }
    body
}

/// Reports the local Ollama server alive when `/api/tags` answers in time.
pub struct OllamaProbe {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaProbe {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl LocalProviderProbe for OllamaProbe {
    async fn is_alive(&self) -> bool {
        match self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "Ollama liveness probe failed");
                false
            }
        }
    }
}
