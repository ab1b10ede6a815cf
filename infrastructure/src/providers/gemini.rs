//! Gemini adapter (`models/{model}:generateContent`).
//!
//! Gemini is the baseline remote provider. Quota exhaustion arrives either
//! as HTTP 429 or as a `RESOURCE_EXHAUSTED` status in the error body; both
//! map to [`GatewayError::QuotaExhausted`].

use super::ProviderAdapter;
use super::http::{build_client, send_json};
use async_trait::async_trait;
use reasoning_application::ports::llm_gateway::{GatewayError, GenerationOptions};
use reasoning_domain::{ChatRole, ChatTurn, ProviderKind};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

pub struct GeminiAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeminiAdapter {
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

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn generate(
        &self,
        model: &str,
        history: &[ChatTurn],
        prompt: &str,
        system_prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GatewayError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GatewayError::Unauthorized("Gemini API key is not configured".to_string()))?;

        debug!(model, history = history.len(), "Gemini generateContent");
        let body = request_body(history, prompt, system_prompt, options);
        let request = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
            .json(&body);

        let response = send_json(ProviderKind::Gemini, request).await?;
        response_text(&response)
    }
}

fn request_body(
    history: &[ChatTurn],
    prompt: &str,
    system_prompt: &str,
    options: &GenerationOptions,
) -> Value {
    let mut contents: Vec<Value> = history
        .iter()
        .map(|turn| {
            let role = match turn.role {
                ChatRole::User => "user",
                ChatRole::Model => "model",
            };
            json!({"role": role, "parts": [{"text": turn.content}]})
        })
        .collect();
    contents.push(json!({"role": "user", "parts": [{"text": prompt}]}));

    let mut generation_config = serde_json::Map::new();
    if let Some(t) = options.temperature {
        generation_config.insert("temperature".into(), json!(t));
    }
    if let Some(max) = options.max_output_tokens {
        generation_config.insert("maxOutputTokens".into(), json!(max));
    }
    if options.json_mode {
        generation_config.insert("responseMimeType".into(), json!("application/json"));
    }

    let mut body = json!({ "contents": contents });
    if !system_prompt.is_empty() {
        body["systemInstruction"] = json!({"parts": [{"text": system_prompt}]});
    }
    if !generation_config.is_empty() {
        body["generationConfig"] = Value::Object(generation_config);
    }
    body
}

fn response_text(response: &Value) -> Result<String, GatewayError> {
    let parts = response
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array);

    let Some(parts) = parts else {
        let reason = response
            .pointer("/promptFeedback/blockReason")
            .and_then(Value::as_str)
            .unwrap_or("no candidates");
        return Err(GatewayError::InvalidResponse(format!("Gemini: {}", reason)));
    };

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();
    if text.is_empty() {
        return Err(GatewayError::InvalidResponse("Gemini: empty response".to_string()));
    }
    Ok(text)
}
