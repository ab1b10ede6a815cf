//! HTTP plumbing shared by every provider adapter.

use reasoning_application::ports::llm_gateway::GatewayError;
use reasoning_domain::ProviderKind;
use std::time::Duration;

/// Markers of quota or rate-limit exhaustion in an error body.
const QUOTA_MARKERS: &[&str] = &["resource_exhausted", "quota", "rate limit", "rate_limit"];

/// Build a client with connect and request timeouts.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, GatewayError> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10).min(timeout))
        .timeout(timeout)
        .build()
        .map_err(|e| GatewayError::ConnectionError(format!("Failed to build HTTP client: {}", e)))
}

/// Map a non-success HTTP status and body to a gateway error.
///
/// 429, and any body mentioning quota exhaustion, map to
/// [`GatewayError::QuotaExhausted`] so the failover hop can trigger.
pub fn map_status(provider: ProviderKind, status: u16, body: &str) -> GatewayError {
    let lowered = body.to_lowercase();
    if status == 429 || QUOTA_MARKERS.iter().any(|m| lowered.contains(m)) {
        return GatewayError::quota(provider, condense(body));
    }

    match status {
        401 | 403 => GatewayError::Unauthorized(format!("{}: {}", provider, condense(body))),
        404 => GatewayError::ModelNotAvailable(format!("{}: {}", provider, condense(body))),
        408 | 504 => GatewayError::Timeout,
        _ => GatewayError::RequestFailed(format!(
            "{} HTTP {}: {}",
            provider,
            status,
            condense(body)
        )),
    }
}

/// Map a transport-level failure.
pub fn map_transport(provider: ProviderKind, error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout
    } else if error.is_connect() {
        GatewayError::ConnectionError(format!("{}: {}", provider, error))
    } else if error.is_decode() {
        GatewayError::InvalidResponse(format!("{}: {}", provider, error))
    } else {
        GatewayError::RequestFailed(format!("{}: {}", provider, error))
    }
}

/// Send `request` and return the body of a successful response.
pub async fn send_json(
    provider: ProviderKind,
    request: reqwest::RequestBuilder,
) -> Result<serde_json::Value, GatewayError> {
    let response = request
        .send()
        .await
        .map_err(|e| map_transport(provider, e))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| map_transport(provider, e))?;

    if !status.is_success() {
        return Err(map_status(provider, status.as_u16(), &body));
    }

    serde_json::from_str(&body)
        .map_err(|e| GatewayError::InvalidResponse(format!("{}: {}", provider, e)))
}

fn condense(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "(empty body)".to_string()
    } else {
        reasoning_domain::truncate_str(trimmed, 300)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_429_is_quota() {
        let err = map_status(ProviderKind::Gemini, 429, "Too Many Requests");
        assert!(err.is_quota_exhausted());
    }

    #[test]
    fn test_resource_exhausted_body_is_quota() {
        let body = r#"{"error": {"code": 400, "status": "RESOURCE_EXHAUSTED"}}"#;
        assert!(map_status(ProviderKind::Gemini, 400, body).is_quota_exhausted());
    }

    #[test]
    fn test_other_statuses() {
        assert!(matches!(
            map_status(ProviderKind::OpenAi, 401, "bad key"),
            GatewayError::Unauthorized(_)
        ));
        assert!(matches!(
            map_status(ProviderKind::Ollama, 404, "model 'x' not found"),
            GatewayError::ModelNotAvailable(_)
        ));
        assert_eq!(map_status(ProviderKind::Ollama, 504, ""), GatewayError::Timeout);
        let err = map_status(ProviderKind::OpenAi, 500, "");
        assert_eq!(
            err,
            GatewayError::RequestFailed("openai HTTP 500: (empty body)".to_string())
        );
    }
}
