//! Provider configuration from TOML (`[providers]` section)

use serde::{Deserialize, Serialize};

/// Gemini API configuration (the baseline remote provider).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGeminiConfig {
    /// Environment variable name for the API key (default: "GEMINI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for FileGeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Ollama configuration (the locally hosted provider).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOllamaConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Liveness probe timeout in milliseconds.
    pub probe_timeout_ms: u64,
}

impl Default for FileOllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            timeout_secs: 120,
            probe_timeout_ms: 500,
        }
    }
}

/// OpenAI-compatible API configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenAiConfig {
    /// Environment variable name for the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    /// Base URL (can point at any OpenAI-compatible server).
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for FileOpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.openai.com".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    /// Baseline remote model as `provider/model`.
    pub baseline: String,
    /// Locally hosted model as `provider/model`.
    pub local: String,
    pub gemini: FileGeminiConfig,
    pub ollama: FileOllamaConfig,
    pub openai: FileOpenAiConfig,
}

impl Default for FileProvidersConfig {
    fn default() -> Self {
        Self {
            baseline: "gemini/gemini-2.5-flash".to_string(),
            local: "ollama/llama3.1:8b".to_string(),
            gemini: FileGeminiConfig::default(),
            ollama: FileOllamaConfig::default(),
            openai: FileOpenAiConfig::default(),
        }
    }
}

/// Resolve an API key: direct value first, then the named env var.
pub(crate) fn resolve_api_key(direct: &Option<String>, env_name: &str) -> Option<String> {
    direct
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| std::env::var(env_name).ok())
        .filter(|k| !k.trim().is_empty())
}

impl FileGeminiConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_api_key(&self.api_key, &self.api_key_env)
    }
}

impl FileOpenAiConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_api_key(&self.api_key, &self.api_key_env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_key_wins() {
        let config = FileGeminiConfig {
            api_key: Some("direct".to_string()),
            api_key_env: "TUTOR_TEST_UNSET_KEY_VAR".to_string(),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("direct"));
    }

    #[test]
    fn test_blank_key_is_ignored() {
        let config = FileOpenAiConfig {
            api_key: Some("  ".to_string()),
            api_key_env: "TUTOR_TEST_UNSET_KEY_VAR".to_string(),
            ..Default::default()
        };
        assert!(config.resolve_api_key().is_none());
    }
}
