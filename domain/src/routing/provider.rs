//! LLM provider identity.

use crate::core::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Language-model providers the engine can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProviderKind {
    /// Baseline remote provider
    #[default]
    Gemini,
    /// Locally hosted provider
    Ollama,
    /// Any OpenAI-compatible endpoint
    OpenAi,
}

impl ProviderKind {
    /// The remote provider every other choice falls back to first.
    pub const BASELINE: ProviderKind = ProviderKind::Gemini;
    /// The locally hosted provider used for quota failover.
    pub const LOCAL: ProviderKind = ProviderKind::Ollama;

    pub fn as_str(&self) -> &str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::Ollama => "ollama",
            ProviderKind::OpenAi => "openai",
        }
    }

    pub fn is_local(&self) -> bool {
        *self == Self::LOCAL
    }

    pub fn is_baseline(&self) -> bool {
        *self == Self::BASELINE
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "ollama" | "local" => Ok(ProviderKind::Ollama),
            "openai" | "open_ai" => Ok(ProviderKind::OpenAi),
            other => Err(DomainError::UnknownProvider(other.to_string())),
        }
    }
}

impl Serialize for ProviderKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProviderKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A concrete model on a concrete provider, written `provider/model`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelTarget {
    pub provider: ProviderKind,
    pub model: String,
}

impl ModelTarget {
    pub fn new(provider: ProviderKind, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

impl std::fmt::Display for ModelTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

impl std::str::FromStr for ModelTarget {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (provider, model) = s
            .split_once('/')
            .ok_or_else(|| DomainError::InvalidModelTarget(s.to_string()))?;
        let model = model.trim();
        if model.is_empty() {
            return Err(DomainError::InvalidModelTarget(s.to_string()));
        }
        Ok(Self::new(provider.parse()?, model))
    }
}

impl Serialize for ModelTarget {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ModelTarget {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_parses_ollama_tags() {
        let target: ModelTarget = "ollama/llama3.1:8b".parse().unwrap();
        assert_eq!(target.provider, ProviderKind::Ollama);
        assert_eq!(target.model, "llama3.1:8b");
        assert_eq!(target.to_string(), "ollama/llama3.1:8b");
    }

    #[test]
    fn test_target_rejects_missing_model() {
        assert!("gemini/".parse::<ModelTarget>().is_err());
        assert!("gemini".parse::<ModelTarget>().is_err());
        assert!("bard/x".parse::<ModelTarget>().is_err());
    }

    #[test]
    fn test_provider_aliases() {
        assert_eq!("Google".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!("local".parse::<ProviderKind>().unwrap(), ProviderKind::Ollama);
        assert!(ProviderKind::Ollama.is_local());
        assert!(ProviderKind::Gemini.is_baseline());
    }

    #[test]
    fn test_target_serde() {
        let target = ModelTarget::new(ProviderKind::OpenAi, "gpt-4o-mini");
        let json = serde_json::to_string(&target).unwrap();
        assert_eq!(json, "\"openai/gpt-4o-mini\"");
        let back: ModelTarget = serde_json::from_str(&json).unwrap();
        assert_eq!(back, target);
    }
}
