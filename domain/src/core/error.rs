//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Invalid model target '{0}': expected provider/model")]
    InvalidModelTarget(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = DomainError::UnknownProvider("watsonx".to_string());
        assert_eq!(error.to_string(), "Unknown provider: watsonx");
        assert_eq!(
            DomainError::InvalidModelTarget("gemini".to_string()).to_string(),
            "Invalid model target 'gemini': expected provider/model"
        );
    }
}
