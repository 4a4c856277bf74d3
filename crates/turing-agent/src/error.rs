//! Error types for the agent crate.

use thiserror::Error;

/// Errors that can occur in agent operations.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Model invocation failed (transport, auth, rate limit, provider error).
    #[error("model invocation failed: {0}")]
    ModelInvocation(String),

    /// Provider response could not be understood.
    #[error("failed to parse response: {0}")]
    ResponseParse(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error (missing key, unroutable model id).
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AgentError::ModelInvocation("timeout".into());
        assert_eq!(err.to_string(), "model invocation failed: timeout");

        let err = AgentError::Configuration("Missing OPENAI_API_KEY environment variable".into());
        assert_eq!(
            err.to_string(),
            "configuration error: Missing OPENAI_API_KEY environment variable"
        );
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: AgentError = json_err.into();
        assert!(matches!(err, AgentError::Serialization(_)));
    }
}
