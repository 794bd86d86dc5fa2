//! Error types for garden-designer
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur while running a design turn
#[derive(Debug, Error)]
pub enum GardenError {
    /// Generic LLM client failure
    #[error("LLM error: {0}")]
    Llm(String),

    /// Non-success HTTP status from the LLM service
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// HTTP 429 from the LLM service
    #[error("Rate limited, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    /// API key environment variable is not set
    #[error("Missing API key: environment variable {env_var} not set")]
    MissingApiKey { env_var: String },

    /// Transport failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Malformed or interrupted streaming response
    #[error("Stream error: {0}")]
    Stream(String),

    /// Tool arguments could not be decoded
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Tool handler does not match the descriptor set
    #[error("Registry error: {0}")]
    Registry(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for garden-designer operations
pub type Result<T> = std::result::Result<T, GardenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error() {
        let err = GardenError::Llm("no choices in response".to_string());
        assert_eq!(err.to_string(), "LLM error: no choices in response");
    }

    #[test]
    fn test_api_error() {
        let err = GardenError::Api {
            status: 401,
            message: "invalid key".to_string(),
        };
        assert_eq!(err.to_string(), "API error 401: invalid key");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = GardenError::RateLimited { retry_after_secs: 20 };
        assert_eq!(err.to_string(), "Rate limited, retry after 20 seconds");
    }

    #[test]
    fn test_missing_api_key_error() {
        let err = GardenError::MissingApiKey {
            env_var: "OPENAI_API_KEY".to_string(),
        };
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: GardenError = json_err.into();
        assert!(matches!(err, GardenError::Json(_)));
    }
}
