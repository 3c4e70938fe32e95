//! Error types for the OpenAI client.

use thiserror::Error;

/// Result type for OpenAI client operations.
pub type Result<T> = std::result::Result<T, OpenAIError>;

/// OpenAI client errors, one variant per failure surface of the
/// client: configuration, transport, API status, response bodies,
/// SSE chunks, and embedding batch shape.
#[derive(Debug, Error)]
pub enum OpenAIError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx API response (rate limit, invalid request)
    #[error("API error: {status}: {message}")]
    Api { status: u16, message: String },

    /// Malformed body on a non-streaming response
    #[error("Parse error: {0}")]
    Parse(String),

    /// Malformed SSE chunk on a streaming response
    #[error("Stream parse error: {0}")]
    StreamParse(String),

    /// Embedding response did not cover every input text
    #[error("Embedding batch mismatch: expected {expected} vectors, got {got}")]
    EmbeddingBatchMismatch { expected: usize, got: usize },
}

impl OpenAIError {
    /// Build an [`OpenAIError::Api`] from a status code and body text.
    pub fn api(status: reqwest::StatusCode, message: impl Into<String>) -> Self {
        OpenAIError::Api {
            status: status.as_u16(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OpenAIError::api(reqwest::StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert_eq!(err.to_string(), "API error: 429: slow down");

        let err = OpenAIError::EmbeddingBatchMismatch {
            expected: 3,
            got: 2,
        };
        assert_eq!(
            err.to_string(),
            "Embedding batch mismatch: expected 3 vectors, got 2"
        );
    }
}
