//! Typed errors for the transcript QA library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. None of these errors
//! escape the engine: every failure resolves to a deterministic,
//! grounded response (see `pipeline::engine`).

use thiserror::Error;

/// Errors that can occur while talking to the optional capabilities.
#[derive(Debug, Error)]
pub enum QaError {
    /// Language model unavailable or failed
    #[error("language model error: {0}")]
    Model(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Embedding generation failed
    #[error("embedding error: {0}")]
    Embedding(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Caller-imposed deadline on a model call elapsed
    #[error("model call timed out")]
    ModelTimeout,
}

/// Result type alias for capability operations.
pub type Result<T> = std::result::Result<T, QaError>;
