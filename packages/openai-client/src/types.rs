//! OpenAI API request and response types.

use serde::{Deserialize, Serialize};

// =============================================================================
// Chat Completion
// =============================================================================

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model to use (e.g., "gpt-4o", "gpt-4o-mini")
    pub model: String,

    /// Conversation messages
    pub messages: Vec<Message>,

    /// Sampling temperature (0.0 to 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens in completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for ChatRequest {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
        }
    }
}

impl ChatRequest {
    /// Create a new chat request with the given model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Add a message to the conversation.
    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Replace all messages.
    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Set temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set max tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role: "system", "user", "assistant"
    pub role: String,

    /// Message content
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Raw chat completion response from the API.
#[derive(Debug, Deserialize)]
pub struct ChatResponseRaw {
    pub choices: Vec<ChatChoiceRaw>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceRaw {
    pub message: ChatChoiceMessageRaw,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessageRaw {
    #[serde(default)]
    pub content: String,
}

/// Parsed chat completion response.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// The assistant's reply.
    pub content: String,
}

// =============================================================================
// Embeddings
// =============================================================================

/// Embedding request (batch).
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingRequest {
    /// Embedding model (e.g., "text-embedding-3-small")
    pub model: String,

    /// Texts to embed
    pub input: Vec<String>,
}

/// Raw embedding response from the API.
#[derive(Debug, Deserialize)]
pub struct EmbeddingResponseRaw {
    pub data: Vec<EmbeddingDataRaw>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingDataRaw {
    pub index: usize,
    pub embedding: Vec<f32>,
}
