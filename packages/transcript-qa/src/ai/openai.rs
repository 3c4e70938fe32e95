//! OpenAI-backed implementations of the model capability traits.

use async_trait::async_trait;
use futures::StreamExt;
use openai_client::{ChatRequest, Message, OpenAIClient, StreamChunk};

use crate::error::{QaError, Result};
use crate::traits::{ChatMessage, ChatStream, EmbeddingProvider, LanguageModel, Role, StreamEvent};

const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// OpenAI provider for both chat and embeddings.
pub struct OpenAiQa {
    client: OpenAIClient,
    chat_model: String,
    embedding_model: String,
}

impl OpenAiQa {
    pub fn new(client: OpenAIClient) -> Self {
        OpenAiQa {
            client,
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }

    /// Build from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let client = OpenAIClient::from_env().map_err(|e| QaError::Model(Box::new(e)))?;
        Ok(OpenAiQa::new(client))
    }

    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }
}

fn to_client_message(message: &ChatMessage) -> Message {
    match message.role {
        Role::System => Message::system(&message.content),
        Role::User => Message::user(&message.content),
        Role::Assistant => Message::assistant(&message.content),
    }
}

#[async_trait]
impl LanguageModel for OpenAiQa {
    async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<ChatStream> {
        let request = ChatRequest::new(&self.chat_model)
            .messages(messages.iter().map(to_client_message).collect());

        let stream = self
            .client
            .chat_completion_stream(request)
            .await
            .map_err(|e| QaError::Model(Box::new(e)))?;

        let mapped = stream.map(|chunk| match chunk {
            Ok(StreamChunk::Delta(text)) => Ok(StreamEvent::Content(text)),
            Ok(StreamChunk::ToolCall) => Ok(StreamEvent::ToolCall),
            Ok(StreamChunk::Done) => Ok(StreamEvent::Done),
            Err(e) => Err(QaError::Model(Box::new(e))),
        });

        Ok(Box::pin(mapped))
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiQa {
    async fn embed_texts(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.client
            .create_embeddings(texts, &self.embedding_model)
            .await
            .map_err(|e| QaError::Embedding(Box::new(e)))
    }
}
