//! Language model and embedding capability traits.
//!
//! Implementations wrap specific providers (OpenAI, local models, etc.)
//! and handle the specifics of transport and response parsing. Both
//! capabilities are consumed, never owned: the pipeline tolerates either
//! one being absent and degrades to deterministic behavior.

use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::time::Duration;

use crate::error::{QaError, Result};

/// Chat message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One event from a streaming chat completion.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A text fragment of the reply.
    Content(String),
    /// The model emitted a tool-call marker; the pipeline ignores these.
    ToolCall,
    /// Terminal signal; no further content follows.
    Done,
}

/// An ordered stream of model output events.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Streaming chat capability.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send a conversation and get an ordered stream of output events.
    async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<ChatStream>;
}

/// Text embedding capability.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed several texts in one call; vectors are returned in input order.
    async fn embed_texts(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;
}

/// Consume a chat stream to completion, concatenating content fragments.
///
/// Tool-call markers are skipped; `Done` terminates the stream early.
pub async fn collect_content(mut stream: ChatStream) -> Result<String> {
    let mut out = String::new();
    while let Some(event) = stream.next().await {
        match event? {
            StreamEvent::Content(fragment) => out.push_str(&fragment),
            StreamEvent::ToolCall => continue,
            StreamEvent::Done => break,
        }
    }
    Ok(out)
}

/// Run a chat call and collect its full text reply.
///
/// When `deadline` is set, the whole call (request plus stream
/// consumption) must finish within it; an elapsed deadline is reported
/// as [`QaError::ModelTimeout`] so callers can treat it as "model
/// unavailable". The in-flight call is dropped, never retried.
pub async fn chat_text(
    model: &dyn LanguageModel,
    messages: &[ChatMessage],
    deadline: Option<Duration>,
) -> Result<String> {
    let call = async {
        let stream = model.stream_chat(messages).await?;
        collect_content(stream).await
    };

    match deadline {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| QaError::ModelTimeout)?,
        None => call.await,
    }
}
