//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the pipeline
//! without making real model or network calls.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use futures::{stream, StreamExt};
use sha2::{Digest, Sha256};

use crate::error::{QaError, Result};
use crate::traits::{ChatMessage, ChatStream, EmbeddingProvider, LanguageModel, StreamEvent};

/// A scripted language model for testing.
///
/// Replies are queued in order and consumed one per `stream_chat` call;
/// the last reply is repeated once the queue runs out. Every call is
/// recorded for assertions.
#[derive(Default)]
pub struct MockLanguageModel {
    replies: Arc<RwLock<VecDeque<String>>>,
    last_reply: Arc<RwLock<Option<String>>>,
    fail: bool,
    delay: Option<std::time::Duration>,
    calls: Arc<RwLock<Vec<Vec<ChatMessage>>>>,
}

impl MockLanguageModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply; calls consume queued replies in order.
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        let reply = reply.into();
        self.replies.write().unwrap().push_back(reply.clone());
        *self.last_reply.write().unwrap() = Some(reply);
        self
    }

    /// Make every call return an error.
    pub fn with_failure(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Delay the stream's first event, for exercising caller deadlines.
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `stream_chat` calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Messages from the nth call, if it happened.
    pub fn call_messages(&self, n: usize) -> Option<Vec<ChatMessage>> {
        self.calls.read().unwrap().get(n).cloned()
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<ChatStream> {
        self.calls.write().unwrap().push(messages.to_vec());

        if self.fail {
            return Err(QaError::Model("mock model failure".into()));
        }

        let reply = self
            .replies
            .write()
            .unwrap()
            .pop_front()
            .or_else(|| self.last_reply.read().unwrap().clone())
            .unwrap_or_default();

        // Split the reply into a few chunks to exercise stream handling.
        // Chunks are taken in characters so multibyte text stays intact.
        let chars: Vec<char> = reply.chars().collect();
        let chunk_len = (chars.len() / 3).max(16);
        let mut events: Vec<Result<StreamEvent>> = chars
            .chunks(chunk_len)
            .map(|c| Ok(StreamEvent::Content(c.iter().collect())))
            .collect();
        events.push(Ok(StreamEvent::Done));

        match self.delay {
            Some(delay) => {
                let delayed = stream::once(async move {
                    tokio::time::sleep(delay).await;
                    stream::iter(events)
                })
                .flatten();
                Ok(Box::pin(delayed))
            }
            None => Ok(Box::pin(stream::iter(events))),
        }
    }
}

/// A deterministic embedding provider for testing.
///
/// Vectors are derived from a hash of the input text, so equal texts
/// embed identically across runs. Specific texts can be overridden to
/// steer similarity scores.
#[derive(Default)]
pub struct MockEmbeddings {
    overrides: Arc<RwLock<HashMap<String, Vec<f32>>>>,
    dimension: usize,
    fail: bool,
    calls: Arc<RwLock<Vec<usize>>>,
}

impl MockEmbeddings {
    pub fn new() -> Self {
        Self {
            dimension: 16,
            ..Default::default()
        }
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Pin the vector returned for an exact text (matched lowercased).
    pub fn with_override(self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.overrides
            .write()
            .unwrap()
            .insert(text.into().to_lowercase(), vector);
        self
    }

    /// Make every call return an error.
    pub fn with_failure(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Batch sizes of the calls made so far.
    pub fn call_batch_sizes(&self) -> Vec<usize> {
        self.calls.read().unwrap().clone()
    }

    fn hash_vector(&self, text: &str) -> Vec<f32> {
        let digest = Sha256::digest(text.to_lowercase().as_bytes());
        (0..self.dimension)
            .map(|i| {
                let byte = digest[i % digest.len()];
                // Center around zero so cosine similarity varies.
                (byte as f32 - 127.5) / 127.5
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddings {
    async fn embed_texts(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.calls.write().unwrap().push(texts.len());

        if self.fail {
            return Err(QaError::Embedding("mock embedding failure".into()));
        }

        let overrides = self.overrides.read().unwrap();
        Ok(texts
            .iter()
            .map(|t| {
                overrides
                    .get(&t.to_lowercase())
                    .cloned()
                    .unwrap_or_else(|| self.hash_vector(t))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::chat_text;

    #[tokio::test]
    async fn test_mock_model_replays_queued_replies() {
        let model = MockLanguageModel::new().with_reply("first").with_reply("second");

        let messages = [ChatMessage::user("hi")];
        assert_eq!(chat_text(&model, &messages, None).await.unwrap(), "first");
        assert_eq!(chat_text(&model, &messages, None).await.unwrap(), "second");
        // Queue exhausted: the last reply repeats.
        assert_eq!(chat_text(&model, &messages, None).await.unwrap(), "second");
        assert_eq!(model.call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_model_failure() {
        let model = MockLanguageModel::new().with_failure();
        let result = chat_text(&model, &[ChatMessage::user("hi")], None).await;
        assert!(matches!(result, Err(QaError::Model(_))));
    }

    #[tokio::test]
    async fn test_mock_embeddings_are_deterministic() {
        let embeddings = MockEmbeddings::new();
        let a = embeddings.embed_texts(&["hello", "world"]).await.unwrap();
        let b = embeddings.embed_texts(&["hello", "world"]).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].len(), 16);
        assert_ne!(a[0], a[1]);
        assert_eq!(embeddings.call_batch_sizes(), vec![2, 2]);
    }

    #[tokio::test]
    async fn test_mock_embeddings_override() {
        let embeddings = MockEmbeddings::new().with_override("Pinned", vec![1.0, 2.0]);
        let out = embeddings.embed_texts(&["pinned"]).await.unwrap();
        assert_eq!(out[0], vec![1.0, 2.0]);
    }
}
