//! Capability trait abstractions.
//!
//! The pipeline's only two external calls are behind these traits,
//! and both are optional everywhere upstream.

pub mod model;

pub use model::{
    chat_text, ChatMessage, ChatStream, EmbeddingProvider, LanguageModel, Role, StreamEvent,
};
