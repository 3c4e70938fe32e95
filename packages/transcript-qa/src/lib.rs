//! Transcript Question Answering Library
//!
//! Answers natural-language questions about video transcripts with
//! timestamped, citation-grounded responses. Works with bilingual
//! (Chinese/English) content and degrades gracefully when no language
//! model or embedding provider is configured.
//!
//! # Design Philosophy
//!
//! **"Evidence first"**
//!
//! - Every answer cites transcript segments with `[E#]` markers
//! - Drafts that drift from the evidence are rejected and re-rendered
//!   extractively
//! - Model and embeddings are optional capabilities, never hard
//!   dependencies
//!
//! # Usage
//!
//! ```rust,ignore
//! use transcript_qa::TranscriptQa;
//!
//! let engine = TranscriptQa::new();
//! let response = engine
//!     .answer("what happens between 8:30 and 9:05", transcript_text)
//!     .await;
//! println!("{}", response.content);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Model capability abstractions (chat, embeddings)
//! - [`types`] - Transcript, query, and response data types
//! - [`pipeline`] - Parsing, retrieval, synthesis, and verification
//! - [`ai`] - Concrete providers (OpenAI behind the `openai` feature)
//! - [`testing`] - Mock model and embedding implementations

pub mod ai;
pub mod error;
pub mod pipeline;
pub mod testing;
pub mod traits;
pub mod types;

pub use error::{QaError, Result};
pub use pipeline::{answer_video_query_from_transcript, TranscriptQa};
pub use types::{
    Confidence, QaConfig, QueryIntent, QueryUnderstanding, ResponseStatus, RetrievalMode,
    RetrievalResult, Script, TimeRange, TranscriptDocument, TranscriptQaResponse,
};
