//! The question answering pipeline, stage by stage.

pub mod engine;
pub mod extractive;
pub mod parser;
pub mod prompts;
pub mod retrieval;
pub mod synthesis;
pub mod understanding;
pub mod verify;

pub use engine::{answer_video_query_from_transcript, TranscriptQa};
