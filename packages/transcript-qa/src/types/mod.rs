//! Data model for the transcript QA pipeline.

pub mod config;
pub mod evidence;
pub mod response;
pub mod segment;
pub mod understanding;

pub use config::QaConfig;
pub use evidence::{reasons, Confidence, EvidenceItem, RetrievalMode, RetrievalResult};
pub use response::{ResponseStatus, TranscriptQaResponse};
pub use segment::{Script, TranscriptDocument, TranscriptSegment};
pub use understanding::{QueryIntent, QueryUnderstanding, TimeRange};
