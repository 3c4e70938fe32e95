//! The externally visible result of one request.

use serde::{Deserialize, Serialize};

use super::evidence::{Confidence, EvidenceItem};

/// Whether the pipeline answered or declined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    /// A grounded answer was produced.
    Answered,
    /// Not enough transcript evidence to answer.
    InsufficientEvidence,
}

/// The response returned to the caller. Created once per request and
/// never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptQaResponse {
    /// Answer text (or a localized decline message).
    pub content: String,

    /// Answer status.
    pub status: ResponseStatus,

    /// The evidence the answer is grounded in.
    pub evidence: Vec<EvidenceItem>,

    /// Retrieval confidence carried through from the retriever.
    pub confidence: Confidence,
}

impl TranscriptQaResponse {
    /// Check whether the pipeline produced an answer.
    pub fn is_answered(&self) -> bool {
        self.status == ResponseStatus::Answered
    }
}
