//! Evidence items and retrieval results.

use serde::{Deserialize, Serialize};

/// How confident the retriever is in its evidence selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// How evidence was selected, used downstream to decide fallback behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMode {
    /// Segments overlapping a requested time window, chronological.
    TimeRange,
    /// Lexical plus optional embedding scoring, ranked.
    Hybrid,
    /// Evenly-sampled document-wide coverage for summary-style queries.
    Timeline,
}

/// A scored reference to one transcript segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Id of the segment this evidence points at.
    pub segment_id: String,

    /// Display stamp of the segment.
    pub stamp: String,

    /// Start offset of the segment, for chronological rendering.
    pub start_seconds: f64,

    /// The segment's cleaned text.
    pub text: String,

    /// Relevance score (mode-dependent scale).
    pub score: f64,

    /// Which signals produced the match, for debuggability.
    pub reasons: Vec<String>,
}

/// Retrieval signal names recorded in [`EvidenceItem::reasons`].
pub mod reasons {
    pub const TIME_OVERLAP: &str = "time-overlap";
    pub const LEXICAL_OVERLAP: &str = "lexical-overlap";
    pub const EMBEDDING_SIMILARITY: &str = "embedding-similarity";
    pub const TIMELINE_SAMPLE: &str = "timeline-sample";
}

/// The retriever's output: evidence plus how it was selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Selected evidence, ranked or chronological depending on `mode`.
    pub evidence: Vec<EvidenceItem>,

    /// Retrieval confidence.
    pub confidence: Confidence,

    /// Selection mode.
    pub mode: RetrievalMode,
}

impl RetrievalResult {
    /// An empty result (empty document or no matches).
    pub fn empty(mode: RetrievalMode) -> Self {
        Self {
            evidence: Vec::new(),
            confidence: Confidence::Low,
            mode,
        }
    }
}
