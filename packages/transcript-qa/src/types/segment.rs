//! Transcript segments and documents - the parser's output.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Dominant script of a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    /// CJK code points dominate (> 60% of letters).
    Cjk,
    /// Latin letters dominate (> 60% of letters).
    Latin,
    /// Both scripts present, neither dominant.
    Mixed,
    /// No letters at all.
    Unknown,
}

/// One time-stamped line of transcript text.
///
/// Produced once by the parser and never mutated afterwards.
/// Invariants: `end_seconds > start_seconds`, `text` is non-empty, and
/// segment ids are sequential within a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Stable sequence label, e.g. `seg-3`.
    pub id: String,

    /// Display stamp, `[HH:MM:SS.000 --> HH:MM:SS.000]`.
    pub stamp: String,

    /// Start offset in seconds.
    pub start_seconds: f64,

    /// End offset in seconds, strictly greater than `start_seconds`.
    pub end_seconds: f64,

    /// Cleaned original text.
    pub text: String,

    /// Lowercased text, used for display-independent matching.
    pub normalized_text: String,

    /// Deduplicated Latin keyword tokens, in first-occurrence order.
    pub latin_tokens: IndexSet<String>,

    /// Deduplicated CJK bigram tokens, in first-occurrence order.
    pub cjk_tokens: IndexSet<String>,
}

impl TranscriptSegment {
    /// Iterate over all tokens of this segment (Latin then CJK).
    pub fn tokens(&self) -> impl Iterator<Item = &String> {
        self.latin_tokens.iter().chain(self.cjk_tokens.iter())
    }

    /// Check whether `[start_seconds, end_seconds)` overlaps the window.
    pub fn overlaps(&self, window_start: f64, window_end: f64) -> bool {
        self.start_seconds < window_end && self.end_seconds > window_start
    }

    /// Check whether the segment lies entirely inside the window.
    pub fn within(&self, window_start: f64, window_end: f64) -> bool {
        self.start_seconds >= window_start && self.end_seconds <= window_end
    }
}

/// An ordered sequence of segments with a detected script.
///
/// Built fresh from the transcript string on every request; not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptDocument {
    /// Segments in non-decreasing start-time order.
    pub segments: Vec<TranscriptSegment>,

    /// Dominant script over all segment texts.
    pub script: Script,

    /// Concatenation of all segment texts.
    pub full_text: String,
}

impl TranscriptDocument {
    /// An empty document (used for empty or fully malformed input).
    pub fn empty() -> Self {
        Self {
            segments: Vec::new(),
            script: Script::Unknown,
            full_text: String::new(),
        }
    }

    /// Check whether the document has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Total duration: the last segment's end offset, 0 if none.
    pub fn duration_seconds(&self) -> f64 {
        self.segments.last().map(|s| s.end_seconds).unwrap_or(0.0)
    }
}
