//! The interpreted request - what the user is actually asking for.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::segment::Script;

/// Closed vocabulary of query intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
    /// Overview of the whole video or a section.
    #[default]
    Summary,
    /// "What happened between X and Y" - always answered extractively.
    TimeRange,
    /// A specific fact lookup.
    Factoid,
    /// Comparison between things mentioned in the transcript.
    Compare,
    /// Yes/no question about transcript content.
    YesNo,
}

/// An absolute time window in seconds.
///
/// Relative ranges ("the first third") are resolved against the video
/// duration before this type is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl TimeRange {
    /// Construct a window, returning `None` when it would be degenerate.
    pub fn new(start_seconds: f64, end_seconds: f64) -> Option<Self> {
        if end_seconds > start_seconds && start_seconds >= 0.0 {
            Some(Self {
                start_seconds,
                end_seconds,
            })
        } else {
            None
        }
    }
}

/// The interpreted request, produced once per request by query
/// understanding and consumed read-only by the rest of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryUnderstanding {
    /// Classified intent.
    pub intent: QueryIntent,

    /// Resolved absolute time window, if the query asked for one.
    pub time_range: Option<TimeRange>,

    /// Keywords for lexical scoring (query tokens merged with any
    /// model-suggested terms).
    pub keywords: IndexSet<String>,

    /// Script of the query text itself.
    pub script: Script,

    /// Reply-language flag: answer in Chinese when true.
    pub prefer_chinese: bool,

    /// The query exactly as received.
    pub raw_query: String,

    /// Trimmed, lowercased query.
    pub normalized_query: String,
}
