//! Configuration for the QA pipeline.

use std::time::Duration;

/// Tunables for retrieval, synthesis and fallback rendering.
#[derive(Debug, Clone)]
pub struct QaConfig {
    /// Maximum evidence items kept by hybrid retrieval. Default: 8.
    pub max_evidence: usize,

    /// Weight of the lexical overlap score in hybrid mode. Default: 0.45.
    pub lexical_weight: f64,

    /// Weight of the embedding similarity score in hybrid mode.
    /// Default: 0.55.
    pub semantic_weight: f64,

    /// Embedding similarities below this floor are treated as noise and
    /// contribute nothing to the combined score. Default: 0.25.
    pub semantic_floor: f64,

    /// Margin the top hybrid score must clear over the runner-up for
    /// High confidence. Default: 0.15.
    pub high_confidence_margin: f64,

    /// Combined scores below this are uniformly weak (Low confidence).
    /// Default: 0.1.
    pub weak_score_floor: f64,

    /// Number of segments sampled in timeline mode. Default: 8.
    pub timeline_samples: usize,

    /// Maximum items in the extractive summary fallback. Default: 6.
    pub extractive_sample_max: usize,

    /// Character budget per evidence line in time-range rendering.
    /// Default: 200.
    pub snippet_chars: usize,

    /// Character budget per line in the extractive summary. Default: 120.
    pub summary_snippet_chars: usize,

    /// Caller-imposed deadline per model call. A timeout is treated as
    /// "model unavailable" and routes to the deterministic fallback.
    /// Default: none.
    pub model_timeout: Option<Duration>,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            max_evidence: 8,
            lexical_weight: 0.45,
            semantic_weight: 0.55,
            semantic_floor: 0.25,
            high_confidence_margin: 0.15,
            weak_score_floor: 0.1,
            timeline_samples: 8,
            extractive_sample_max: 6,
            snippet_chars: 200,
            summary_snippet_chars: 120,
            model_timeout: None,
        }
    }
}

impl QaConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum evidence items kept by hybrid retrieval.
    pub fn with_max_evidence(mut self, max: usize) -> Self {
        self.max_evidence = max;
        self
    }

    /// Set the lexical/semantic score weights.
    pub fn with_weights(mut self, lexical: f64, semantic: f64) -> Self {
        self.lexical_weight = lexical;
        self.semantic_weight = semantic;
        self
    }

    /// Set the per-call model deadline.
    pub fn with_model_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = Some(timeout);
        self
    }

    /// Set the timeline sample count.
    pub fn with_timeline_samples(mut self, samples: usize) -> Self {
        self.timeline_samples = samples;
        self
    }
}
