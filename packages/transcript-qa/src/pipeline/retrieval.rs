//! Evidence retrieval over a parsed transcript.
//!
//! Three modes: an explicit time window selects overlapping segments,
//! summary questions sample the timeline evenly, and everything else
//! runs a hybrid lexical + embedding ranking. Retrieval never fails:
//! embedding errors degrade to lexical-only scoring.

use tracing::{debug, warn};

use crate::traits::EmbeddingProvider;
use crate::types::{
    reasons, Confidence, EvidenceItem, QaConfig, QueryIntent, QueryUnderstanding, RetrievalMode,
    RetrievalResult, TimeRange, TranscriptDocument, TranscriptSegment,
};

/// Select and rank evidence segments for a query.
pub async fn retrieve(
    document: &TranscriptDocument,
    understanding: &QueryUnderstanding,
    embeddings: Option<&dyn EmbeddingProvider>,
    config: &QaConfig,
) -> RetrievalResult {
    if document.is_empty() {
        return RetrievalResult::empty(RetrievalMode::Hybrid);
    }

    if let Some(range) = &understanding.time_range {
        return retrieve_time_range(document, range);
    }

    if understanding.intent == QueryIntent::Summary {
        return retrieve_timeline(document, config);
    }

    retrieve_hybrid(document, understanding, embeddings, config).await
}

/// All segments overlapping the requested window, in transcript order.
/// Never capped: the rendered answer claims to cover the whole window,
/// so every overlapping segment must be present.
fn retrieve_time_range(document: &TranscriptDocument, range: &TimeRange) -> RetrievalResult {
    let mut evidence = Vec::new();
    let mut any_within = false;

    for segment in &document.segments {
        if !segment.overlaps(range.start_seconds, range.end_seconds) {
            continue;
        }
        if segment.within(range.start_seconds, range.end_seconds) {
            any_within = true;
        }
        evidence.push(evidence_from(segment, 1.0, reasons::TIME_OVERLAP));
    }

    let confidence = if evidence.is_empty() || !any_within {
        Confidence::Low
    } else {
        Confidence::High
    };

    debug!(
        start = range.start_seconds,
        end = range.end_seconds,
        hits = evidence.len(),
        "time-range retrieval"
    );

    RetrievalResult {
        evidence,
        confidence,
        mode: RetrievalMode::TimeRange,
    }
}

/// Evenly spaced segments across the whole transcript.
fn retrieve_timeline(document: &TranscriptDocument, config: &QaConfig) -> RetrievalResult {
    let indices = evenly_spaced_indices(document.segments.len(), config.timeline_samples);
    let evidence = indices
        .into_iter()
        .map(|i| evidence_from(&document.segments[i], 1.0, reasons::TIMELINE_SAMPLE))
        .collect();

    RetrievalResult {
        evidence,
        confidence: Confidence::Medium,
        mode: RetrievalMode::Timeline,
    }
}

/// Lexical keyword overlap blended with embedding cosine similarity.
async fn retrieve_hybrid(
    document: &TranscriptDocument,
    understanding: &QueryUnderstanding,
    embeddings: Option<&dyn EmbeddingProvider>,
    config: &QaConfig,
) -> RetrievalResult {
    let semantic = match embeddings {
        Some(provider) => embed_scores(document, understanding, provider).await,
        None => None,
    };

    let mut scored: Vec<(usize, f64, Vec<&'static str>)> = Vec::new();
    for (idx, segment) in document.segments.iter().enumerate() {
        let mut reasons_hit = Vec::new();
        let lexical = lexical_score(segment, understanding);
        if lexical > 0.0 {
            reasons_hit.push(reasons::LEXICAL_OVERLAP);
        }

        let mut score = match &semantic {
            Some(_) => config.lexical_weight * lexical,
            None => lexical,
        };

        if let Some(similarities) = &semantic {
            let similarity = similarities[idx] as f64;
            if similarity >= config.semantic_floor {
                score += config.semantic_weight * similarity;
                reasons_hit.push(reasons::EMBEDDING_SIMILARITY);
            }
        }

        if score > 0.0 {
            scored.push((idx, score, reasons_hit));
        }
    }

    // Highest score first; transcript order breaks ties.
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    scored.truncate(config.max_evidence);

    let confidence = hybrid_confidence(&scored, config);
    let evidence = scored
        .into_iter()
        .map(|(idx, score, reasons_hit)| {
            let segment = &document.segments[idx];
            let mut item = evidence_from(segment, score, "");
            item.reasons = reasons_hit.into_iter().map(str::to_string).collect();
            item
        })
        .collect();

    RetrievalResult {
        evidence,
        confidence,
        mode: RetrievalMode::Hybrid,
    }
}

fn hybrid_confidence(scored: &[(usize, f64, Vec<&'static str>)], config: &QaConfig) -> Confidence {
    let Some(top) = scored.first() else {
        return Confidence::Low;
    };
    if top.1 < config.weak_score_floor {
        return Confidence::Low;
    }
    let runner_up = scored.get(1).map(|s| s.1).unwrap_or(0.0);
    if top.1 - runner_up >= config.high_confidence_margin {
        Confidence::High
    } else {
        Confidence::Medium
    }
}

/// Fraction of query keywords present in the segment.
fn lexical_score(segment: &TranscriptSegment, understanding: &QueryUnderstanding) -> f64 {
    if understanding.keywords.is_empty() {
        return 0.0;
    }
    let hits = understanding
        .keywords
        .iter()
        .filter(|k| segment.latin_tokens.contains(*k) || segment.cjk_tokens.contains(*k))
        .count();
    hits as f64 / understanding.keywords.len() as f64
}

/// One batched embedding call for the query plus every segment.
/// Returns per-segment cosine similarities, or None on any failure.
async fn embed_scores(
    document: &TranscriptDocument,
    understanding: &QueryUnderstanding,
    provider: &dyn EmbeddingProvider,
) -> Option<Vec<f32>> {
    let mut texts: Vec<&str> = Vec::with_capacity(document.segments.len() + 1);
    texts.push(&understanding.raw_query);
    texts.extend(document.segments.iter().map(|s| s.normalized_text.as_str()));

    let vectors = match provider.embed_texts(&texts).await {
        Ok(vectors) => vectors,
        Err(e) => {
            warn!(error = %e, "embedding provider failed; falling back to lexical scoring");
            return None;
        }
    };
    if vectors.len() != texts.len() {
        warn!(
            expected = texts.len(),
            got = vectors.len(),
            "embedding batch size mismatch; falling back to lexical scoring"
        );
        return None;
    }

    let (query_vec, segment_vecs) = vectors.split_first()?;
    Some(
        segment_vecs
            .iter()
            .map(|v| cosine_similarity(query_vec, v))
            .collect(),
    )
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

fn evidence_from(segment: &TranscriptSegment, score: f64, reason: &str) -> EvidenceItem {
    EvidenceItem {
        segment_id: segment.id.clone(),
        stamp: segment.stamp.clone(),
        start_seconds: segment.start_seconds,
        text: segment.text.clone(),
        score,
        reasons: if reason.is_empty() {
            Vec::new()
        } else {
            vec![reason.to_string()]
        },
    }
}

/// First, last, and evenly spaced interior indices, capped at `max`.
pub fn evenly_spaced_indices(len: usize, max: usize) -> Vec<usize> {
    if len == 0 || max == 0 {
        return Vec::new();
    }
    if len <= max {
        return (0..len).collect();
    }
    let mut indices = Vec::with_capacity(max);
    for i in 0..max {
        // Maps 0..max onto 0..len-1 inclusive at both ends.
        let idx = (i as f64 * (len - 1) as f64 / (max - 1) as f64).round() as usize;
        if indices.last() != Some(&idx) {
            indices.push(idx);
        }
    }
    indices
}
