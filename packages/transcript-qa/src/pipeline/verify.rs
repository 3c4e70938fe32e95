//! Grounding verification of drafted answers.
//!
//! A draft passes only if it cites evidence and stays close to the
//! evidence vocabulary. The novelty check is token-based: answer terms
//! absent from the evidence count against the draft, with a looser
//! threshold for summaries since they paraphrase more.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::pipeline::parser::tokenize_query;
use crate::types::{EvidenceItem, QueryIntent};

/// Novelty ratio ceiling for summary drafts.
const SUMMARY_NOVELTY_THRESHOLD: f32 = 0.65;
/// Novelty ratio ceiling for everything else.
const DEFAULT_NOVELTY_THRESHOLD: f32 = 0.55;

static CITATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[E\d+\]").expect("citation regex"));

/// Why a draft was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyFailure {
    EmptyAnswer,
    NoEvidence,
    MissingCitations,
    UnsupportedNovelTerms,
}

impl VerifyFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyFailure::EmptyAnswer => "empty-answer",
            VerifyFailure::NoEvidence => "no-evidence",
            VerifyFailure::MissingCitations => "missing-citations",
            VerifyFailure::UnsupportedNovelTerms => "unsupported-novel-terms",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub ok: bool,
    pub reason: Option<VerifyFailure>,
}

impl Verdict {
    fn pass() -> Self {
        Verdict { ok: true, reason: None }
    }

    fn fail(reason: VerifyFailure) -> Self {
        Verdict { ok: false, reason: Some(reason) }
    }
}

/// Check a drafted answer against the evidence it claims to cite.
pub fn verify(answer: &str, evidence: &[EvidenceItem], intent: QueryIntent) -> Verdict {
    if answer.trim().is_empty() {
        return Verdict::fail(VerifyFailure::EmptyAnswer);
    }
    if evidence.is_empty() {
        return Verdict::fail(VerifyFailure::NoEvidence);
    }
    if !CITATION_RE.is_match(answer) {
        return Verdict::fail(VerifyFailure::MissingCitations);
    }

    let ratio = novelty_ratio(answer, evidence);
    let threshold = if intent == QueryIntent::Summary {
        SUMMARY_NOVELTY_THRESHOLD
    } else {
        DEFAULT_NOVELTY_THRESHOLD
    };
    debug!(ratio, threshold, "novelty check");

    if ratio > threshold {
        Verdict::fail(VerifyFailure::UnsupportedNovelTerms)
    } else {
        Verdict::pass()
    }
}

/// Fraction of answer tokens not found in the evidence.
///
/// An answer with no content tokens at all is maximally novel.
fn novelty_ratio(answer: &str, evidence: &[EvidenceItem]) -> f32 {
    let answer_tokens = tokenize_query(&CITATION_RE.replace_all(answer, " "));
    if answer_tokens.is_empty() {
        return 1.0;
    }

    let evidence_text = evidence
        .iter()
        .map(|e| e.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let evidence_tokens = tokenize_query(&evidence_text);

    let novel = answer_tokens
        .iter()
        .filter(|t| !evidence_tokens.contains(*t))
        .count();
    novel as f32 / answer_tokens.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evidence(texts: &[&str]) -> Vec<EvidenceItem> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| EvidenceItem {
                segment_id: format!("seg-{}", i + 1),
                stamp: "[s]".to_string(),
                start_seconds: 0.0,
                text: t.to_string(),
                score: 1.0,
                reasons: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn test_grounded_answer_passes() {
        let ev = evidence(&["we feed the sourdough starter with flour and water every morning"]);
        let verdict = verify(
            "The starter is fed with flour and water [E1].",
            &ev,
            QueryIntent::Factoid,
        );
        assert!(verdict.ok);
        assert_eq!(verdict.reason, None);
    }

    #[test]
    fn test_empty_answer_fails() {
        let ev = evidence(&["something"]);
        let verdict = verify("  ", &ev, QueryIntent::Factoid);
        assert_eq!(verdict.reason, Some(VerifyFailure::EmptyAnswer));
    }

    #[test]
    fn test_no_evidence_fails() {
        let verdict = verify("An answer [E1].", &[], QueryIntent::Factoid);
        assert_eq!(verdict.reason, Some(VerifyFailure::NoEvidence));
    }

    #[test]
    fn test_missing_citations_fails() {
        let ev = evidence(&["we feed the starter"]);
        let verdict = verify("The starter is fed daily.", &ev, QueryIntent::Factoid);
        assert_eq!(verdict.reason, Some(VerifyFailure::MissingCitations));
    }

    #[test]
    fn test_ungrounded_terms_fail() {
        let ev = evidence(&["we feed the starter"]);
        let verdict = verify(
            "Quantum entanglement accelerates fermentation kinetics dramatically [E1].",
            &ev,
            QueryIntent::Factoid,
        );
        assert_eq!(verdict.reason, Some(VerifyFailure::UnsupportedNovelTerms));
    }

    #[test]
    fn test_summary_threshold_is_looser() {
        let ev = evidence(&["mixing dough resting shaping baking bread oven steam"]);
        // Roughly 60% novel terms: fails the default threshold but not the
        // summary one.
        let answer = "Covers mixing dough and baking bread alongside proofing hydration \
                      lamination scoring techniques generally [E1].";
        assert!(!verify(answer, &ev, QueryIntent::Factoid).ok);
        assert!(verify(answer, &ev, QueryIntent::Summary).ok);
    }

    #[test]
    fn test_citation_markers_excluded_from_tokens() {
        let ev = evidence(&["the oven runs hot with steam inside"]);
        let verdict = verify("The oven runs hot [E1] with steam [E2].", &ev, QueryIntent::Factoid);
        assert!(verdict.ok);
    }
}
