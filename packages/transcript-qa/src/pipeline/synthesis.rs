//! Answer synthesis from retrieved evidence.
//!
//! Time-range questions are always rendered extractively so the stamps
//! in the answer come straight from the transcript. Everything else is
//! drafted by the language model when one is configured, with the
//! extractive summary as the fallback.

use tracing::{debug, warn};

use crate::pipeline::extractive;
use crate::pipeline::prompts::{format_synthesize_prompt, SYNTHESIZE_SYSTEM_PROMPT};
use crate::traits::{chat_text, ChatMessage, LanguageModel};
use crate::types::{QaConfig, QueryIntent, QueryUnderstanding, RetrievalResult};

/// Produce an answer draft for the retrieved evidence.
///
/// Returns the insufficient-evidence message when there is nothing to
/// cite. Never fails: model errors fall back to extractive rendering.
pub async fn synthesize(
    understanding: &QueryUnderstanding,
    retrieval: &RetrievalResult,
    model: Option<&dyn LanguageModel>,
    config: &QaConfig,
) -> String {
    if retrieval.evidence.is_empty() {
        return extractive::insufficient_evidence_message(
            understanding.prefer_chinese,
            understanding.time_range.is_some(),
        );
    }

    // Time-range questions are deterministic by construction; the model
    // adds nothing here. This holds even when the window itself failed
    // to resolve: the evidence still gets rendered, never paraphrased.
    if understanding.intent == QueryIntent::TimeRange || understanding.time_range.is_some() {
        return match &understanding.time_range {
            Some(range) => extractive::render_time_range(
                &retrieval.evidence,
                range,
                understanding.prefer_chinese,
                config,
            ),
            None => extractive::render_summary(
                &retrieval.evidence,
                understanding.prefer_chinese,
                true,
                config,
            ),
        };
    }

    if let Some(model) = model {
        match draft_with_model(understanding, retrieval, model, config).await {
            Some(draft) => return draft,
            None => warn!("model synthesis failed; rendering extractive summary"),
        }
    }

    extractive::render_summary(
        &retrieval.evidence,
        understanding.prefer_chinese,
        false,
        config,
    )
}

async fn draft_with_model(
    understanding: &QueryUnderstanding,
    retrieval: &RetrievalResult,
    model: &dyn LanguageModel,
    config: &QaConfig,
) -> Option<String> {
    let evidence_lines = numbered_evidence(retrieval);
    let messages = [
        ChatMessage::system(SYNTHESIZE_SYSTEM_PROMPT),
        ChatMessage::user(format_synthesize_prompt(
            &understanding.raw_query,
            &evidence_lines,
            understanding.prefer_chinese,
        )),
    ];

    match chat_text(model, &messages, config.model_timeout).await {
        Ok(draft) => {
            let draft = draft.trim().to_string();
            if draft.is_empty() {
                return None;
            }
            debug!(draft_len = draft.len(), "model draft produced");
            Some(draft)
        }
        Err(e) => {
            warn!(error = %e, "synthesis model call failed");
            None
        }
    }
}

/// Evidence lines the model cites from, one `[E#]` line per segment.
pub fn numbered_evidence(retrieval: &RetrievalResult) -> Vec<String> {
    let indices = extractive::citation_indices(&retrieval.evidence);
    retrieval
        .evidence
        .iter()
        .map(|item| {
            let idx = indices.get(&item.segment_id).copied().unwrap_or(1);
            format!("[E{}] {} {}", idx, item.stamp, item.text)
        })
        .collect()
}
