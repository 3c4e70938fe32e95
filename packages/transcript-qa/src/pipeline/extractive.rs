//! Deterministic extractive rendering.
//!
//! One shared routine backs every path that answers without a model:
//! explicit time-range answers, summaries when no model is configured,
//! and the fallback after a rejected model draft. Citation indices are
//! assigned by first occurrence in the evidence list so `[E#]` markers
//! stay stable across renderings.

use std::collections::HashMap;

use crate::pipeline::retrieval::evenly_spaced_indices;
use crate::types::{EvidenceItem, QaConfig, TimeRange};

/// 1-based citation index per segment, by first occurrence.
pub fn citation_indices(evidence: &[EvidenceItem]) -> HashMap<String, usize> {
    let mut indices = HashMap::new();
    let mut next = 1;
    for item in evidence {
        indices.entry(item.segment_id.clone()).or_insert_with(|| {
            let idx = next;
            next += 1;
            idx
        });
    }
    indices
}

/// Render every evidence line for an explicit time window.
pub fn render_time_range(
    evidence: &[EvidenceItem],
    range: &TimeRange,
    prefer_chinese: bool,
    config: &QaConfig,
) -> String {
    let start = format_mmss(range.start_seconds);
    let end = format_mmss(range.end_seconds);
    let header = if prefer_chinese {
        format!("{}-{} 的内容：", start, end)
    } else {
        format!("Content from {}-{}:", start, end)
    };

    let indices = citation_indices(evidence);
    let mut out = header;
    for item in evidence {
        let snippet = truncate_snippet(&item.text, config.snippet_chars);
        let idx = indices.get(&item.segment_id).copied().unwrap_or(1);
        out.push_str(&format!("\n- {} {} [E{}]", item.stamp, snippet, idx));
    }
    out
}

/// Render a sampled bullet summary.
///
/// `window_known` switches the header to the section-scoped variant.
pub fn render_summary(
    evidence: &[EvidenceItem],
    prefer_chinese: bool,
    window_known: bool,
    config: &QaConfig,
) -> String {
    let header = match (prefer_chinese, window_known) {
        (true, true) => "本段要点：",
        (true, false) => "视频要点：",
        (false, true) => "Key points in this section:",
        (false, false) => "Video highlights:",
    };

    let indices = citation_indices(evidence);
    let sampled = evenly_spaced_indices(evidence.len(), config.extractive_sample_max);

    let mut out = header.to_string();
    for i in sampled {
        let item = &evidence[i];
        let snippet = truncate_snippet(&item.text, config.summary_snippet_chars);
        let idx = indices.get(&item.segment_id).copied().unwrap_or(1);
        out.push_str(&format!("\n- {} {} [E{}]", item.stamp, snippet, idx));
    }
    out
}

/// Localized refusal when retrieval produced nothing usable.
pub fn insufficient_evidence_message(prefer_chinese: bool, time_range_requested: bool) -> String {
    match (prefer_chinese, time_range_requested) {
        (true, true) => "指定时间段内没有找到相关内容。".to_string(),
        (true, false) => "字幕中没有足够的内容回答这个问题。".to_string(),
        (false, true) => "No transcript content was found in the requested time range.".to_string(),
        (false, false) => {
            "The transcript does not contain enough content to answer this question.".to_string()
        }
    }
}

/// Total minutes and seconds, e.g. 545.0 -> "09:05".
pub fn format_mmss(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Cut at a word boundary and append an ellipsis when truncated.
fn truncate_snippet(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    let cut = match truncated.rfind(char::is_whitespace) {
        // Keep a reasonable amount when the last word is very long.
        Some(pos) if pos > max_chars / 2 => &truncated[..pos],
        _ => truncated.as_str(),
    };
    format!("{}…", cut.trim_end())
}
