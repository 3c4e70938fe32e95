//! Query understanding: intent classification and time-range resolution.
//!
//! Delegates classification to the language model under a strict JSON
//! contract, then resolves relative ranges against the video duration.
//! Understanding is advisory, never fatal: any model absence, failure,
//! or malformed output degrades to a summary-intent default.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::pipeline::parser::{detect_script, parse_clock_lenient, tokenize_query};
use crate::pipeline::prompts::{format_understand_prompt, UNDERSTAND_SYSTEM_PROMPT};
use crate::traits::{chat_text, ChatMessage, LanguageModel};
use crate::types::{QueryIntent, QueryUnderstanding, Script, TimeRange};

/// Raw model output, parsed leniently.
#[derive(Debug, Deserialize)]
struct RawUnderstanding {
    #[serde(default)]
    intent: Option<String>,
    #[serde(default)]
    time_range: Option<RawTimeRange>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    reply_language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTimeRange {
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    start: Option<serde_json::Value>,
    #[serde(default)]
    end: Option<serde_json::Value>,
    #[serde(default)]
    anchor: Option<String>,
    #[serde(default)]
    numerator: Option<f64>,
    #[serde(default)]
    denominator: Option<f64>,
}

/// Interpret a user query against a transcript.
///
/// `duration_seconds` anchors relative ranges; `transcript_script`
/// settles the reply language when the query itself is ambiguous.
pub async fn understand(
    query: &str,
    transcript_script: Script,
    duration_seconds: f64,
    model: Option<&dyn LanguageModel>,
    model_timeout: Option<Duration>,
) -> QueryUnderstanding {
    let mut understanding = fallback(query, transcript_script);

    let Some(model) = model else {
        debug!("no language model; using fallback understanding");
        return understanding;
    };

    let messages = [
        ChatMessage::system(UNDERSTAND_SYSTEM_PROMPT),
        ChatMessage::user(format_understand_prompt(
            query,
            script_label(transcript_script),
            duration_seconds,
        )),
    ];

    let reply = match chat_text(model, &messages, model_timeout).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, "understanding model call failed; using fallback");
            return understanding;
        }
    };

    match parse_reply(&reply) {
        Some(raw) => {
            apply(&mut understanding, raw, duration_seconds, transcript_script);
            debug!(
                intent = ?understanding.intent,
                time_range = ?understanding.time_range,
                prefer_chinese = understanding.prefer_chinese,
                "query understood"
            );
        }
        None => {
            warn!(reply_len = reply.len(), "unparseable understanding reply; using fallback");
        }
    }

    understanding
}

/// The safe default: summary intent, no window, tokenizer keywords.
pub fn fallback(query: &str, transcript_script: Script) -> QueryUnderstanding {
    let script = detect_script(query);
    QueryUnderstanding {
        intent: QueryIntent::Summary,
        time_range: None,
        keywords: tokenize_query(query),
        script,
        prefer_chinese: prefer_chinese_from_scripts(script, transcript_script),
        raw_query: query.to_string(),
        normalized_query: query.trim().to_lowercase(),
    }
}

fn script_label(script: Script) -> &'static str {
    match script {
        Script::Cjk => "cjk",
        Script::Latin => "latin",
        Script::Mixed => "mixed",
        Script::Unknown => "unknown",
    }
}

fn prefer_chinese_from_scripts(query_script: Script, transcript_script: Script) -> bool {
    match query_script {
        Script::Cjk => true,
        Script::Latin => false,
        // Ambiguous query: follow the transcript.
        Script::Mixed | Script::Unknown => transcript_script == Script::Cjk,
    }
}

/// Extract the JSON object from a model reply, tolerating code fences
/// and surrounding prose.
fn parse_reply(reply: &str) -> Option<RawUnderstanding> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&reply[start..=end]).ok()
}

/// Fold the model's raw output into the fallback understanding.
fn apply(
    understanding: &mut QueryUnderstanding,
    raw: RawUnderstanding,
    duration_seconds: f64,
    transcript_script: Script,
) {
    if let Some(intent) = raw.intent.as_deref().and_then(parse_intent) {
        understanding.intent = intent;
    }

    understanding.time_range = raw
        .time_range
        .and_then(|r| resolve_time_range(r, duration_seconds));

    // Model keywords supplement, never replace, the tokenizer's.
    for keyword in &raw.keywords {
        understanding.keywords.extend(tokenize_query(keyword));
    }

    understanding.prefer_chinese = match raw.reply_language.as_deref() {
        Some(lang) if !lang.is_empty() => {
            let lang = lang.to_lowercase();
            lang.starts_with("zh") || lang.starts_with("chin")
        }
        _ => prefer_chinese_from_scripts(understanding.script, transcript_script),
    };
}

fn parse_intent(raw: &str) -> Option<QueryIntent> {
    match raw.trim().to_lowercase().as_str() {
        "summary" => Some(QueryIntent::Summary),
        "time_range" => Some(QueryIntent::TimeRange),
        "factoid" => Some(QueryIntent::Factoid),
        "compare" => Some(QueryIntent::Compare),
        "yes_no" => Some(QueryIntent::YesNo),
        _ => None,
    }
}

/// Convert the model's time-range shape into absolute seconds.
fn resolve_time_range(raw: RawTimeRange, duration_seconds: f64) -> Option<TimeRange> {
    match raw.kind.as_deref()? {
        "absolute" => {
            let start = raw.start.as_ref().and_then(coerce_seconds)?;
            let end = raw.end.as_ref().and_then(coerce_seconds)?;
            let (start, end) = if duration_seconds > 0.0 {
                (start.min(duration_seconds), end.min(duration_seconds))
            } else {
                (start, end)
            };
            TimeRange::new(start, end)
        }
        "relative" => {
            if duration_seconds <= 0.0 {
                return None;
            }
            let numerator = raw.numerator?;
            let denominator = raw.denominator?;
            if numerator <= 0.0 || denominator <= 0.0 || numerator > denominator {
                return None;
            }
            let span = duration_seconds * numerator / denominator;
            match raw.anchor.as_deref()? {
                "head" => TimeRange::new(0.0, span),
                "tail" => TimeRange::new((duration_seconds - span).max(0.0), duration_seconds),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Accept numeric seconds or clock strings like `"8:30"`.
fn coerce_seconds(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => {
            let seconds = n.as_f64()?;
            (seconds >= 0.0).then_some(seconds)
        }
        serde_json::Value::String(s) => parse_clock_lenient(s),
        _ => None,
    }
}
