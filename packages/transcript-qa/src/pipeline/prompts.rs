//! LLM prompts for query understanding and grounded synthesis.
//!
//! Understanding uses a strict JSON output contract with closed
//! vocabularies; synthesis forbids outside knowledge and requires an
//! `[E#]` citation on every claim.

/// System prompt for intent classification and time-range resolution.
pub const UNDERSTAND_SYSTEM_PROMPT: &str = r#"You classify questions asked about a video transcript. Output ONLY a JSON object - no prose, no code fences.

Schema:
{
    "intent": "summary" | "time_range" | "factoid" | "compare" | "yes_no",
    "time_range": {
        "kind": "none" | "absolute" | "relative",
        "start": <seconds or clock string like "8:30">,   (absolute only)
        "end": <seconds or clock string>,                 (absolute only)
        "anchor": "head" | "tail",                        (relative only)
        "numerator": <integer>,                           (relative only)
        "denominator": <integer>                          (relative only)
    },
    "keywords": ["terms worth searching the transcript for"],
    "reply_language": "zh" | "en" | null
}

Rules:
- "time_range" intent when the question names an explicit or relative span of the video ("from 8:30 to 9:05", "the first third").
- A relative span is a fraction of the total duration anchored at the head or tail: "first third" -> anchor "head", numerator 1, denominator 3; "last quarter" -> anchor "tail", 1/4.
- "reply_language" is the language the user should be answered in, null if unclear."#;

/// System prompt for grounded answer synthesis.
pub const SYNTHESIZE_SYSTEM_PROMPT: &str = r#"You answer questions about a video using ONLY the numbered transcript evidence provided. Rules:
1. Use no outside knowledge. If the evidence does not contain the answer, say so.
2. Every claim must cite its supporting evidence line as [E1], [E2], etc.
3. Do not invent timestamps, names, or events absent from the evidence.
4. Keep the answer concise."#;

/// Format the understanding user message.
pub fn format_understand_prompt(
    query: &str,
    transcript_script: &str,
    duration_seconds: f64,
) -> String {
    format!(
        "Question: {query}\nTranscript language: {transcript_script}\nVideo duration: {duration_seconds:.0} seconds"
    )
}

/// Format the synthesis user message from numbered evidence lines.
pub fn format_synthesize_prompt(query: &str, evidence_lines: &[String], reply_chinese: bool) -> String {
    let language_note = if reply_chinese {
        "Answer in Chinese."
    } else {
        "Answer in English."
    };
    format!(
        "Question: {query}\n\nTranscript evidence:\n{}\n\n{language_note}",
        evidence_lines.join("\n")
    )
}
