//! End-to-end engine scenarios over realistic transcripts.

use std::sync::Arc;

use transcript_qa::testing::{MockEmbeddings, MockLanguageModel};
use transcript_qa::{Confidence, ResponseStatus, TranscriptQa};

/// A ten-minute cooking lesson; segments every quarter minute or so
/// around the 8:30-9:05 window the time-range scenario asks about.
fn cooking_transcript() -> String {
    let mut lines = vec![
        "[00:00:00.000 --> 00:00:15.000] Welcome back to the kitchen, today we make sourdough."
            .to_string(),
        "[00:00:15.000 --> 00:00:40.000] We start by feeding the starter with flour and water."
            .to_string(),
    ];
    // Filler segments up to 8:30.
    let mut t = 40.0;
    let mut i = 0;
    while t < 510.0 {
        let end = t + 25.0;
        lines.push(format!(
            "[{} --> {}] Kneading and folding step number {} keeps the gluten developing.",
            clock(t),
            clock(end),
            i
        ));
        t = end;
        i += 1;
    }
    lines.push(format!(
        "[{} --> {}] Now we score the loaf with a sharp blade.",
        clock(510.0),
        clock(530.0)
    ));
    lines.push(format!(
        "[{} --> {}] The oven needs steam for the first ten minutes.",
        clock(530.0),
        clock(545.0)
    ));
    lines.push(format!(
        "[{} --> {}] After baking we let the loaf cool completely.",
        clock(545.0),
        clock(600.0)
    ));
    lines.join("\n")
}

fn clock(seconds: f64) -> String {
    let total = seconds as u64;
    format!(
        "{:02}:{:02}:{:02}.000",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

#[tokio::test]
async fn time_range_question_returns_stamped_extract() {
    let model = MockLanguageModel::new().with_reply(
        r#"{"intent":"time_range","time_range":{"kind":"absolute","start":"8:30","end":"9:05"},"keywords":["oven"],"reply_language":"en"}"#,
    );
    let engine = TranscriptQa::new().with_model(Arc::new(model));

    let response = engine
        .answer("what happens from 8:30 to 9:05", &cooking_transcript())
        .await;

    assert_eq!(response.status, ResponseStatus::Answered);
    assert_eq!(response.confidence, Confidence::High);
    assert!(response.content.contains("08:30-09:05"));
    // Stamps come straight from the matched segments.
    assert!(response.content.contains("00:08:30.000"));
    assert!(response.content.contains("00:09:05.000"));
    assert!(response.content.contains("[E1]"));
    assert!(response
        .evidence
        .iter()
        .all(|e| e.start_seconds < 545.0));
}

#[tokio::test]
async fn wide_window_covers_every_overlapping_segment() {
    // Twelve 10-second segments; the window spans all of them.
    let transcript: String = (0..12)
        .map(|i| {
            format!(
                "[{} --> {}] Step number {} of the recipe.",
                clock(i as f64 * 10.0),
                clock((i + 1) as f64 * 10.0),
                i
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let model = MockLanguageModel::new().with_reply(
        r#"{"intent":"time_range","time_range":{"kind":"absolute","start":0,"end":120},"keywords":[]}"#,
    );
    let engine = TranscriptQa::new().with_model(Arc::new(model));

    let response = engine.answer("walk me through 0:00 to 2:00", &transcript).await;

    assert_eq!(response.status, ResponseStatus::Answered);
    assert_eq!(response.evidence.len(), 12);
    assert!(response.content.contains("00:00-02:00"));
    // The rendering reaches the last segment in the window.
    assert!(response.content.contains("Step number 11"));
    assert!(response.content.contains("[E12]"));
}

#[tokio::test]
async fn off_topic_question_is_insufficient_evidence() {
    let model = MockLanguageModel::new()
        .with_reply(r#"{"intent":"factoid","keywords":["cryptocurrency","blockchain"]}"#);
    let engine = TranscriptQa::new().with_model(Arc::new(model));

    let response = engine
        .answer("explain cryptocurrency blockchain consensus", &cooking_transcript())
        .await;

    assert_eq!(response.status, ResponseStatus::InsufficientEvidence);
    assert_eq!(response.confidence, Confidence::Low);
    assert!(response.evidence.is_empty());
    assert!(response.content.contains("not contain enough"));
}

#[tokio::test]
async fn relative_range_resolves_against_duration() {
    // A 90 second transcript; the first third ends at 30 seconds.
    let transcript = "\
[00:00:00.000 --> 00:00:30.000] Introduction and goals for the session.
[00:00:30.000 --> 00:01:00.000] The middle portion covers technique.
[00:01:00.000 --> 00:01:30.000] Closing remarks and homework.";

    let model = MockLanguageModel::new().with_reply(
        r#"{"intent":"time_range","time_range":{"kind":"relative","anchor":"head","numerator":1,"denominator":3},"keywords":[]}"#,
    );
    let engine = TranscriptQa::new().with_model(Arc::new(model));

    let response = engine
        .answer("what does the first third of the video cover", transcript)
        .await;

    assert_eq!(response.status, ResponseStatus::Answered);
    assert!(!response.evidence.is_empty());
    assert!(response.evidence.iter().all(|e| e.start_seconds <= 30.0));
    assert!(response.content.contains("00:00-00:30"));
}

#[tokio::test]
async fn ungrounded_draft_is_replaced_with_extract() {
    let model = MockLanguageModel::new()
        .with_reply(r#"{"intent":"factoid","keywords":["starter","feeding"]}"#)
        // Fabricated claims with no citation markers.
        .with_reply("The chef recommends a commercial yeast blend from the store.");
    let engine = TranscriptQa::new().with_model(Arc::new(model));

    let response = engine
        .answer("how is the starter fed", &cooking_transcript())
        .await;

    // The rejected draft never reaches the caller.
    assert!(!response.content.contains("commercial yeast"));
    assert!(response.content.starts_with("Video highlights:"));
    assert!(response.content.contains("[E1]"));
    assert_eq!(response.status, ResponseStatus::Answered);
}

#[tokio::test]
async fn extractive_summary_without_model_is_cited() {
    let engine = TranscriptQa::new();

    let response = engine
        .answer("what is this video about", &cooking_transcript())
        .await;

    assert_eq!(response.status, ResponseStatus::Answered);
    assert!(response.content.starts_with("Video highlights:"));
    assert!(response.content.contains("[E1]"));
    assert_eq!(response.confidence, Confidence::Medium);
    assert!(!response.evidence.is_empty());
}

#[tokio::test]
async fn chinese_query_gets_chinese_rendering() {
    let transcript = "\
[00:00:00.000 --> 00:00:20.000] 今天我们学习制作酸面包。
[00:00:20.000 --> 00:00:40.000] 首先用面粉和水喂养酵母。
[00:00:40.000 --> 00:01:00.000] 然后揉面团并静置发酵。";

    let engine = TranscriptQa::new();
    let response = engine.answer("这个视频讲了什么", transcript).await;

    assert_eq!(response.status, ResponseStatus::Answered);
    assert!(response.content.starts_with("视频要点："));
}

#[tokio::test]
async fn embeddings_steer_hybrid_ranking() {
    let model = MockLanguageModel::new()
        .with_reply(r#"{"intent":"factoid","keywords":["scoring","blade"]}"#)
        .with_reply("The loaf is scored with a sharp blade before baking [E1].");
    // Pinned vectors make the query and the scoring segment identical;
    // every other pairing falls back to unrelated hash vectors.
    let embeddings = MockEmbeddings::new()
        .with_override("how is the loaf scored", vec![1.0, 0.0, 0.0])
        .with_override(
            "now we score the loaf with a sharp blade.",
            vec![1.0, 0.0, 0.0],
        );
    let engine = TranscriptQa::new()
        .with_model(Arc::new(model))
        .with_embeddings(Arc::new(embeddings));

    let response = engine
        .answer("how is the loaf scored", &cooking_transcript())
        .await;

    assert_eq!(response.status, ResponseStatus::Answered);
    assert!(response.content.contains("[E1]"));
    assert!(response
        .evidence
        .iter()
        .any(|e| e.text.contains("score the loaf")));
}

#[tokio::test]
async fn model_failure_degrades_to_extractive_answer() {
    let model = MockLanguageModel::new().with_failure();
    let engine = TranscriptQa::new().with_model(Arc::new(model));

    let response = engine
        .answer("what is this video about", &cooking_transcript())
        .await;

    // Understanding and synthesis both fail; the answer is extractive.
    assert_eq!(response.status, ResponseStatus::Answered);
    assert!(response.content.starts_with("Video highlights:"));
}
