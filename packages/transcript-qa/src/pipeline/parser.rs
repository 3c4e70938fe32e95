//! Transcript parsing and tokenization.
//!
//! Turns raw transcript text into structured, tokenized segments with a
//! detected script. Parsing never fails: malformed lines are skipped or
//! auto-timed, and empty input yields an empty document.

use std::sync::LazyLock;

use indexmap::IndexSet;
use regex::Regex;
use tracing::debug;

use crate::types::{Script, TranscriptDocument, TranscriptSegment};

/// Window length for lines that carry no usable timestamp.
const SYNTHETIC_WINDOW_SECONDS: f64 = 4.0;

/// Latin stopwords: articles, generic filler, and domain filler that
/// carries no retrieval signal in transcript queries.
const LATIN_STOPWORDS: &[&str] = &[
    "the", "and", "are", "was", "were", "for", "with", "this", "that", "these", "those", "what",
    "when", "where", "which", "who", "whom", "why", "how", "does", "did", "has", "have", "had",
    "will", "would", "could", "should", "can", "may", "might", "you", "your", "they", "them",
    "their", "there", "here", "about", "from", "into", "onto", "over", "under", "between", "been",
    "being", "not", "but", "all", "any", "some", "out", "one", "two", "its", "it's", "than",
    "then", "also", "just", "very", "please", "tell", "show", "give", "said", "say", "says",
    "talk", "talks", "mention", "mentions", "mentioned", "happen", "happens", "happened", "cover",
    "covers", "covered", "video", "transcript", "subtitle", "subtitles", "caption", "captions",
    "summary", "summarize", "summarise", "content", "section", "part",
];

/// CJK stopwords: function words and domain filler. Length-2 runs and
/// sliding bigrams are both filtered against this list.
const CJK_STOPWORDS: &[&str] = &[
    "这个", "那个", "这些", "那些", "什么", "怎么", "为什", "一个", "一些", "我们", "你们",
    "他们", "她们", "以及", "还有", "但是", "所以", "因为", "如果", "可以", "没有", "就是",
    "还是", "或者", "关于", "进行", "非常", "能够", "已经", "正在", "时候", "内容", "视频",
    "字幕", "总结", "概括", "请问", "告诉",
];

/// Bracketed time-range prefix: `[<stamp> --> <stamp>] text`.
///
/// The stamp halves are matched loosely so that a line with a malformed
/// timestamp still counts as a timed line (its bad half falls back to
/// the running cursor).
static TIMED_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[([^\]]+?)\s*-->\s*([^\]]+?)\]\s*(.*)$").expect("valid regex")
});

/// HTML-like tags, e.g. `<i>`, `</font>`, `<c.colorE5E5E5>`.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// ASS/SSA-style positioning codes, e.g. `{\an8}`.
static POSITION_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\\?[^}]*\}").expect("valid regex"));

/// WebVTT cue settings leaking into text, e.g. `align:start position:0%`.
static CUE_SETTING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:align|position|line|size|vertical):[^\s]+").expect("valid regex")
});

/// Bracket-enclosed annotations, e.g. `[Music]`, `[Applause]`.
static ANNOTATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("valid regex"));

/// A leading bracket group on an untimed line, e.g. a speaker label.
static LEADING_BRACKET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[^\]]*\]\s*").expect("valid regex"));

/// Parse raw transcript text into a document.
///
/// Each line is either `[HH:MM:SS.mmm --> HH:MM:SS.mmm] text` (comma
/// decimal also accepted) or plain text, which is auto-timed with a
/// 4-second window starting at the running fallback cursor. The cursor
/// tracks the maximum end time seen so far, so synthetic windows never
/// precede real ones.
pub fn parse(transcript_text: &str) -> TranscriptDocument {
    let mut segments: Vec<TranscriptSegment> = Vec::new();
    let mut cursor = 0.0f64;

    for raw_line in transcript_text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let (start, end, text) = match TIMED_LINE_RE.captures(line) {
            Some(caps) => {
                let parsed_start = parse_timestamp(&caps[1]);
                let parsed_end = parse_timestamp(&caps[2]);
                let text = clean_text(&caps[3]);

                let start = parsed_start.unwrap_or(cursor);
                let mut end = parsed_end.unwrap_or(start + SYNTHETIC_WINDOW_SECONDS);
                if end <= start {
                    // Keeps the end_seconds > start_seconds invariant even
                    // for zero-length or reversed stamps.
                    end = start + SYNTHETIC_WINDOW_SECONDS;
                }

                // Advance the cursor past parsed times even when the line
                // is dropped for having no text.
                cursor = cursor.max(end);

                (start, end, text)
            }
            None => {
                let stripped = LEADING_BRACKET_RE.replace(line, "");
                let text = clean_text(&stripped);
                let start = cursor;
                let end = start + SYNTHETIC_WINDOW_SECONDS;
                if !text.is_empty() {
                    cursor = cursor.max(end);
                }
                (start, end, text)
            }
        };

        if text.is_empty() {
            continue;
        }

        let id = format!("seg-{}", segments.len() + 1);
        let stamp = format!("[{} --> {}]", format_seconds(start), format_seconds(end));
        let normalized_text = text.to_lowercase();
        let latin_tokens = latin_tokens(&text);
        let cjk_tokens = cjk_tokens(&text);

        segments.push(TranscriptSegment {
            id,
            stamp,
            start_seconds: start,
            end_seconds: end,
            text,
            normalized_text,
            latin_tokens,
            cjk_tokens,
        });
    }

    let full_text = segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let script = detect_script(&full_text);

    debug!(
        segments = segments.len(),
        script = ?script,
        "parsed transcript"
    );

    TranscriptDocument {
        segments,
        script,
        full_text,
    }
}

/// Parse `HH:MM:SS(.|,)mmm` into seconds.
///
/// Returns `None` for non-numeric fields, minutes over 59, or seconds
/// at or over 60. The millisecond part is optional.
pub(crate) fn parse_timestamp(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let (clock, millis) = match raw.split_once(['.', ',']) {
        Some((clock, millis)) => (clock, Some(millis)),
        None => (raw, None),
    };

    let mut parts = clock.split(':');
    let hours: u64 = parts.next()?.trim().parse().ok()?;
    let minutes: u64 = parts.next()?.trim().parse().ok()?;
    let seconds: u64 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() || minutes > 59 || seconds >= 60 {
        return None;
    }

    let fraction = match millis {
        Some(m) => {
            let m = m.trim();
            let value: u64 = m.parse().ok()?;
            value as f64 / 10f64.powi(m.len() as i32)
        }
        None => 0.0,
    };

    Some((hours * 3600 + minutes * 60 + seconds) as f64 + fraction)
}

/// Lenient clock parsing for query understanding: accepts plain seconds
/// (`"512"`, `"512.5"`), `MM:SS`, and `HH:MM:SS(.mmm)`.
pub(crate) fn parse_clock_lenient(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(seconds) = raw.parse::<f64>() {
        return (seconds >= 0.0).then_some(seconds);
    }
    match raw.matches(':').count() {
        1 => {
            let (m, s) = raw.split_once(':')?;
            let minutes: u64 = m.trim().parse().ok()?;
            let seconds: f64 = s.trim().parse().ok()?;
            (seconds < 60.0).then_some(minutes as f64 * 60.0 + seconds)
        }
        2 => parse_timestamp(raw),
        _ => None,
    }
}

/// Strip markup, positioning codes, and bracketed annotations; collapse
/// whitespace.
pub(crate) fn clean_text(raw: &str) -> String {
    let text = TAG_RE.replace_all(raw, " ");
    let text = POSITION_CODE_RE.replace_all(&text, " ");
    let text = CUE_SETTING_RE.replace_all(&text, " ");
    let text = ANNOTATION_RE.replace_all(&text, " ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Render seconds as a zero-padded `HH:MM:SS.000` display stamp.
pub fn format_seconds(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!(
        "{:02}:{:02}:{:02}.000",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Detect the dominant script of a text.
///
/// Counts CJK code points and Latin letters among non-whitespace
/// characters; a share over 0.6 wins, no letters at all is `Unknown`,
/// anything else is `Mixed`.
pub fn detect_script(text: &str) -> Script {
    let mut cjk = 0usize;
    let mut latin = 0usize;
    let mut total = 0usize;

    for c in text.chars() {
        if c.is_whitespace() {
            continue;
        }
        total += 1;
        if is_cjk(c) {
            cjk += 1;
        } else if c.is_ascii_alphabetic() {
            latin += 1;
        }
    }

    if cjk == 0 && latin == 0 {
        return Script::Unknown;
    }
    let total = total as f64;
    if cjk as f64 / total > 0.6 {
        Script::Cjk
    } else if latin as f64 / total > 0.6 {
        Script::Latin
    } else {
        Script::Mixed
    }
}

/// Extract deduplicated Latin keyword tokens: lowercased runs of 3+
/// ASCII letters, minus stopwords.
pub fn latin_tokens(text: &str) -> IndexSet<String> {
    let mut tokens = IndexSet::new();
    let mut run = String::new();

    for c in text.chars().chain(std::iter::once(' ')) {
        if c.is_ascii_alphabetic() {
            run.push(c.to_ascii_lowercase());
        } else if !run.is_empty() {
            if run.len() >= 3 && !LATIN_STOPWORDS.contains(&run.as_str()) {
                tokens.insert(std::mem::take(&mut run));
            } else {
                run.clear();
            }
        }
    }

    tokens
}

/// Extract deduplicated CJK tokens: a run of exactly two CJK characters
/// is one token; longer runs become sliding two-character bigrams. Both
/// are filtered against the CJK stopword list.
pub fn cjk_tokens(text: &str) -> IndexSet<String> {
    let mut tokens = IndexSet::new();
    let mut run: Vec<char> = Vec::new();

    let mut flush = |run: &mut Vec<char>, tokens: &mut IndexSet<String>| {
        if run.len() >= 2 {
            for window in run.windows(2) {
                let bigram: String = window.iter().collect();
                if !CJK_STOPWORDS.contains(&bigram.as_str()) {
                    tokens.insert(bigram);
                }
            }
        }
        run.clear();
    };

    for c in text.chars() {
        if is_cjk(c) {
            run.push(c);
        } else {
            flush(&mut run, &mut tokens);
        }
    }
    flush(&mut run, &mut tokens);

    tokens
}

/// Tokenize arbitrary text: the union of Latin and CJK token sets.
///
/// Shared by the parser, the retriever's lexical scoring, and the
/// verifier's novelty check.
pub fn tokenize_query(text: &str) -> IndexSet<String> {
    let mut tokens = latin_tokens(text);
    tokens.extend(cjk_tokens(text));
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE: &str = "\
[00:00:01.000 --> 00:00:04.500] Welcome to the baking tutorial.
[00:00:04.500 --> 00:00:09.000] Today we make sourdough bread from scratch.
[00:00:09.000 --> 00:00:15.250] First, feed the starter with flour and water.";

    #[test]
    fn test_parse_basic_timed_lines() {
        let doc = parse(SAMPLE);
        assert_eq!(doc.segments.len(), 3);

        let first = &doc.segments[0];
        assert_eq!(first.id, "seg-1");
        assert_eq!(first.stamp, "[00:00:01.000 --> 00:00:04.000]");
        assert!((first.start_seconds - 1.0).abs() < 1e-9);
        assert!((first.end_seconds - 4.5).abs() < 1e-9);
        assert_eq!(first.text, "Welcome to the baking tutorial.");
        assert_eq!(doc.script, Script::Latin);
        assert!((doc.duration_seconds() - 15.25).abs() < 1e-9);
    }

    #[test]
    fn test_parse_comma_decimal_separator() {
        let doc = parse("[00:00:01,500 --> 00:00:03,000] Comma style.");
        assert_eq!(doc.segments.len(), 1);
        assert!((doc.segments[0].start_seconds - 1.5).abs() < 1e-9);
        assert!((doc.segments[0].end_seconds - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_empty_and_malformed_input() {
        assert!(parse("").is_empty());
        assert!(parse("\n   \n\n").is_empty());
        // Annotation-only lines clean to nothing and are dropped.
        assert!(parse("[00:00:01.000 --> 00:00:02.000] [Music]").is_empty());
    }

    #[test]
    fn test_untimed_lines_get_synthetic_windows() {
        let doc = parse("plain first line\nplain second line");
        assert_eq!(doc.segments.len(), 2);
        assert!((doc.segments[0].start_seconds - 0.0).abs() < 1e-9);
        assert!((doc.segments[0].end_seconds - 4.0).abs() < 1e-9);
        assert!((doc.segments[1].start_seconds - 4.0).abs() < 1e-9);
        assert!((doc.segments[1].end_seconds - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_synthetic_windows_never_precede_real_ones() {
        let doc = parse(
            "[00:01:00.000 --> 00:01:10.000] timed line here\nuntimed trailing line",
        );
        assert_eq!(doc.segments.len(), 2);
        assert!((doc.segments[1].start_seconds - 70.0).abs() < 1e-9);
        assert!((doc.segments[1].end_seconds - 74.0).abs() < 1e-9);
    }

    #[test]
    fn test_bad_timestamp_falls_back_to_cursor() {
        let doc = parse(
            "[00:00:05.000 --> 00:00:10.000] good line\n[00:99:99.000 --> 00:00:xx.000] bad stamps",
        );
        assert_eq!(doc.segments.len(), 2);
        // Both halves failed to parse: start comes from the cursor.
        assert!((doc.segments[1].start_seconds - 10.0).abs() < 1e-9);
        assert!((doc.segments[1].end_seconds - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_reversed_stamp_keeps_invariant() {
        let doc = parse("[00:00:10.000 --> 00:00:05.000] reversed window");
        assert_eq!(doc.segments.len(), 1);
        assert!(doc.segments[0].end_seconds > doc.segments[0].start_seconds);
    }

    #[test]
    fn test_clean_text_strips_markup() {
        assert_eq!(
            clean_text("<i>Hello</i> {\\an8}world [Applause]   now"),
            "Hello world now"
        );
        assert_eq!(
            clean_text("align:start position:0% actual words"),
            "actual words"
        );
    }

    #[test]
    fn test_parse_timestamp_validation() {
        assert_eq!(parse_timestamp("00:01:30.500"), Some(90.5));
        assert_eq!(parse_timestamp("01:00:00"), Some(3600.0));
        assert_eq!(parse_timestamp("00:60:00.000"), None); // minutes > 59
        assert_eq!(parse_timestamp("00:00:60.000"), None); // seconds >= 60
        assert_eq!(parse_timestamp("00:0x:00.000"), None); // non-numeric
        assert_eq!(parse_timestamp("00:00"), None); // missing field
    }

    #[test]
    fn test_parse_clock_lenient() {
        assert_eq!(parse_clock_lenient("512"), Some(512.0));
        assert_eq!(parse_clock_lenient("8:30"), Some(510.0));
        assert_eq!(parse_clock_lenient("01:08:30"), Some(4110.0));
        assert_eq!(parse_clock_lenient("nope"), None);
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0.0), "00:00:00.000");
        assert_eq!(format_seconds(510.9), "00:08:30.000");
        assert_eq!(format_seconds(3661.0), "01:01:01.000");
        assert_eq!(format_seconds(-5.0), "00:00:00.000");
    }

    #[test]
    fn test_detect_script() {
        assert_eq!(detect_script("hello world"), Script::Latin);
        assert_eq!(detect_script("今天我们学习做面包"), Script::Cjk);
        assert_eq!(detect_script("12345 --- !!!"), Script::Unknown);
        assert_eq!(detect_script("我们 learn baking 面包做法和技巧"), Script::Mixed);
    }

    #[test]
    fn test_latin_tokens_filter_stopwords_and_length() {
        let tokens = latin_tokens("The sourdough starter is fed at an interval");
        assert!(tokens.contains("sourdough"));
        assert!(tokens.contains("starter"));
        assert!(tokens.contains("interval"));
        assert!(!tokens.contains("the")); // stopword
        assert!(!tokens.contains("is")); // too short
    }

    #[test]
    fn test_cjk_tokens_bigrams() {
        // Run of exactly two is one token.
        let two = cjk_tokens("面包");
        assert!(two.contains("面包"));
        assert_eq!(two.len(), 1);

        // Longer runs become sliding bigrams.
        let long = cjk_tokens("酸面团发酵");
        assert!(long.contains("酸面"));
        assert!(long.contains("面团"));
        assert!(long.contains("团发"));
        assert!(long.contains("发酵"));

        // Stopworded bigrams are dropped.
        assert!(cjk_tokens("我们").is_empty());
    }

    #[test]
    fn test_tokenize_round_trip_on_segment_text() {
        let doc = parse(SAMPLE);
        for segment in &doc.segments {
            let query_tokens = tokenize_query(&segment.text);
            let overlap = query_tokens
                .iter()
                .filter(|t| segment.latin_tokens.contains(*t) || segment.cjk_tokens.contains(*t))
                .count();
            assert!(overlap > 0, "no token overlap for: {}", segment.text);
        }
    }

    fn transcript_strategy() -> impl Strategy<Value = String> {
        // Well-formed timed lines with increasing stamps.
        (1usize..20, "[a-z]{3,8}( [a-z]{3,8}){0,5}").prop_map(|(count, words)| {
            (0..count)
                .map(|i| {
                    let start = i as u64 * 5;
                    let end = start + 5;
                    format!(
                        "[{}:{:02}:{:02}.000 --> {}:{:02}:{:02}.000] {}",
                        start / 3600,
                        (start % 3600) / 60,
                        start % 60,
                        end / 3600,
                        (end % 3600) / 60,
                        end % 60,
                        words
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    proptest! {
        #[test]
        fn prop_parse_is_idempotent(transcript in transcript_strategy()) {
            let first = parse(&transcript);
            let second = parse(&transcript);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_segment_invariants_hold(transcript in transcript_strategy()) {
            let doc = parse(&transcript);
            let mut previous_start = f64::NEG_INFINITY;
            for segment in &doc.segments {
                prop_assert!(segment.end_seconds > segment.start_seconds);
                prop_assert!(segment.start_seconds >= previous_start);
                prop_assert!(!segment.text.is_empty());
                previous_start = segment.start_seconds;
            }
        }
    }
}
