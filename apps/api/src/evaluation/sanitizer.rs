//! Transcript sanitizer — strips conversational filler and bounds prompt size.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

/// Hard cap on sanitized transcript length, in characters.
pub const MAX_TRANSCRIPT_CHARS: usize = 30_000;

/// Appended after a transcript cut at `MAX_TRANSCRIPT_CHARS`.
pub const TRUNCATION_MARKER: &str = "... [TRUNCATED]";

static FILLER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:uh|um|hmm|okay|actually|basically|like|you know|right|so)\b")
        .expect("filler pattern is a valid regex")
});

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is a valid regex"));

/// Removes whole-word filler tokens, collapses whitespace and truncates the
/// result to `MAX_TRANSCRIPT_CHARS` characters plus `TRUNCATION_MARKER`.
pub fn sanitize(transcript: &str) -> String {
    if transcript.trim().is_empty() {
        return String::new();
    }

    let stripped = FILLER_PATTERN.replace_all(transcript, "");
    let collapsed = WHITESPACE_RUN.replace_all(&stripped, " ");
    let sanitized = collapsed.trim();

    let char_count = sanitized.chars().count();
    if char_count > MAX_TRANSCRIPT_CHARS {
        warn!(
            "Transcript too long ({} chars), truncating to {}",
            char_count, MAX_TRANSCRIPT_CHARS
        );
        let mut truncated: String = sanitized.chars().take(MAX_TRANSCRIPT_CHARS).collect();
        truncated.push_str(TRUNCATION_MARKER);
        return truncated;
    }

    sanitized.to_string()
}
