//! Lyric text normalization.
//!
//! Raw lyrics arrive with section labels, hard line breaks and the odd
//! transcription artifact. The poster prints every song as one flowing
//! line, so [`clean_lyrics`] folds them into a single normalized string.

use std::sync::LazyLock;

use regex::Regex;

use crate::filters::is_mostly_uppercase;

/// Separator that replaces line breaks.
pub const LINE_SEPARATOR: &str = " · ";

static ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[.*?\]").expect("valid annotation pattern"));

static LINE_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[\r\n]\s*").expect("valid line break pattern"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

static LONG_ELLIPSIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.{4,}").expect("valid ellipsis pattern"));

/// Normalize raw lyric text into a single line.
///
/// Steps, in order: drop `[...]` annotations, turn line-break runs into
/// [`LINE_SEPARATOR`], squeeze whitespace and trim (including dangling
/// separators at either end), shorten runs of four or more periods to
/// `...`, and lowercase text that is mostly uppercase.
pub fn clean_lyrics(raw: &str) -> String {
    let without_annotations = ANNOTATION.replace_all(raw, "");
    let one_line = LINE_BREAKS.replace_all(&without_annotations, LINE_SEPARATOR);
    let squeezed = WHITESPACE.replace_all(&one_line, " ");
    let trimmed = trim_separators(&squeezed);
    let cleaned = LONG_ELLIPSIS.replace_all(trimmed, "...");

    if is_mostly_uppercase(&cleaned) {
        cleaned.to_lowercase()
    } else {
        cleaned.into_owned()
    }
}

fn trim_separators(text: &str) -> &str {
    let separator = LINE_SEPARATOR.trim();
    text.trim_matches(|c: char| c.is_whitespace() || separator.contains(c))
}
