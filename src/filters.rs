//! Heuristic predicates used while aggregating a discography.
//!
//! Each rule is a standalone function so the aggregation flow never has to
//! know what the thresholds are.

use std::sync::LazyLock;

use regex::Regex;

/// Share of uppercase letters above which lyrics count as all-caps.
pub const UPPERCASE_RATIO_THRESHOLD: f64 = 0.7;

static LIVE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\blive\b").expect("valid live marker pattern"));

/// Titles with a parenthesis usually denote remixes, demos or bonus
/// versions of a song that already appears elsewhere.
pub fn has_alternate_version_marker(title: &str) -> bool {
    title.contains('(')
}

/// Whether an album title marks a live recording.
pub fn is_live_release(title: &str) -> bool {
    LIVE_MARKER.is_match(title)
}

/// Whether a song/album pair is dropped before it reaches the document.
pub fn is_excluded_pairing(song_title: &str, album_title: &str) -> bool {
    has_alternate_version_marker(song_title) || has_alternate_version_marker(album_title)
}

/// Ratio of uppercase letters to all letters, or `None` without letters.
pub fn uppercase_ratio(text: &str) -> Option<f64> {
    let (letters, upper) = text
        .chars()
        .filter(|c| c.is_alphabetic())
        .fold((0usize, 0usize), |(letters, upper), c| {
            (letters + 1, upper + usize::from(c.is_uppercase()))
        });

    (letters > 0).then(|| upper as f64 / letters as f64)
}

/// Whether the text was most likely transcribed in all-caps.
pub fn is_mostly_uppercase(text: &str) -> bool {
    uppercase_ratio(text)
        .map(|ratio| ratio > UPPERCASE_RATIO_THRESHOLD)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternate_version_marker() {
        assert!(has_alternate_version_marker("Song (Remix)"));
        assert!(has_alternate_version_marker("Song (feat"));
        assert!(!has_alternate_version_marker("Song [Remix]"));
        assert!(!has_alternate_version_marker("Song"));
    }

    #[test]
    fn test_live_release() {
        assert!(is_live_release("Live at Wembley"));
        assert!(is_live_release("MTV Unplugged - LIVE"));
        assert!(is_live_release("Alive - Live"));
        assert!(!is_live_release("Alive"));
        assert!(!is_live_release("Oliver's Army"));
        assert!(!is_live_release("Livestock"));
    }

    #[test]
    fn test_excluded_pairing() {
        assert!(is_excluded_pairing("Intro (Demo)", "Album"));
        assert!(is_excluded_pairing("Intro", "Album (Deluxe)"));
        assert!(!is_excluded_pairing("Intro", "Album"));
    }

    #[test]
    fn test_uppercase_ratio() {
        assert_eq!(uppercase_ratio("1234 ..."), None);
        assert_eq!(uppercase_ratio("AB"), Some(1.0));
        assert_eq!(uppercase_ratio("Ab"), Some(0.5));
    }

    #[test]
    fn test_mostly_uppercase_threshold() {
        assert!(is_mostly_uppercase("HELLO WORLD"));
        assert!(!is_mostly_uppercase("Hello World"));
        // 7 of 10 letters is exactly the threshold, not above it
        assert!(!is_mostly_uppercase("ABCDEFGhij"));
        assert!(is_mostly_uppercase("ABCDEFGHij"));
        assert!(!is_mostly_uppercase(""));
    }
}
