//! Keyword and time-window filters shared by all collectors.

use chrono::{DateTime, Duration, Utc};

/// Returns `true` if `text` contains at least one keyword, case-insensitively.
///
/// An empty keyword list means no filter: everything matches.
#[must_use]
pub fn matches_keywords(text: &str, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return true;
    }
    let lower = text.to_lowercase();
    keywords.iter().any(|k| lower.contains(&k.to_lowercase()))
}

/// Returns `true` if `timestamp` falls within `[now - window, now]`.
///
/// An unknown timestamp passes: the source could not provide one, and the
/// contract keeps such records rather than guessing.
#[must_use]
pub fn within_window(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>, window: Duration) -> bool {
    match timestamp {
        Some(ts) => ts >= now - window && ts <= now,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_keywords_match_everything() {
        assert!(matches_keywords("anything at all", &[]));
        assert!(matches_keywords("", &[]));
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let keywords = vec!["Python".to_string()];
        assert!(matches_keywords("learning python today", &keywords));
        assert!(matches_keywords("PYTHON 3.13 released", &keywords));
        assert!(!matches_keywords("rust is fine too", &keywords));
    }

    #[test]
    fn any_keyword_suffices() {
        let keywords = vec!["ai".to_string(), "ml".to_string()];
        assert!(matches_keywords("new ML paper", &keywords));
    }

    #[test]
    fn known_timestamp_outside_window_is_excluded() {
        let now = Utc::now();
        let window = Duration::hours(24);
        assert!(!within_window(Some(now - Duration::hours(25)), now, window));
        assert!(!within_window(Some(now + Duration::hours(1)), now, window));
    }

    #[test]
    fn known_timestamp_inside_window_passes() {
        let now = Utc::now();
        let window = Duration::hours(24);
        assert!(within_window(Some(now - Duration::hours(23)), now, window));
        assert!(within_window(Some(now), now, window));
    }

    #[test]
    fn unknown_timestamp_always_passes() {
        let now = Utc::now();
        assert!(within_window(None, now, Duration::hours(1)));
        assert!(within_window(None, now, Duration::zero()));
    }
}
