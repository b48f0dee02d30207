//! Candidate filtering for suggestion providers.
//!
//! Raw word lists carry boilerplate: navigation text, prices, bare
//! numbers. Every provider pushes its candidates through this filter
//! before grouping them into key buckets.

use std::collections::{BTreeMap, HashSet};

use crate::core::matcher;

/// Minimum normalized candidate length, in characters.
pub const MIN_CANDIDATE_LEN: usize = 2;

/// Maximum normalized candidate length, in characters.
pub const MAX_CANDIDATE_LEN: usize = 120;

/// Substrings that mark a candidate as boilerplate rather than a value.
const BLOCKED_TOKENS: &[&str] = &[
    "click",
    "cookie",
    "sign in",
    "log in",
    "subscribe",
    "advertis",
    "http",
    "www.",
    "menu",
    "search",
    "privacy",
    "terms",
];

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥'];

/// Whether a raw candidate is usable as an accepted value.
///
/// The check runs on the normalized form, so casing and whitespace never
/// decide validity.
pub fn is_valid_candidate(raw: &str) -> bool {
    let normalized = matcher::normalize(raw);
    let len = normalized.chars().count();
    if !(MIN_CANDIDATE_LEN..=MAX_CANDIDATE_LEN).contains(&len) {
        return false;
    }
    if BLOCKED_TOKENS.iter().any(|token| normalized.contains(token)) {
        return false;
    }
    if normalized.contains(CURRENCY_SYMBOLS) {
        return false;
    }
    // Pure numbers and punctuation runs are noise, not values.
    if !normalized.chars().any(|c| c.is_alphabetic()) {
        return false;
    }
    true
}

/// Normalize candidates and drop duplicates, keeping first-occurrence
/// order.
pub fn dedup_candidates<I, S>(candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for candidate in candidates {
        let normalized = matcher::normalize(candidate.as_ref());
        if seen.insert(normalized.clone()) {
            result.push(normalized);
        }
    }
    result
}

/// Bucket candidates by first ASCII letter into key groups.
///
/// Bucket keys are single uppercase letters; candidates starting with
/// anything else are dropped. Each bucket holds at most `per_key_cap`
/// candidates, in input order, and empty buckets are never returned.
pub fn group_by_initial<I, S>(candidates: I, per_key_cap: usize) -> BTreeMap<String, Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for candidate in candidates {
        let candidate = candidate.as_ref();
        let first = match candidate.chars().next() {
            Some(c) => c,
            None => continue,
        };
        if !first.is_ascii_alphabetic() {
            continue;
        }
        let bucket = groups.entry(first.to_ascii_uppercase().to_string()).or_default();
        if bucket.len() < per_key_cap {
            bucket.push(candidate.to_string());
        }
    }
    groups.retain(|_, bucket| !bucket.is_empty());
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // is_valid_candidate
    // =========================================================================

    #[test]
    fn test_accepts_ordinary_words() {
        assert!(is_valid_candidate("apple"));
        assert!(is_valid_candidate("  Apricot  "));
        assert!(is_valid_candidate("route 66"));
        assert!(is_valid_candidate("ox"));
    }

    #[test]
    fn test_rejects_on_length() {
        assert!(!is_valid_candidate(""));
        assert!(!is_valid_candidate("a"));
        assert!(!is_valid_candidate(" a "));
        assert!(is_valid_candidate(&"ab".repeat(60))); // exactly 120
        assert!(!is_valid_candidate(&"a".repeat(121)));
    }

    #[test]
    fn test_rejects_blocked_tokens_case_insensitively() {
        assert!(!is_valid_candidate("Click here to continue"));
        assert!(!is_valid_candidate("We use Cookies"));
        assert!(!is_valid_candidate("Sign  In"));
        assert!(!is_valid_candidate("see https://example.com"));
        assert!(!is_valid_candidate("WWW.example.org"));
        assert!(!is_valid_candidate("Privacy Policy"));
        assert!(!is_valid_candidate("advertisement"));
    }

    #[test]
    fn test_rejects_currency_and_non_alphabetic() {
        assert!(!is_valid_candidate("$19.99"));
        assert!(!is_valid_candidate("save £5 today"));
        assert!(!is_valid_candidate("12345"));
        assert!(!is_valid_candidate("--- !!! ---"));
    }

    // =========================================================================
    // dedup_candidates
    // =========================================================================

    #[test]
    fn test_dedup_normalizes_and_keeps_first_occurrence() {
        let result = dedup_candidates(["Apple", "banana", "  APPLE ", "Banana", "cherry"]);
        assert_eq!(result, vec!["apple", "banana", "cherry"]);
    }

    #[test]
    fn test_dedup_of_empty_input_is_empty() {
        let empty: [&str; 0] = [];
        assert!(dedup_candidates(empty).is_empty());
    }

    // =========================================================================
    // group_by_initial
    // =========================================================================

    #[test]
    fn test_groups_by_uppercased_first_letter() {
        let groups = group_by_initial(["apple", "apricot", "banana"], 10);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["A"], vec!["apple", "apricot"]);
        assert_eq!(groups["B"], vec!["banana"]);
    }

    #[test]
    fn test_group_caps_each_bucket_in_input_order() {
        let groups = group_by_initial(["apple", "apricot", "avocado"], 2);
        assert_eq!(groups["A"], vec!["apple", "apricot"]);
    }

    #[test]
    fn test_group_drops_non_letter_initials() {
        let groups = group_by_initial(["apple", "99 balloons", "émigré", ""], 10);
        assert_eq!(groups.len(), 1);
        assert!(groups.contains_key("A"));
    }

    #[test]
    fn test_group_with_zero_cap_is_empty() {
        assert!(group_by_initial(["apple"], 0).is_empty());
    }
}
