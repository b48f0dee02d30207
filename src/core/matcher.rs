//! Answer normalization and matching.
//!
//! A submitted answer and every accepted value are normalized the same way
//! before comparison: leading/trailing whitespace trimmed, internal runs of
//! whitespace collapsed to single spaces, and the result lowercased. Matching
//! is exact equality of normalized forms; there is no fuzzy or partial match.
//!
//! A candidate that is empty after trimming is not an answer at all. Callers
//! filter it with [`is_blank`] before any correctness bookkeeping so that a
//! stray Enter keypress never counts as a wrong attempt.

use std::collections::BTreeSet;

/// Normalize an answer for comparison.
///
/// Trims, collapses internal whitespace runs to single spaces, and
/// lowercases. Normalization is idempotent.
pub fn normalize(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Check whether a candidate is blank (empty after trimming).
pub fn is_blank(input: &str) -> bool {
    input.trim().is_empty()
}

/// Check whether a candidate matches any accepted value.
///
/// Both sides are normalized, so `"Apple "` matches an accepted `"apple"`
/// and `"new   york"` matches `"New York"`.
pub fn matches(candidate: &str, accepted: &BTreeSet<String>) -> bool {
    let normalized = normalize(candidate);
    accepted.iter().any(|value| normalize(value) == normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepted(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    // =========================================================================
    // normalize
    // =========================================================================

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(normalize("  apple  "), "apple");
        assert_eq!(normalize("\tapple\n"), "apple");
    }

    #[test]
    fn test_normalize_lowercases() {
        assert_eq!(normalize("APPLE"), "apple");
        assert_eq!(normalize("ApPlE"), "apple");
    }

    #[test]
    fn test_normalize_collapses_internal_whitespace() {
        assert_eq!(normalize("new   york"), "new york");
        assert_eq!(normalize("new\t\tyork  city"), "new york city");
    }

    #[test]
    fn test_normalize_empty_and_whitespace_only() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    // =========================================================================
    // is_blank
    // =========================================================================

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("   "));
        assert!(is_blank("\t\n"));
        assert!(!is_blank("a"));
        assert!(!is_blank("  a  "));
    }

    // =========================================================================
    // matches
    // =========================================================================

    #[test]
    fn test_matches_exact() {
        let values = accepted(&["apple", "apricot"]);
        assert!(matches("apple", &values));
        assert!(matches("apricot", &values));
        assert!(!matches("banana", &values));
    }

    #[test]
    fn test_matches_normalizes_candidate() {
        // Scenario: "Apple " with trailing whitespace and a capital still
        // matches the accepted "apple".
        let values = accepted(&["apple", "apricot"]);
        assert!(matches("Apple ", &values));
        assert!(matches("  APRICOT", &values));
    }

    #[test]
    fn test_matches_normalizes_accepted_values() {
        let values = accepted(&["New York", "Rio  de Janeiro"]);
        assert!(matches("new york", &values));
        assert!(matches("rio de janeiro", &values));
    }

    #[test]
    fn test_matches_rejects_partial() {
        let values = accepted(&["apple"]);
        assert!(!matches("app", &values));
        assert!(!matches("apples", &values));
    }

    #[test]
    fn test_matches_empty_candidate_never_matches_nonblank_values() {
        let values = accepted(&["apple"]);
        assert!(!matches("", &values));
        assert!(!matches("   ", &values));
    }

    // =========================================================================
    // Property tests
    // =========================================================================

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_normalize_is_idempotent(input in ".{0,40}") {
                let once = normalize(&input);
                let twice = normalize(&once);
                prop_assert_eq!(once, twice);
            }

            #[test]
            fn prop_normalized_has_no_edge_or_double_spaces(input in ".{0,40}") {
                let normalized = normalize(&input);
                prop_assert!(!normalized.starts_with(' '));
                prop_assert!(!normalized.ends_with(' '));
                prop_assert!(!normalized.contains("  "));
            }

            #[test]
            fn prop_candidate_always_matches_itself(input in "[a-z]{1,20}") {
                let values: BTreeSet<String> = [input.clone()].into_iter().collect();
                prop_assert!(matches(&input, &values));
            }
        }
    }
}
