//! Per-key mastery bookkeeping for the Quiz stage.
//!
//! The ledger decides, for one key and one submitted answer, whether the
//! answer is correct-new, correct-duplicate, or wrong, and maintains the
//! adaptive difficulty state: every third consecutive wrong answer doubles
//! the key's required-correct threshold and asks the caller to open the
//! review gate. Blank input never reaches the ledger; callers filter it
//! with [`matcher::is_blank`] first.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::core::matcher;

/// Consecutive wrong answers that trigger a review pause.
pub const REVIEW_TRIGGER_STREAK: u32 = 3;

/// Distinct correct answers required for a fresh key.
pub const INITIAL_REQUIRED_CORRECT: usize = 1;

/// Mastery state for a single key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyProgress {
    /// Distinct accepted values the learner must still supply to complete
    /// the key. Starts at 1 and doubles on every third consecutive miss.
    pub required_correct: usize,
    /// Normalized values already accepted for this key.
    pub submitted_values: BTreeSet<String>,
    /// Consecutive wrong answers since the last correct one. Always in
    /// `[0, REVIEW_TRIGGER_STREAK - 1]` between submissions.
    pub wrong_streak: u32,
    /// Whether the key reached its threshold.
    pub completed: bool,
}

impl Default for KeyProgress {
    fn default() -> Self {
        Self {
            required_correct: INITIAL_REQUIRED_CORRECT,
            submitted_values: BTreeSet::new(),
            wrong_streak: 0,
            completed: false,
        }
    }
}

impl KeyProgress {
    /// Distinct values still needed to complete the key.
    pub fn remaining(&self) -> usize {
        self.required_correct.saturating_sub(self.submitted_values.len())
    }
}

/// Outcome of one ledger submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LedgerOutcome {
    /// The candidate matched no accepted value.
    Wrong {
        /// True when this miss crossed the streak threshold; the caller
        /// should activate the review gate.
        review_requested: bool,
    },
    /// Correct, but the value was already accepted for this key.
    DuplicateCorrect,
    /// Correct and novel; the key still needs more distinct values.
    CorrectMoreNeeded { remaining: usize },
    /// Correct and novel; the key reached its threshold.
    KeyCompleted,
}

/// Per-key mastery ledger for one session.
///
/// Entries are created lazily on first submission for a key. Callers stop
/// submitting a key once [`LedgerOutcome::KeyCompleted`] is returned; the
/// Quiz stage enforces this by removing completed keys from its queue.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DifficultyLedger {
    entries: BTreeMap<String, KeyProgress>,
}

impl DifficultyLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit a (non-blank) candidate answer for a key.
    ///
    /// The threshold doubles without an upper bound, matching the source
    /// behavior: a key whose accepted-value count is below the threshold
    /// can no longer complete in the Quiz stage.
    pub fn submit(
        &mut self,
        key: &str,
        candidate: &str,
        accepted: &BTreeSet<String>,
    ) -> LedgerOutcome {
        let progress = self.entries.entry(key.to_string()).or_default();

        if !matcher::matches(candidate, accepted) {
            progress.wrong_streak += 1;
            if progress.wrong_streak >= REVIEW_TRIGGER_STREAK {
                progress.required_correct = progress.required_correct.saturating_mul(2);
                // The next pause needs three more consecutive misses.
                progress.wrong_streak = 0;
                return LedgerOutcome::Wrong {
                    review_requested: true,
                };
            }
            return LedgerOutcome::Wrong {
                review_requested: false,
            };
        }

        progress.wrong_streak = 0;

        let normalized = matcher::normalize(candidate);
        if progress.submitted_values.contains(&normalized) {
            return LedgerOutcome::DuplicateCorrect;
        }

        progress.submitted_values.insert(normalized);
        if progress.submitted_values.len() >= progress.required_correct {
            progress.completed = true;
            LedgerOutcome::KeyCompleted
        } else {
            LedgerOutcome::CorrectMoreNeeded {
                remaining: progress.remaining(),
            }
        }
    }

    /// Progress for a key, if the key has been submitted at least once.
    pub fn progress(&self, key: &str) -> Option<&KeyProgress> {
        self.entries.get(key)
    }

    /// Whether a key has completed.
    pub fn is_completed(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|p| p.completed)
    }

    /// Number of completed keys.
    pub fn completed_count(&self) -> usize {
        self.entries.values().filter(|p| p.completed).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepted(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    // =========================================================================
    // Wrong answers and threshold doubling
    // =========================================================================

    #[test]
    fn test_three_wrongs_double_threshold_and_request_review() {
        // Scenario: key "B" accepts only "banana"; three misses in a row.
        let mut ledger = DifficultyLedger::new();
        let values = accepted(&["banana"]);

        assert_eq!(
            ledger.submit("B", "mango", &values),
            LedgerOutcome::Wrong {
                review_requested: false
            }
        );
        assert_eq!(
            ledger.submit("B", "pear", &values),
            LedgerOutcome::Wrong {
                review_requested: false
            }
        );
        assert_eq!(
            ledger.submit("B", "kiwi", &values),
            LedgerOutcome::Wrong {
                review_requested: true
            }
        );

        let progress = ledger.progress("B").unwrap();
        assert_eq!(progress.required_correct, 2);
        assert_eq!(progress.wrong_streak, 0);
        assert!(!progress.completed);
    }

    #[test]
    fn test_threshold_doubles_on_every_crossing() {
        let mut ledger = DifficultyLedger::new();
        let values = accepted(&["banana"]);

        for _ in 0..3 {
            ledger.submit("B", "wrong", &values);
        }
        assert_eq!(ledger.progress("B").unwrap().required_correct, 2);

        for _ in 0..3 {
            ledger.submit("B", "wrong", &values);
        }
        assert_eq!(ledger.progress("B").unwrap().required_correct, 4);
    }

    #[test]
    fn test_correct_answer_resets_streak_before_threshold() {
        let mut ledger = DifficultyLedger::new();
        let values = accepted(&["apple", "apricot"]);

        ledger.submit("A", "wrong once", &values);
        ledger.submit("A", "wrong twice", &values);
        assert_eq!(ledger.progress("A").unwrap().wrong_streak, 2);

        ledger.submit("A", "apple", &values);
        assert_eq!(ledger.progress("A").unwrap().wrong_streak, 0);

        // Two more misses stay below the trigger: the streak is consecutive.
        ledger.submit("A", "wrong", &values);
        ledger.submit("A", "wrong", &values);
        assert_eq!(ledger.progress("A").unwrap().required_correct, 1);
    }

    // =========================================================================
    // Correct answers and completion
    // =========================================================================

    #[test]
    fn test_single_required_correct_completes_immediately() {
        // Scenario: normalized "Apple " completes a fresh key.
        let mut ledger = DifficultyLedger::new();
        let values = accepted(&["apple", "apricot"]);

        assert_eq!(
            ledger.submit("A", "Apple ", &values),
            LedgerOutcome::KeyCompleted
        );
        let progress = ledger.progress("A").unwrap();
        assert!(progress.completed);
        assert!(progress.submitted_values.contains("apple"));
    }

    #[test]
    fn test_correct_more_needed_reports_remaining() {
        let mut ledger = DifficultyLedger::new();
        let values = accepted(&["apple", "apricot", "avocado"]);

        // Push the threshold to 2 first.
        for _ in 0..3 {
            ledger.submit("A", "wrong", &values);
        }

        assert_eq!(
            ledger.submit("A", "apple", &values),
            LedgerOutcome::CorrectMoreNeeded { remaining: 1 }
        );
        assert_eq!(
            ledger.submit("A", "apricot", &values),
            LedgerOutcome::KeyCompleted
        );
        assert_eq!(ledger.completed_count(), 1);
    }

    #[test]
    fn test_duplicate_correct_changes_nothing_but_streak() {
        let mut ledger = DifficultyLedger::new();
        let values = accepted(&["apple", "apricot", "avocado"]);

        for _ in 0..3 {
            ledger.submit("A", "wrong", &values);
        }
        ledger.submit("A", "apple", &values);
        ledger.submit("A", "wrong", &values);

        let before = ledger.progress("A").unwrap().clone();
        assert_eq!(
            ledger.submit("A", "APPLE", &values),
            LedgerOutcome::DuplicateCorrect
        );

        let after = ledger.progress("A").unwrap();
        assert_eq!(after.required_correct, before.required_correct);
        assert_eq!(after.submitted_values, before.submitted_values);
        assert_eq!(after.completed, before.completed);
        assert_eq!(after.wrong_streak, 0);
    }

    #[test]
    fn test_entries_created_lazily() {
        let mut ledger = DifficultyLedger::new();
        assert!(ledger.progress("A").is_none());
        assert!(!ledger.is_completed("A"));

        ledger.submit("A", "nope", &accepted(&["apple"]));
        assert_eq!(ledger.progress("A").unwrap().required_correct, 1);
    }

    // =========================================================================
    // Property tests
    // =========================================================================

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        /// Candidates drawn from a pool where "apple" and "apricot" are the
        /// only correct answers.
        fn arb_candidates() -> impl Strategy<Value = Vec<String>> {
            prop::collection::vec(
                prop::sample::select(vec![
                    "apple".to_string(),
                    "apricot".to_string(),
                    "APPLE ".to_string(),
                    "mango".to_string(),
                    "pear".to_string(),
                    "kiwi".to_string(),
                ]),
                0..40,
            )
        }

        proptest! {
            #[test]
            fn prop_streak_bounded_and_threshold_power_of_two(candidates in arb_candidates()) {
                let mut ledger = DifficultyLedger::new();
                let values = accepted(&["apple", "apricot"]);
                let mut last_required = INITIAL_REQUIRED_CORRECT;

                for candidate in &candidates {
                    let outcome = ledger.submit("A", candidate, &values);
                    let progress = ledger.progress("A").unwrap();

                    prop_assert!(progress.wrong_streak < REVIEW_TRIGGER_STREAK);
                    prop_assert!(progress.required_correct.is_power_of_two());
                    prop_assert!(progress.required_correct >= last_required);
                    last_required = progress.required_correct;

                    // Callers stop submitting once the key completes.
                    if outcome == LedgerOutcome::KeyCompleted {
                        prop_assert!(
                            progress.submitted_values.len() >= progress.required_correct
                        );
                        break;
                    }
                }
            }

            #[test]
            fn prop_duplicates_are_idempotent(repeats in 1usize..10) {
                let mut ledger = DifficultyLedger::new();
                let values = accepted(&["apple", "apricot", "avocado"]);

                for _ in 0..3 {
                    ledger.submit("A", "wrong", &values);
                }
                ledger.submit("A", "apple", &values);
                let baseline = ledger.progress("A").unwrap().clone();

                for _ in 0..repeats {
                    prop_assert_eq!(
                        ledger.submit("A", "apple", &values),
                        LedgerOutcome::DuplicateCorrect
                    );
                }
                prop_assert_eq!(ledger.progress("A").unwrap(), &baseline);
            }
        }
    }
}
