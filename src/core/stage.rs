//! Stage state machine.
//!
//! A session moves through Practice → Quiz → Final → Complete. Practice is
//! browse-only; Quiz drills incomplete keys in random order with adaptive
//! difficulty; Final walks every key in canonical order demanding full
//! coverage, restarting from the first key on any miss; Complete is
//! terminal. [`StageController`] is a short-lived view that borrows the
//! session's mutable parts for one operation; all stage transitions happen
//! inside it.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use rand::{rng, Rng};
use serde::{Deserialize, Serialize};

use crate::core::gate::ReviewGate;
use crate::core::knowledge::KnowledgeSet;
use crate::core::ledger::{DifficultyLedger, LedgerOutcome, REVIEW_TRIGGER_STREAK};
use crate::core::matcher;
use crate::error::{Result, RoteError};

/// Pairs shown per Practice window.
pub const PRACTICE_WINDOW_SIZE: usize = 4;

/// Schema version written into completion records.
pub const COMPLETION_SCHEMA_VERSION: u32 = 1;

// =============================================================================
// Stages
// =============================================================================

/// The stage a session is in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Browsing pairs; no correctness checking.
    Practice,
    /// Random-order drill over incomplete keys.
    Quiz,
    /// Strict-order full-coverage review.
    Final,
    /// Terminal; the session is done.
    Complete,
}

impl Stage {
    /// Whether the session has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Complete)
    }

    /// Whether answer submissions are meaningful in this stage.
    pub fn accepts_answers(&self) -> bool {
        matches!(self, Stage::Quiz | Stage::Final)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Practice => "practice",
            Stage::Quiz => "quiz",
            Stage::Final => "final",
            Stage::Complete => "complete",
        };
        write!(f, "{}", name)
    }
}

/// Full per-stage state for one session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum StageState {
    /// Browsing pairs in fixed windows.
    Practice {
        /// Current window index (0-based).
        window: usize,
    },
    /// Drilling incomplete keys in random order.
    Quiz {
        /// Keys still to be completed, excluding the current one.
        queue: Vec<String>,
        /// The key currently being asked.
        current: String,
    },
    /// Reviewing every key in canonical order.
    Final {
        /// All keys in canonical order.
        order: Vec<String>,
        /// Index of the key under review.
        cursor: usize,
        /// Normalized values already supplied for the cursor key.
        supplied: BTreeSet<String>,
        /// Consecutive misses in this stage.
        wrong_streak: u32,
    },
    /// Terminal.
    Complete,
}

impl Default for StageState {
    fn default() -> Self {
        StageState::Practice { window: 0 }
    }
}

impl StageState {
    /// The stage this state belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            StageState::Practice { .. } => Stage::Practice,
            StageState::Quiz { .. } => Stage::Quiz,
            StageState::Final { .. } => Stage::Final,
            StageState::Complete => Stage::Complete,
        }
    }

    /// The key a submission would be checked against, if any.
    pub fn current_key(&self) -> Option<&str> {
        match self {
            StageState::Quiz { current, .. } => Some(current.as_str()),
            StageState::Final { order, cursor, .. } => order.get(*cursor).map(|k| k.as_str()),
            _ => None,
        }
    }

    /// Build the Quiz entry state: incomplete keys queued, one drawn out.
    ///
    /// Falls through to the Final entry state if every key is already
    /// complete in the ledger.
    fn enter_quiz(set: &KnowledgeSet, ledger: &DifficultyLedger) -> Self {
        let mut queue: Vec<String> = set
            .ordered_keys()
            .into_iter()
            .filter(|key| !ledger.is_completed(key))
            .cloned()
            .collect();
        match draw_random(&mut queue) {
            Some(current) => StageState::Quiz { queue, current },
            None => Self::enter_final(set),
        }
    }

    /// Build the Final entry state: canonical order, cursor at the start.
    fn enter_final(set: &KnowledgeSet) -> Self {
        StageState::Final {
            order: set.ordered_keys().into_iter().cloned().collect(),
            cursor: 0,
            supplied: BTreeSet::new(),
            wrong_streak: 0,
        }
    }
}

/// Draw a uniformly random key out of the queue.
fn draw_random(queue: &mut Vec<String>) -> Option<String> {
    if queue.is_empty() {
        return None;
    }
    let mut rng = rng();
    let index = rng.random_range(0..queue.len());
    Some(queue.swap_remove(index))
}

/// Distinct accepted values after normalization.
///
/// Two raw values that normalize identically count once; Final-stage
/// coverage is measured against this.
fn normalized_value_count(accepted: &BTreeSet<String>) -> usize {
    accepted
        .iter()
        .map(|value| matcher::normalize(value))
        .collect::<BTreeSet<_>>()
        .len()
}

// =============================================================================
// Feedback
// =============================================================================

/// Why a submission answered [`Feedback::GateActive`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GateReason {
    /// This submission was the third consecutive miss and opened the gate.
    RepeatedMisses,
    /// A previously opened gate is still running.
    LockoutActive,
}

/// Result of one session operation, rendered by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "feedback", rename_all = "snake_case")]
pub enum Feedback {
    /// The submission was empty after trimming; nothing was counted.
    BlankInput,
    /// The answer matched no accepted value.
    Wrong,
    /// Correct, but already supplied for this key.
    DuplicateCorrect,
    /// Correct and novel; more distinct values are needed for this key.
    CorrectMoreNeeded { remaining: usize },
    /// The current key is done.
    KeyCompleted,
    /// The review gate blocks submissions for `remaining_secs` more seconds.
    GateActive {
        remaining_secs: i64,
        reason: GateReason,
    },
    /// A manual stage advance succeeded.
    StageAdvanced { stage: Stage },
    /// The whole session finished; the record is handed off to the caller.
    SessionComplete { record: CompletionRecord },
}

// =============================================================================
// Completion records
// =============================================================================

/// Terminal status of a session. Currently always `Completed`; the field
/// keeps the log format extensible.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    Completed,
}

/// One completed session, appended to the completion log.
///
/// Created exactly once, at the Final→Complete transition; the core holds
/// no copy afterward.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionRecord {
    /// Schema version.
    pub v: u32,
    /// When the session completed.
    pub ts: DateTime<Utc>,
    /// Id of the knowledge set that was drilled.
    pub set_id: String,
    /// Terminal status.
    pub status: CompletionStatus,
}

impl CompletionRecord {
    /// Create a record stamped with the current time.
    pub fn new(set_id: impl Into<String>) -> Self {
        Self::with_timestamp(set_id, Utc::now())
    }

    /// Create a record with a specific timestamp (for testing).
    pub fn with_timestamp(set_id: impl Into<String>, ts: DateTime<Utc>) -> Self {
        Self {
            v: COMPLETION_SCHEMA_VERSION,
            ts,
            set_id: set_id.into(),
            status: CompletionStatus::Completed,
        }
    }
}

// =============================================================================
// Stage controller
// =============================================================================

/// Outcome of applying a correct Final-stage answer.
enum FinalStep {
    Duplicate,
    MoreNeeded(usize),
    KeyDone,
    SessionDone,
}

/// Short-lived controller over one session's mutable state.
///
/// Borrow it for a single operation; all stage transitions and gate/ledger
/// updates go through here.
#[derive(Debug)]
pub struct StageController<'a> {
    /// The stage state being driven.
    stage: &'a mut StageState,
    /// Quiz-stage mastery ledger.
    ledger: &'a mut DifficultyLedger,
    /// Review lockout shared by Quiz and Final.
    gate: &'a mut ReviewGate,
    /// The knowledge set under drill.
    set: &'a KnowledgeSet,
}

impl<'a> StageController<'a> {
    /// Create a controller over the session's parts.
    pub fn new(
        stage: &'a mut StageState,
        ledger: &'a mut DifficultyLedger,
        gate: &'a mut ReviewGate,
        set: &'a KnowledgeSet,
    ) -> Self {
        Self {
            stage,
            ledger,
            gate,
            set,
        }
    }

    /// The key a submission would be checked against, if any.
    pub fn current_key(&self) -> Option<&str> {
        self.stage.current_key()
    }

    /// Submit a candidate answer at `now`.
    ///
    /// Valid only in Quiz and Final; Practice and Complete reject the call
    /// as an invalid state. Gate and blank checks run before any
    /// correctness bookkeeping, so a locked-out or empty submission never
    /// touches the ledger.
    pub fn submit(&mut self, candidate: &str, now: DateTime<Utc>) -> Result<Feedback> {
        match self.stage.stage() {
            Stage::Practice => {
                return Err(RoteError::invalid_state(
                    "answers are not checked during practice",
                ));
            }
            Stage::Complete => {
                return Err(RoteError::invalid_state(
                    "session is complete; start a new session to drill again",
                ));
            }
            Stage::Quiz | Stage::Final => {}
        }

        if self.gate.poll(now) {
            return Ok(Feedback::GateActive {
                remaining_secs: self.gate.remaining_secs(now),
                reason: GateReason::LockoutActive,
            });
        }
        if matcher::is_blank(candidate) {
            return Ok(Feedback::BlankInput);
        }

        if self.stage.stage() == Stage::Quiz {
            self.submit_quiz(candidate, now)
        } else {
            self.submit_final(candidate, now)
        }
    }

    /// Manually advance Practice → Quiz.
    ///
    /// Quiz and Final advance themselves by completing keys; Complete is
    /// terminal. All three reject the call.
    pub fn advance(&mut self) -> Result<Feedback> {
        match self.stage.stage() {
            Stage::Practice => {
                *self.stage = StageState::enter_quiz(self.set, self.ledger);
                Ok(Feedback::StageAdvanced {
                    stage: self.stage.stage(),
                })
            }
            Stage::Quiz => Err(RoteError::invalid_state(
                "the quiz advances by completing keys",
            )),
            Stage::Final => Err(RoteError::invalid_state(
                "the final review advances by completing keys in order",
            )),
            Stage::Complete => Err(RoteError::invalid_state("session is complete")),
        }
    }

    // -------------------------------------------------------------------------
    // Quiz
    // -------------------------------------------------------------------------

    fn submit_quiz(&mut self, candidate: &str, now: DateTime<Utc>) -> Result<Feedback> {
        let key = match &*self.stage {
            StageState::Quiz { current, .. } => current.clone(),
            _ => return Err(RoteError::invalid_state("not in the quiz stage")),
        };
        let accepted = self.set.accepted(&key).ok_or_else(|| {
            RoteError::invalid_state(format!("quiz key '{}' is not in the knowledge set", key))
        })?;

        match self.ledger.submit(&key, candidate, accepted) {
            LedgerOutcome::Wrong {
                review_requested: true,
            } => {
                self.gate.activate(now);
                Ok(Feedback::GateActive {
                    remaining_secs: self.gate.remaining_secs(now),
                    reason: GateReason::RepeatedMisses,
                })
            }
            LedgerOutcome::Wrong {
                review_requested: false,
            } => Ok(Feedback::Wrong),
            LedgerOutcome::DuplicateCorrect => Ok(Feedback::DuplicateCorrect),
            LedgerOutcome::CorrectMoreNeeded { remaining } => {
                Ok(Feedback::CorrectMoreNeeded { remaining })
            }
            LedgerOutcome::KeyCompleted => {
                self.advance_quiz_key();
                Ok(Feedback::KeyCompleted)
            }
        }
    }

    /// Draw the next quiz key, or fall through to Final when the queue is
    /// drained. The completing submission still answers `KeyCompleted`;
    /// the new stage is observable through `current_stage`.
    fn advance_quiz_key(&mut self) {
        let drained = match &mut *self.stage {
            StageState::Quiz { queue, current } => match draw_random(queue) {
                Some(next) => {
                    *current = next;
                    false
                }
                None => true,
            },
            _ => false,
        };
        if drained {
            *self.stage = StageState::enter_final(self.set);
        }
    }

    // -------------------------------------------------------------------------
    // Final
    // -------------------------------------------------------------------------

    fn submit_final(&mut self, candidate: &str, now: DateTime<Utc>) -> Result<Feedback> {
        let key = match &*self.stage {
            StageState::Final { order, cursor, .. } => match order.get(*cursor) {
                Some(key) => key.clone(),
                None => {
                    return Err(RoteError::invalid_state("final cursor is out of range"));
                }
            },
            _ => return Err(RoteError::invalid_state("not in the final stage")),
        };
        let accepted = self.set.accepted(&key).ok_or_else(|| {
            RoteError::invalid_state(format!("final key '{}' is not in the knowledge set", key))
        })?;

        if !matcher::matches(candidate, accepted) {
            return Ok(self.final_miss(now));
        }

        let normalized = matcher::normalize(candidate);
        let needed = normalized_value_count(accepted);

        let step = match &mut *self.stage {
            StageState::Final {
                order,
                cursor,
                supplied,
                wrong_streak,
            } => {
                *wrong_streak = 0;
                if !supplied.insert(normalized) {
                    FinalStep::Duplicate
                } else if supplied.len() >= needed {
                    *cursor += 1;
                    supplied.clear();
                    if *cursor >= order.len() {
                        FinalStep::SessionDone
                    } else {
                        FinalStep::KeyDone
                    }
                } else {
                    FinalStep::MoreNeeded(needed - supplied.len())
                }
            }
            _ => return Err(RoteError::invalid_state("not in the final stage")),
        };

        Ok(match step {
            FinalStep::Duplicate => Feedback::DuplicateCorrect,
            FinalStep::MoreNeeded(remaining) => Feedback::CorrectMoreNeeded { remaining },
            FinalStep::KeyDone => Feedback::KeyCompleted,
            FinalStep::SessionDone => {
                *self.stage = StageState::Complete;
                Feedback::SessionComplete {
                    record: CompletionRecord::with_timestamp(&self.set.id, now),
                }
            }
        })
    }

    /// Apply a Final-stage miss: full restart to the first key, and the
    /// same every-third-miss pause as the quiz. The restart happens even
    /// when the pause fires.
    fn final_miss(&mut self, now: DateTime<Utc>) -> Feedback {
        let pause = match &mut *self.stage {
            StageState::Final {
                cursor,
                supplied,
                wrong_streak,
                ..
            } => {
                *cursor = 0;
                supplied.clear();
                *wrong_streak += 1;
                if *wrong_streak >= REVIEW_TRIGGER_STREAK {
                    *wrong_streak = 0;
                    true
                } else {
                    false
                }
            }
            _ => false,
        };

        if pause {
            self.gate.activate(now);
            Feedback::GateActive {
                remaining_secs: self.gate.remaining_secs(now),
                reason: GateReason::RepeatedMisses,
            }
        } else {
            Feedback::Wrong
        }
    }

    // -------------------------------------------------------------------------
    // Practice
    // -------------------------------------------------------------------------

    /// Move one window forward, clamping at the last window.
    pub fn practice_next(&mut self) -> Result<()> {
        let count = self.practice_window_count();
        match &mut *self.stage {
            StageState::Practice { window } => {
                if *window + 1 < count {
                    *window += 1;
                }
                Ok(())
            }
            _ => Err(RoteError::invalid_state(
                "window navigation is a practice-stage operation",
            )),
        }
    }

    /// Move one window back, clamping at the first window.
    pub fn practice_prev(&mut self) -> Result<()> {
        match &mut *self.stage {
            StageState::Practice { window } => {
                *window = window.saturating_sub(1);
                Ok(())
            }
            _ => Err(RoteError::invalid_state(
                "window navigation is a practice-stage operation",
            )),
        }
    }

    /// The pairs visible in the current Practice window.
    pub fn practice_view(&self) -> Result<PracticeView> {
        match &*self.stage {
            StageState::Practice { window } => {
                let entries = self
                    .set
                    .ordered_keys()
                    .into_iter()
                    .skip(window * PRACTICE_WINDOW_SIZE)
                    .take(PRACTICE_WINDOW_SIZE)
                    .map(|key| PracticeEntry {
                        key: key.clone(),
                        values: self
                            .set
                            .accepted(key)
                            .map(|values| values.iter().cloned().collect())
                            .unwrap_or_default(),
                    })
                    .collect();
                Ok(PracticeView {
                    window: *window,
                    window_count: self.practice_window_count(),
                    entries,
                })
            }
            _ => Err(RoteError::invalid_state(
                "the pair browser is a practice-stage operation",
            )),
        }
    }

    fn practice_window_count(&self) -> usize {
        self.set.key_count().div_ceil(PRACTICE_WINDOW_SIZE)
    }
}

/// One Practice window of pairs, ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PracticeView {
    /// Current window index (0-based).
    pub window: usize,
    /// Total number of windows.
    pub window_count: usize,
    /// The visible pairs, in canonical key order.
    pub entries: Vec<PracticeEntry>,
}

/// A single key and its accepted values, as shown during Practice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PracticeEntry {
    pub key: String,
    pub values: Vec<String>,
}
