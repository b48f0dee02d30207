//! Session facade.
//!
//! [`QuizSession`] owns everything one drill needs: the knowledge set, the
//! stage state, the mastery ledger, and the review gate. Callers drive it
//! through a handful of methods and render the [`Feedback`] they get back;
//! each mutating call internally assembles a [`StageController`] for the
//! duration of that call.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::gate::ReviewGate;
use crate::core::knowledge::KnowledgeSet;
use crate::core::ledger::DifficultyLedger;
use crate::core::stage::{Feedback, PracticeView, Stage, StageController, StageState};
use crate::error::Result;

/// One in-progress drill over a knowledge set.
#[derive(Debug, Clone)]
pub struct QuizSession {
    set: KnowledgeSet,
    stage: StageState,
    ledger: DifficultyLedger,
    gate: ReviewGate,
}

impl QuizSession {
    /// Start a fresh session in the first Practice window.
    ///
    /// The set is validated up front; a session over an invalid set never
    /// exists.
    pub fn new(set: KnowledgeSet) -> Result<Self> {
        set.validate()?;
        Ok(Self {
            set,
            stage: StageState::default(),
            ledger: DifficultyLedger::new(),
            gate: ReviewGate::new(),
        })
    }

    /// The knowledge set under drill.
    pub fn set(&self) -> &KnowledgeSet {
        &self.set
    }

    /// The stage the session is currently in.
    pub fn current_stage(&self) -> Stage {
        self.stage.stage()
    }

    /// The key a submission would be checked against, if any.
    pub fn current_key(&self) -> Option<&str> {
        self.stage.current_key()
    }

    /// Submit a candidate answer, stamped with the current time.
    pub fn submit_answer(&mut self, candidate: &str) -> Result<Feedback> {
        self.submit_answer_at(candidate, Utc::now())
    }

    /// Submit a candidate answer at a specific time (for testing).
    pub fn submit_answer_at(&mut self, candidate: &str, now: DateTime<Utc>) -> Result<Feedback> {
        self.controller().submit(candidate, now)
    }

    /// Manually advance Practice → Quiz.
    pub fn advance_stage(&mut self) -> Result<Feedback> {
        self.controller().advance()
    }

    /// Move the Practice window forward.
    pub fn practice_next(&mut self) -> Result<()> {
        self.controller().practice_next()
    }

    /// Move the Practice window back.
    pub fn practice_prev(&mut self) -> Result<()> {
        self.controller().practice_prev()
    }

    /// The pairs visible in the current Practice window.
    pub fn practice_view(&mut self) -> Result<PracticeView> {
        self.controller().practice_view()
    }

    /// Progress snapshot as of now.
    pub fn progress_summary(&self) -> ProgressSummary {
        self.progress_summary_at(Utc::now())
    }

    /// Progress snapshot at a specific time (for testing).
    pub fn progress_summary_at(&self, now: DateTime<Utc>) -> ProgressSummary {
        let total_keys = self.set.key_count();
        let completed_keys = match &self.stage {
            StageState::Practice { .. } => 0,
            StageState::Quiz { .. } => self.ledger.completed_count(),
            StageState::Final { cursor, .. } => *cursor,
            StageState::Complete => total_keys,
        };
        ProgressSummary {
            stage: self.stage.stage(),
            completed_keys,
            total_keys,
            active_key: self.stage.current_key().map(str::to_string),
            gate_remaining_secs: self
                .gate
                .is_active(now)
                .then(|| self.gate.remaining_secs(now)),
        }
    }

    fn controller(&mut self) -> StageController<'_> {
        StageController::new(&mut self.stage, &mut self.ledger, &mut self.gate, &self.set)
    }
}

/// Point-in-time progress of a session, ready for rendering.
///
/// During Final, `completed_keys` counts keys cleared in the current
/// attempt and drops back to zero on a restart.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProgressSummary {
    pub stage: Stage,
    pub completed_keys: usize,
    pub total_keys: usize,
    pub active_key: Option<String>,
    pub gate_remaining_secs: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gate::REVIEW_PAUSE_SECS;
    use crate::core::knowledge::tests::sample_set;
    use chrono::Duration;

    /// Feed the current key's accepted values until it completes, returning
    /// the final feedback.
    fn complete_current_key(session: &mut QuizSession, now: DateTime<Utc>) -> Feedback {
        let key = session.current_key().unwrap().to_string();
        let values: Vec<String> = session
            .set()
            .accepted(&key)
            .unwrap()
            .iter()
            .cloned()
            .collect();
        for value in values {
            match session.submit_answer_at(&value, now).unwrap() {
                Feedback::CorrectMoreNeeded { .. } | Feedback::DuplicateCorrect => continue,
                done => return done,
            }
        }
        panic!("key '{}' did not complete", key);
    }

    // =========================================================================
    // Construction
    // =========================================================================

    #[test]
    fn test_new_session_starts_in_practice() {
        let session = QuizSession::new(sample_set()).unwrap();
        assert_eq!(session.current_stage(), Stage::Practice);
        assert_eq!(session.current_key(), None);
    }

    #[test]
    fn test_new_session_rejects_invalid_set() {
        let mut set = sample_set();
        set.id = String::new();
        assert!(QuizSession::new(set).is_err());
    }

    // =========================================================================
    // Full walkthrough
    // =========================================================================

    #[test]
    fn test_session_runs_practice_to_complete() {
        let mut session = QuizSession::new(sample_set()).unwrap();
        let now = Utc::now();

        // Practice: browse, then begin.
        let view = session.practice_view().unwrap();
        assert_eq!(view.entries.len(), 3);
        assert_eq!(
            session.advance_stage().unwrap(),
            Feedback::StageAdvanced { stage: Stage::Quiz }
        );

        // Quiz: three keys at threshold one.
        for _ in 0..3 {
            assert_eq!(complete_current_key(&mut session, now), Feedback::KeyCompleted);
        }
        assert_eq!(session.current_stage(), Stage::Final);

        // Final: full coverage in canonical order, A then B then C.
        assert_eq!(session.current_key(), Some("A"));
        assert_eq!(complete_current_key(&mut session, now), Feedback::KeyCompleted);
        assert_eq!(session.current_key(), Some("B"));
        assert_eq!(complete_current_key(&mut session, now), Feedback::KeyCompleted);
        assert_eq!(session.current_key(), Some("C"));
        match complete_current_key(&mut session, now) {
            Feedback::SessionComplete { record } => assert_eq!(record.set_id, "fruit"),
            other => panic!("expected session completion, got {:?}", other),
        }
        assert_eq!(session.current_stage(), Stage::Complete);
    }

    // =========================================================================
    // Progress summaries
    // =========================================================================

    #[test]
    fn test_summary_tracks_quiz_completion() {
        let mut session = QuizSession::new(sample_set()).unwrap();
        let now = Utc::now();
        session.advance_stage().unwrap();

        let summary = session.progress_summary_at(now);
        assert_eq!(summary.stage, Stage::Quiz);
        assert_eq!(summary.completed_keys, 0);
        assert_eq!(summary.total_keys, 3);
        assert!(summary.active_key.is_some());
        assert_eq!(summary.gate_remaining_secs, None);

        complete_current_key(&mut session, now);
        assert_eq!(session.progress_summary_at(now).completed_keys, 1);
    }

    #[test]
    fn test_summary_reports_gate_remaining() {
        let mut session = QuizSession::new(sample_set()).unwrap();
        let now = Utc::now();
        session.advance_stage().unwrap();

        for _ in 0..3 {
            session.submit_answer_at("not a fruit", now).unwrap();
        }
        let summary = session.progress_summary_at(now + Duration::seconds(5));
        assert_eq!(summary.gate_remaining_secs, Some(REVIEW_PAUSE_SECS - 5));

        let summary = session.progress_summary_at(now + Duration::seconds(REVIEW_PAUSE_SECS));
        assert_eq!(summary.gate_remaining_secs, None);
    }

    #[test]
    fn test_summary_final_counts_reset_on_restart() {
        let mut session = QuizSession::new(sample_set()).unwrap();
        let now = Utc::now();
        session.advance_stage().unwrap();
        for _ in 0..3 {
            complete_current_key(&mut session, now);
        }

        complete_current_key(&mut session, now);
        assert_eq!(session.progress_summary_at(now).completed_keys, 1);

        session.submit_answer_at("not a fruit", now).unwrap();
        let summary = session.progress_summary_at(now);
        assert_eq!(summary.completed_keys, 0);
        assert_eq!(summary.active_key.as_deref(), Some("A"));
    }

    #[test]
    fn test_summary_complete_counts_everything() {
        let mut session = QuizSession::new(sample_set()).unwrap();
        let now = Utc::now();
        session.advance_stage().unwrap();
        for _ in 0..6 {
            if session.current_stage() == Stage::Complete {
                break;
            }
            complete_current_key(&mut session, now);
        }

        let summary = session.progress_summary_at(now);
        assert_eq!(summary.stage, Stage::Complete);
        assert_eq!(summary.completed_keys, 3);
        assert_eq!(summary.active_key, None);
    }
}
