//! Core types and logic for Rote.
//!
//! This module contains the fundamental types for the drill engine: answer
//! matching, knowledge sets, the adaptive mastery ledger, the review gate,
//! the stage state machine, and the session facade that ties them together.

pub mod gate;
pub mod knowledge;
pub mod ledger;
pub mod matcher;
pub mod session;
pub mod stage;

pub use gate::{ReviewGate, REVIEW_PAUSE_SECS};
pub use knowledge::KnowledgeSet;
pub use ledger::{
    DifficultyLedger, KeyProgress, LedgerOutcome, INITIAL_REQUIRED_CORRECT, REVIEW_TRIGGER_STREAK,
};
pub use session::{ProgressSummary, QuizSession};
pub use stage::{
    CompletionRecord, CompletionStatus, Feedback, GateReason, PracticeEntry, PracticeView, Stage,
    StageController, StageState, COMPLETION_SCHEMA_VERSION, PRACTICE_WINDOW_SIZE,
};
