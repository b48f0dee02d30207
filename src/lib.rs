//! Rote - Adaptive recall drill over key-value knowledge sets
//!
//! Rote drills stored key→values pairs through three stages: Practice
//! (browse the pairs), Quiz (random order, per-key thresholds that double on
//! repeated misses), and Final (full coverage in fixed order, restarting on
//! any miss). Three consecutive misses pause answering behind a timed review
//! gate. Completions are appended to a local history log.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod storage;
pub mod suggest;
pub mod util;

pub use config::Config;
pub use core::{
    CompletionRecord, DifficultyLedger, Feedback, KnowledgeSet, ProgressSummary, QuizSession,
    ReviewGate, Stage, StageState,
};
pub use error::{Result, RoteError};
pub use storage::{
    CompletionLog, FileCompletionLog, FileSetStore, MemoryCompletionLog, MemorySetStore, SetStore,
};
pub use suggest::{SuggestionProvider, WordListProvider};

// CLI commands
pub use cli::{
    BuildCommand, DropCommand, EditCommand, InitCommand, ResultsCommand, RunCommand, SetsCommand,
    ShowCommand,
};
