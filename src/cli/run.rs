//! Run command for Rote.
//!
//! Drives one interactive drill session: Practice browsing with window
//! commands, then Quiz and Final answer prompts with per-submission
//! feedback. Answers come from any `BufRead` and prompts go to any `Write`,
//! so tests can script whole sessions through in-memory buffers.

use std::io::{BufRead, Write};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::core::{Feedback, GateReason, QuizSession, Stage};
use crate::error::{FailOpen, Result};
use crate::storage::{CompletionLog, SetStore};

/// Options for the run command.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Output the final summary as JSON.
    pub json: bool,
    /// Suppress the final summary.
    pub quiet: bool,
    /// Set id to drill.
    pub set_id: String,
    /// Sleep through review pauses, refreshing a countdown.
    pub wait: bool,
    /// Milliseconds between countdown refreshes when waiting.
    pub poll_interval_ms: u64,
}

/// Output format for the run command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// Set id the session ran over.
    pub set_id: String,
    /// Whether the session reached the Complete stage.
    pub completed: bool,
    /// Keys completed when the session ended.
    pub completed_keys: usize,
    /// Keys in the set.
    pub total_keys: usize,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunOutput {
    /// Create a failed output.
    pub fn failure(set_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            set_id: set_id.into(),
            completed: false,
            completed_keys: 0,
            total_keys: 0,
            error: Some(error.into()),
        }
    }

    /// Format as human-readable text.
    pub fn format_text(&self) -> String {
        if !self.success {
            format!(
                "Run failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            )
        } else if self.completed {
            format!(
                "Completed set '{}': {}/{} keys.",
                self.set_id, self.completed_keys, self.total_keys
            )
        } else {
            format!(
                "Stopped early in set '{}': {}/{} keys.",
                self.set_id, self.completed_keys, self.total_keys
            )
        }
    }
}

/// Prompt on `out`, then read one line. `None` means end of input.
fn read_line<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> Result<Option<String>> {
    write!(out, "{}", prompt)?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(out)?;
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// The run command implementation.
pub struct RunCommand<S: SetStore, L: CompletionLog> {
    store: S,
    log: L,
}

impl<S: SetStore, L: CompletionLog> RunCommand<S, L> {
    /// Create a new run command.
    pub fn new(store: S, log: L) -> Self {
        Self { store, log }
    }

    /// Run one session, reading answers from `input` and writing prompts and
    /// feedback to `out`.
    pub fn run<R: BufRead, W: Write>(
        &self,
        options: &RunOptions,
        input: &mut R,
        out: &mut W,
    ) -> RunOutput {
        match self.drive(options, input, out) {
            Ok(output) => output,
            Err(e) => RunOutput::failure(&options.set_id, format!("Session failed: {}", e)),
        }
    }

    fn drive<R: BufRead, W: Write>(
        &self,
        options: &RunOptions,
        input: &mut R,
        out: &mut W,
    ) -> Result<RunOutput> {
        let set = match self.store.load(&options.set_id)? {
            Some(set) => set,
            None => {
                return Ok(RunOutput::failure(
                    &options.set_id,
                    format!("Set '{}' not found", options.set_id),
                ));
            }
        };

        let mut session = QuizSession::new(set)?;
        writeln!(
            out,
            "Drilling '{}' ({} keys). Type :quit to stop.",
            options.set_id,
            session.set().key_count()
        )?;

        if !self.practice_loop(&mut session, input, out)? {
            return Ok(self.summarize(&session, false));
        }
        let completed = self.answer_loop(&mut session, options, input, out)?;
        Ok(self.summarize(&session, completed))
    }

    /// Practice stage: render the current window, apply window commands.
    /// Returns true once the user advances to Quiz, false on quit.
    fn practice_loop<R: BufRead, W: Write>(
        &self,
        session: &mut QuizSession,
        input: &mut R,
        out: &mut W,
    ) -> Result<bool> {
        loop {
            let view = session.practice_view()?;
            writeln!(out)?;
            writeln!(
                out,
                "Practice window {}/{}:",
                view.window + 1,
                view.window_count
            )?;
            for entry in &view.entries {
                writeln!(out, "  {}: {}", entry.key, entry.values.join(", "))?;
            }
            writeln!(out, "(:next, :back, :begin, :quit)")?;

            let line = match read_line(input, out, "practice> ")? {
                Some(line) => line,
                None => return Ok(false),
            };
            match line.trim() {
                ":next" => session.practice_next()?,
                ":back" => session.practice_prev()?,
                ":begin" => {
                    session.advance_stage()?;
                    return Ok(true);
                }
                ":quit" => return Ok(false),
                "" => {}
                other => writeln!(out, "Unknown command '{}'.", other)?,
            }
        }
    }

    /// Quiz and Final stages: prompt for answers until the session completes
    /// or the user quits. Returns true on completion.
    fn answer_loop<R: BufRead, W: Write>(
        &self,
        session: &mut QuizSession,
        options: &RunOptions,
        input: &mut R,
        out: &mut W,
    ) -> Result<bool> {
        writeln!(out)?;
        writeln!(out, "Quiz: give any accepted value for the key shown.")?;

        loop {
            let stage = session.current_stage();
            let key = match session.current_key() {
                Some(key) => key.to_string(),
                None => return Ok(stage.is_terminal()),
            };

            let prompt = format!("{} [{}]> ", stage, key);
            let line = match read_line(input, out, &prompt)? {
                Some(line) => line,
                None => return Ok(false),
            };
            if line.trim() == ":quit" {
                return Ok(false);
            }

            let feedback = session.submit_answer(&line)?;
            self.render_feedback(session, options, &feedback, stage, out)?;

            if let Feedback::SessionComplete { record } = &feedback {
                self.log
                    .record(record)
                    .fail_open_default("Recording completion");
                return Ok(true);
            }
        }
    }

    /// Write one line (or a short block) of feedback for a submission.
    fn render_feedback<W: Write>(
        &self,
        session: &QuizSession,
        options: &RunOptions,
        feedback: &Feedback,
        stage_before: Stage,
        out: &mut W,
    ) -> Result<()> {
        match feedback {
            Feedback::BlankInput => writeln!(out, "Enter a value, or :quit to stop.")?,
            Feedback::Wrong => {
                if stage_before == Stage::Final {
                    writeln!(out, "Wrong. Starting over from the first key.")?;
                } else {
                    writeln!(out, "Wrong.")?;
                }
            }
            Feedback::DuplicateCorrect => {
                writeln!(out, "Already given; a new value is needed.")?;
            }
            Feedback::CorrectMoreNeeded { remaining } => {
                writeln!(out, "Correct. {} more to go for this key.", remaining)?;
            }
            Feedback::KeyCompleted => {
                writeln!(out, "Key complete.")?;
                if stage_before == Stage::Quiz && session.current_stage() == Stage::Final {
                    writeln!(out)?;
                    writeln!(
                        out,
                        "Final review: every value for every key, in order. One miss restarts from the first key."
                    )?;
                }
            }
            Feedback::GateActive {
                remaining_secs,
                reason,
            } => {
                match reason {
                    GateReason::RepeatedMisses => writeln!(
                        out,
                        "Three misses in a row. Review the pairs; answers unlock in {}s.",
                        remaining_secs
                    )?,
                    GateReason::LockoutActive => {
                        writeln!(out, "Still locked for {}s.", remaining_secs)?;
                    }
                }
                if options.wait {
                    self.wait_for_gate(session, options, out)?;
                }
            }
            Feedback::StageAdvanced { stage } => writeln!(out, "Entering {}.", stage)?,
            Feedback::SessionComplete { .. } => {
                writeln!(out)?;
                writeln!(out, "All keys cleared. Session complete.")?;
            }
        }
        Ok(())
    }

    /// Sleep out an active gate, refreshing a one-line countdown.
    fn wait_for_gate<W: Write>(
        &self,
        session: &QuizSession,
        options: &RunOptions,
        out: &mut W,
    ) -> Result<()> {
        let interval = std::time::Duration::from_millis(options.poll_interval_ms.max(1));
        loop {
            match session.progress_summary_at(Utc::now()).gate_remaining_secs {
                Some(secs) => {
                    write!(out, "\r{:>3}s remaining...", secs)?;
                    out.flush()?;
                    std::thread::sleep(interval);
                }
                None => {
                    writeln!(out)?;
                    writeln!(out, "Unlocked. Carry on.")?;
                    return Ok(());
                }
            }
        }
    }

    fn summarize(&self, session: &QuizSession, completed: bool) -> RunOutput {
        let summary = session.progress_summary();
        RunOutput {
            success: true,
            set_id: session.set().id.clone(),
            completed,
            completed_keys: summary.completed_keys,
            total_keys: summary.total_keys,
            error: None,
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &RunOutput, options: &RunOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            output.format_text()
        }
    }
}
