//! Results command for Rote.
//!
//! Lists completion records from the append-only history log, newest first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::CompletionRecord;
use crate::storage::CompletionLog;

/// Options for the results command.
#[derive(Debug, Clone, Default)]
pub struct ResultsOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Maximum number of records to show.
    pub limit: usize,
}

/// One completion for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSummary {
    /// Set id that was completed.
    pub set_id: String,
    /// When the session completed.
    pub completed_at: DateTime<Utc>,
}

impl From<&CompletionRecord> for ResultSummary {
    fn from(record: &CompletionRecord) -> Self {
        Self {
            set_id: record.set_id.clone(),
            completed_at: record.ts,
        }
    }
}

/// Output format for the results command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// Completions, newest first.
    pub results: Vec<ResultSummary>,
    /// Total count of records returned.
    pub count: usize,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResultsOutput {
    /// Create a successful output.
    pub fn success(results: Vec<ResultSummary>) -> Self {
        let count = results.len();
        Self {
            success: true,
            results,
            count,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            results: vec![],
            count: 0,
            error: Some(error.into()),
        }
    }

    /// Format as human-readable text.
    pub fn format_text(&self) -> String {
        if !self.success {
            return format!(
                "Results failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            );
        }

        if self.results.is_empty() {
            return "No completed sessions yet.".to_string();
        }

        let mut lines = vec![format!("Completed sessions ({} shown):", self.count)];
        lines.push(String::new());

        for result in &self.results {
            lines.push(format!(
                "  {}  {}",
                result.completed_at.format("%Y-%m-%d %H:%M:%S UTC"),
                result.set_id
            ));
        }

        lines.join("\n")
    }
}

/// The results command implementation.
pub struct ResultsCommand<L: CompletionLog> {
    log: L,
}

impl<L: CompletionLog> ResultsCommand<L> {
    /// Create a new results command.
    pub fn new(log: L) -> Self {
        Self { log }
    }

    /// Run the results command.
    pub fn run(&self, options: &ResultsOptions) -> ResultsOutput {
        match self.log.history(options.limit) {
            Ok(records) => {
                let results: Vec<ResultSummary> =
                    records.iter().map(ResultSummary::from).collect();
                ResultsOutput::success(results)
            }
            Err(e) => ResultsOutput::failure(format!("Failed to read completion history: {}", e)),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ResultsOutput, options: &ResultsOptions) -> String {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryCompletionLog;
    use chrono::Duration;
    use std::sync::Arc;

    fn record_at(set_id: &str, offset_secs: i64) -> CompletionRecord {
        CompletionRecord::with_timestamp(set_id, Utc::now() + Duration::seconds(offset_secs))
    }

    fn create_test_log() -> Arc<MemoryCompletionLog> {
        let log = Arc::new(MemoryCompletionLog::new());
        log.record(&record_at("fruit", 0)).unwrap();
        log.record(&record_at("capitals", 10)).unwrap();
        log.record(&record_at("fruit", 20)).unwrap();
        log
    }

    #[test]
    fn test_results_empty() {
        let cmd = ResultsCommand::new(Arc::new(MemoryCompletionLog::new()));
        let options = ResultsOptions {
            limit: 10,
            ..Default::default()
        };

        let output = cmd.run(&options);
        assert!(output.success);
        assert_eq!(output.count, 0);
        assert!(output.format_text().contains("No completed sessions"));
    }

    #[test]
    fn test_results_newest_first() {
        let cmd = ResultsCommand::new(create_test_log());
        let options = ResultsOptions {
            limit: 10,
            ..Default::default()
        };

        let output = cmd.run(&options);
        assert!(output.success);
        assert_eq!(output.count, 3);
        assert_eq!(output.results[0].set_id, "fruit");
        assert_eq!(output.results[1].set_id, "capitals");
    }

    #[test]
    fn test_results_respects_limit() {
        let cmd = ResultsCommand::new(create_test_log());
        let options = ResultsOptions {
            limit: 2,
            ..Default::default()
        };

        let output = cmd.run(&options);
        assert_eq!(output.count, 2);
    }

    #[test]
    fn test_results_format_text() {
        let output = ResultsOutput::success(vec![ResultSummary {
            set_id: "fruit".to_string(),
            completed_at: Utc::now(),
        }]);
        let text = output.format_text();

        assert!(text.contains("Completed sessions"));
        assert!(text.contains("fruit"));
        assert!(text.contains("UTC"));
    }
}
