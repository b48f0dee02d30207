//! Sets command for Rote.
//!
//! Lists stored knowledge sets with their key and value counts, useful for
//! finding set ids to pass to `rote run` and `rote show`.

use serde::{Deserialize, Serialize};

use crate::core::KnowledgeSet;
use crate::error::Result;
use crate::storage::SetStore;

/// Options for the sets command.
#[derive(Debug, Clone, Default)]
pub struct SetsOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Maximum number of sets to show.
    pub limit: usize,
}

/// Summary of a single knowledge set for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetSummary {
    /// Set id.
    pub id: String,
    /// Number of keys.
    pub keys: usize,
    /// Total number of accepted values.
    pub values: usize,
}

impl From<&KnowledgeSet> for SetSummary {
    fn from(set: &KnowledgeSet) -> Self {
        Self {
            id: set.id.clone(),
            keys: set.key_count(),
            values: set.value_count(),
        }
    }
}

/// Output format for the sets command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetsOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// List of set summaries.
    pub sets: Vec<SetSummary>,
    /// Total count of sets returned.
    pub count: usize,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SetsOutput {
    /// Create a successful output.
    pub fn success(sets: Vec<SetSummary>) -> Self {
        let count = sets.len();
        Self {
            success: true,
            sets,
            count,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            sets: vec![],
            count: 0,
            error: Some(error.into()),
        }
    }

    /// Format as human-readable text.
    pub fn format_text(&self) -> String {
        if !self.success {
            return format!(
                "Sets failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            );
        }

        if self.sets.is_empty() {
            return "No sets found. Create one with `rote build`.".to_string();
        }

        let mut lines = vec![format!("Sets ({} found):", self.count)];
        lines.push(String::new());

        // Header
        lines.push(format!("{:<24}  {:>5}  {:>7}", "ID", "KEYS", "VALUES"));
        lines.push("-".repeat(40));

        for set in &self.sets {
            lines.push(format!("{:<24}  {:>5}  {:>7}", set.id, set.keys, set.values));
        }

        lines.join("\n")
    }
}

/// The sets command implementation.
pub struct SetsCommand<S: SetStore> {
    store: S,
}

impl<S: SetStore> SetsCommand<S> {
    /// Create a new sets command.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Run the sets command.
    pub fn run(&self, options: &SetsOptions) -> SetsOutput {
        match self.list_sets(options.limit) {
            Ok(sets) => {
                let summaries: Vec<SetSummary> = sets.iter().map(SetSummary::from).collect();
                SetsOutput::success(summaries)
            }
            Err(e) => SetsOutput::failure(format!("Failed to list sets: {}", e)),
        }
    }

    /// List sets from the store.
    fn list_sets(&self, limit: usize) -> Result<Vec<KnowledgeSet>> {
        self.store.list(limit)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &SetsOutput, options: &SetsOptions) -> String {
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
    use crate::core::knowledge::tests::{entry, sample_set};
    use crate::storage::MemorySetStore;
    use std::sync::Arc;

    fn create_test_store() -> Arc<MemorySetStore> {
        Arc::new(MemorySetStore::new())
    }

    #[test]
    fn test_sets_empty() {
        let store = create_test_store();
        let cmd = SetsCommand::new(store);
        let options = SetsOptions {
            limit: 10,
            ..Default::default()
        };

        let output = cmd.run(&options);
        assert!(output.success);
        assert_eq!(output.count, 0);
        assert!(output.sets.is_empty());
    }

    #[test]
    fn test_sets_with_data() {
        let store = create_test_store();
        store.save(&sample_set()).unwrap();
        store
            .save(&KnowledgeSet::new("capitals", [entry("F", &["paris"])].into_iter().collect()).unwrap())
            .unwrap();

        let cmd = SetsCommand::new(store);
        let options = SetsOptions {
            limit: 10,
            ..Default::default()
        };

        let output = cmd.run(&options);
        assert!(output.success);
        assert_eq!(output.count, 2);
        // Most recently written first
        assert_eq!(output.sets[0].id, "capitals");
    }

    #[test]
    fn test_sets_respects_limit() {
        let store = create_test_store();
        for i in 0..5 {
            store
                .save(
                    &KnowledgeSet::new(
                        format!("set-{}", i),
                        [entry("A", &["a1"])].into_iter().collect(),
                    )
                    .unwrap(),
                )
                .unwrap();
        }

        let cmd = SetsCommand::new(store);
        let options = SetsOptions {
            limit: 3,
            ..Default::default()
        };

        let output = cmd.run(&options);
        assert!(output.success);
        assert_eq!(output.count, 3);
    }

    #[test]
    fn test_set_summary_counts() {
        let summary = SetSummary::from(&sample_set());
        assert_eq!(summary.id, "fruit");
        assert_eq!(summary.keys, 3);
        assert_eq!(summary.values, 5);
    }

    #[test]
    fn test_sets_output_format_text() {
        let output = SetsOutput::success(vec![SetSummary {
            id: "fruit".to_string(),
            keys: 3,
            values: 5,
        }]);
        let text = output.format_text();

        assert!(text.contains("fruit"));
        assert!(text.contains("KEYS"));
    }

    #[test]
    fn test_sets_output_empty_text() {
        let output = SetsOutput::success(vec![]);
        assert!(output.format_text().contains("No sets found"));
    }

    #[test]
    fn test_sets_output_failure() {
        let output = SetsOutput::failure("Test error");
        assert!(output.format_text().contains("Test error"));
    }
}
