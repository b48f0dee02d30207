//! Show command for Rote.
//!
//! Prints one knowledge set in full: every key with its accepted values, in
//! the same canonical order the Final stage walks them.

use serde::{Deserialize, Serialize};

use crate::core::KnowledgeSet;
use crate::storage::SetStore;

/// Options for the show command.
#[derive(Debug, Clone, Default)]
pub struct ShowOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Set id to show.
    pub set_id: String,
}

/// One key with its accepted values, in display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowEntry {
    /// Key text.
    pub key: String,
    /// Accepted values for the key.
    pub values: Vec<String>,
}

/// Output format for the show command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// Set id.
    pub set_id: String,
    /// Number of keys.
    pub keys: usize,
    /// Total number of accepted values.
    pub values: usize,
    /// Entries in canonical order.
    pub entries: Vec<ShowEntry>,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ShowOutput {
    /// Create a successful output from a loaded set.
    pub fn success(set: &KnowledgeSet) -> Self {
        let entries = set
            .ordered_keys()
            .into_iter()
            .map(|key| ShowEntry {
                key: key.clone(),
                values: set
                    .accepted(key)
                    .map(|v| v.iter().cloned().collect())
                    .unwrap_or_default(),
            })
            .collect();

        Self {
            success: true,
            set_id: set.id.clone(),
            keys: set.key_count(),
            values: set.value_count(),
            entries,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(set_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            set_id: set_id.into(),
            keys: 0,
            values: 0,
            entries: vec![],
            error: Some(error.into()),
        }
    }

    /// Format as human-readable text.
    pub fn format_text(&self) -> String {
        if !self.success {
            return format!(
                "Show failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut lines = vec![format!(
            "{} ({} keys, {} values)",
            self.set_id, self.keys, self.values
        )];
        lines.push(String::new());

        for entry in &self.entries {
            lines.push(format!("  {}: {}", entry.key, entry.values.join(", ")));
        }

        lines.join("\n")
    }
}

/// The show command implementation.
pub struct ShowCommand<S: SetStore> {
    store: S,
}

impl<S: SetStore> ShowCommand<S> {
    /// Create a new show command.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Run the show command.
    pub fn run(&self, options: &ShowOptions) -> ShowOutput {
        match self.store.load(&options.set_id) {
            Ok(Some(set)) => ShowOutput::success(&set),
            Ok(None) => ShowOutput::failure(
                &options.set_id,
                format!("Set '{}' not found", options.set_id),
            ),
            Err(e) => ShowOutput::failure(
                &options.set_id,
                format!("Failed to load set '{}': {}", options.set_id, e),
            ),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ShowOutput, options: &ShowOptions) -> String {
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
