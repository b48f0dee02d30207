//! Edit command for Rote.
//!
//! Adds, replaces, or removes a single key in a stored knowledge set. The
//! edited set is re-validated before it is written back, so an edit can
//! never leave a malformed set on disk.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::storage::SetStore;

/// Options for the edit command.
#[derive(Debug, Clone, Default)]
pub struct EditOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Set id to edit.
    pub set_id: String,
    /// Key to add, replace, or remove.
    pub key: String,
    /// Accepted values for the key. Ignored with `remove_key`.
    pub values: Vec<String>,
    /// Remove the key instead of writing values.
    pub remove_key: bool,
}

/// Output format for the edit command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// Set id the command operated on.
    pub set_id: String,
    /// Key the command operated on.
    pub key: String,
    /// What happened to the key: "added", "replaced", or "removed".
    pub action: String,
    /// Number of keys in the set after the edit.
    pub keys: usize,
    /// Total number of accepted values after the edit.
    pub values: usize,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EditOutput {
    /// Create a successful output.
    pub fn success(
        set_id: impl Into<String>,
        key: impl Into<String>,
        action: &str,
        keys: usize,
        values: usize,
    ) -> Self {
        Self {
            success: true,
            set_id: set_id.into(),
            key: key.into(),
            action: action.to_string(),
            keys,
            values,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(
        set_id: impl Into<String>,
        key: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            set_id: set_id.into(),
            key: key.into(),
            action: String::new(),
            keys: 0,
            values: 0,
            error: Some(error.into()),
        }
    }

    /// Format as human-readable text.
    pub fn format_text(&self) -> String {
        if self.success {
            format!(
                "Key '{}' {} in set '{}' ({} keys, {} values).",
                self.key, self.action, self.set_id, self.keys, self.values
            )
        } else {
            format!(
                "Edit failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}

/// The edit command implementation.
pub struct EditCommand<S: SetStore> {
    store: S,
}

impl<S: SetStore> EditCommand<S> {
    /// Create a new edit command.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Run the edit command.
    pub fn run(&self, options: &EditOptions) -> EditOutput {
        let mut set = match self.store.load(&options.set_id) {
            Ok(Some(set)) => set,
            Ok(None) => {
                return EditOutput::failure(
                    &options.set_id,
                    &options.key,
                    format!("Set '{}' not found", options.set_id),
                );
            }
            Err(e) => {
                return EditOutput::failure(
                    &options.set_id,
                    &options.key,
                    format!("Failed to load set '{}': {}", options.set_id, e),
                );
            }
        };

        let action = if options.remove_key {
            if !set.entries.contains_key(&options.key) {
                return EditOutput::failure(
                    &options.set_id,
                    &options.key,
                    format!(
                        "Key '{}' not found in set '{}'",
                        options.key, options.set_id
                    ),
                );
            }
            if set.entries.len() == 1 {
                return EditOutput::failure(
                    &options.set_id,
                    &options.key,
                    format!(
                        "Removing key '{}' would leave set '{}' empty",
                        options.key, options.set_id
                    ),
                );
            }
            set.entries.remove(&options.key);
            "removed"
        } else {
            let values: BTreeSet<String> = options
                .values
                .iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect();
            if values.is_empty() {
                return EditOutput::failure(
                    &options.set_id,
                    &options.key,
                    format!("No values given for key '{}'", options.key),
                );
            }

            let replaced = set.entries.insert(options.key.clone(), values).is_some();
            if replaced {
                "replaced"
            } else {
                "added"
            }
        };

        // Saving re-validates, so a blank key is rejected here rather than
        // poisoning the stored set.
        if let Err(e) = self.store.save(&set) {
            return EditOutput::failure(
                &options.set_id,
                &options.key,
                format!("Failed to save set '{}': {}", options.set_id, e),
            );
        }

        EditOutput::success(
            &options.set_id,
            &options.key,
            action,
            set.key_count(),
            set.value_count(),
        )
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &EditOutput, options: &EditOptions) -> String {
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
