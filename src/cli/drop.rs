//! Drop command for Rote.
//!
//! Deletes a stored knowledge set. Deletion is permanent, so the command
//! refuses to act unless `--force` is passed.

use serde::{Deserialize, Serialize};

use crate::storage::SetStore;

/// Options for the drop command.
#[derive(Debug, Clone, Default)]
pub struct DropOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Set id to delete.
    pub set_id: String,
    /// Actually delete. Without this the command only explains itself.
    pub force: bool,
}

/// Output format for the drop command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// Set id the command operated on.
    pub set_id: String,
    /// Whether a set was actually deleted.
    pub deleted: bool,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DropOutput {
    /// Create a successful output.
    pub fn success(set_id: impl Into<String>) -> Self {
        Self {
            success: true,
            set_id: set_id.into(),
            deleted: true,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(set_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            set_id: set_id.into(),
            deleted: false,
            error: Some(error.into()),
        }
    }

    /// Format as human-readable text.
    pub fn format_text(&self) -> String {
        if self.success {
            format!("Deleted set '{}'.", self.set_id)
        } else {
            format!(
                "Drop failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}

/// The drop command implementation.
pub struct DropCommand<S: SetStore> {
    store: S,
}

impl<S: SetStore> DropCommand<S> {
    /// Create a new drop command.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Run the drop command.
    pub fn run(&self, options: &DropOptions) -> DropOutput {
        if !options.force {
            return DropOutput::failure(
                &options.set_id,
                format!(
                    "Refusing to delete set '{}' without --force",
                    options.set_id
                ),
            );
        }

        match self.store.exists(&options.set_id) {
            Ok(false) => {
                return DropOutput::failure(
                    &options.set_id,
                    format!("Set '{}' not found", options.set_id),
                );
            }
            Ok(true) => {}
            Err(e) => {
                return DropOutput::failure(
                    &options.set_id,
                    format!("Failed to check set '{}': {}", options.set_id, e),
                );
            }
        }

        match self.store.delete(&options.set_id) {
            Ok(()) => DropOutput::success(&options.set_id),
            Err(e) => DropOutput::failure(
                &options.set_id,
                format!("Failed to delete set '{}': {}", options.set_id, e),
            ),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &DropOutput, options: &DropOptions) -> String {
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
