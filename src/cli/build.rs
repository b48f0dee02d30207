//! Build command for Rote.
//!
//! Creates a knowledge set by asking a suggestion provider for candidate
//! values for every letter A through Z. Letters with no usable candidates are
//! left out; the result is validated and saved like any other set.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::core::KnowledgeSet;
use crate::storage::SetStore;
use crate::suggest::SuggestionProvider;

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Id for the new set.
    pub set_id: String,
    /// Replace the set if it already exists.
    pub force: bool,
    /// Maximum accepted values per key.
    pub values_per_key: usize,
}

/// Output format for the build command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// Set id the command operated on.
    pub set_id: String,
    /// Provider the candidates came from.
    pub provider: String,
    /// Number of keys in the built set.
    pub keys: usize,
    /// Total number of accepted values in the built set.
    pub values: usize,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BuildOutput {
    /// Create a successful output.
    pub fn success(
        set_id: impl Into<String>,
        provider: impl Into<String>,
        keys: usize,
        values: usize,
    ) -> Self {
        Self {
            success: true,
            set_id: set_id.into(),
            provider: provider.into(),
            keys,
            values,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(set_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            set_id: set_id.into(),
            provider: String::new(),
            keys: 0,
            values: 0,
            error: Some(error.into()),
        }
    }

    /// Format as human-readable text.
    pub fn format_text(&self) -> String {
        if self.success {
            format!(
                "Built set '{}' from {}: {} keys, {} values.",
                self.set_id, self.provider, self.keys, self.values
            )
        } else {
            format!(
                "Build failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}

/// True if the id is safe to use as a storage file stem.
fn is_valid_set_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !id.starts_with('.')
}

/// The build command implementation.
pub struct BuildCommand<S: SetStore, P: SuggestionProvider> {
    store: S,
    provider: P,
}

impl<S: SetStore, P: SuggestionProvider> BuildCommand<S, P> {
    /// Create a new build command.
    pub fn new(store: S, provider: P) -> Self {
        Self { store, provider }
    }

    /// Run the build command.
    pub fn run(&self, options: &BuildOptions) -> BuildOutput {
        if !is_valid_set_id(&options.set_id) {
            return BuildOutput::failure(
                &options.set_id,
                format!(
                    "Invalid set id '{}': use letters, digits, '-', '_' or '.'",
                    options.set_id
                ),
            );
        }
        if options.values_per_key == 0 {
            return BuildOutput::failure(&options.set_id, "values-per-key must be at least 1");
        }

        match self.store.exists(&options.set_id) {
            Ok(true) if !options.force => {
                return BuildOutput::failure(
                    &options.set_id,
                    format!(
                        "Set '{}' already exists (use --force to replace)",
                        options.set_id
                    ),
                );
            }
            Ok(_) => {}
            Err(e) => {
                return BuildOutput::failure(
                    &options.set_id,
                    format!("Failed to check set '{}': {}", options.set_id, e),
                );
            }
        }

        let mut entries: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for letter in 'A'..='Z' {
            let key = letter.to_string();
            let candidates = match self.provider.suggest(&key, options.values_per_key) {
                Ok(candidates) => candidates,
                Err(e) => {
                    return BuildOutput::failure(
                        &options.set_id,
                        format!("Provider '{}' failed for '{}': {}", self.provider.name(), key, e),
                    );
                }
            };
            if !candidates.is_empty() {
                entries.insert(key, candidates.into_iter().collect());
            }
        }

        if entries.is_empty() {
            return BuildOutput::failure(
                &options.set_id,
                format!(
                    "Provider '{}' produced no usable candidates",
                    self.provider.name()
                ),
            );
        }

        let set = match KnowledgeSet::new(&options.set_id, entries) {
            Ok(set) => set,
            Err(e) => return BuildOutput::failure(&options.set_id, format!("Invalid set: {}", e)),
        };

        if let Err(e) = self.store.save(&set) {
            return BuildOutput::failure(
                &options.set_id,
                format!("Failed to save set '{}': {}", options.set_id, e),
            );
        }

        BuildOutput::success(
            &options.set_id,
            self.provider.name(),
            set.key_count(),
            set.value_count(),
        )
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &BuildOutput, options: &BuildOptions) -> String {
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
