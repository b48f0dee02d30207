//! Init command for Rote.
//!
//! Prepares a machine and project for drilling: creates the project `.rote/`
//! directory with a default `config.toml`, plus the per-user home directory
//! and sets directory. Safe to run repeatedly; existing paths are skipped.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{self, Config};

/// Options for the init command.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Rewrite the project config file even if it exists.
    pub force: bool,
}

/// Output format for the init command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// Paths that were created.
    pub created: Vec<String>,
    /// Paths that already existed and were left alone.
    pub skipped: Vec<String>,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InitOutput {
    /// Create a successful output.
    pub fn success(created: Vec<String>, skipped: Vec<String>) -> Self {
        Self {
            success: true,
            created,
            skipped,
            error: None,
        }
    }

    /// Create a failed output, keeping whatever progress was made.
    pub fn failure(error: impl Into<String>, created: Vec<String>, skipped: Vec<String>) -> Self {
        Self {
            success: false,
            created,
            skipped,
            error: Some(error.into()),
        }
    }
}

/// The init command implementation.
pub struct InitCommand {
    /// Working directory the project root is resolved from.
    cwd: String,
}

impl InitCommand {
    /// Create a new init command for the given working directory.
    pub fn new(cwd: impl Into<String>) -> Self {
        Self { cwd: cwd.into() }
    }

    /// Run the init command.
    pub fn run(&self, options: &InitOptions) -> InitOutput {
        let mut created = Vec::new();
        let mut skipped = Vec::new();

        // Project side: .rote/ and config.toml at the project root, so a
        // later `rote run` from any subdirectory picks up the same config.
        let project_root = config::find_project_root(Path::new(&self.cwd));
        let rote_dir = project_root.join(".rote");

        match self.ensure_dir(&rote_dir) {
            Ok(true) => created.push(rote_dir.display().to_string()),
            Ok(false) => skipped.push(rote_dir.display().to_string()),
            Err(e) => return InitOutput::failure(e, created, skipped),
        }

        let config_path = rote_dir.join("config.toml");
        if config_path.exists() && !options.force {
            skipped.push(config_path.display().to_string());
        } else {
            match Config::default().save_project(&project_root) {
                Ok(()) => created.push(config_path.display().to_string()),
                Err(e) => {
                    return InitOutput::failure(
                        format!("Failed to write {}: {}", config_path.display(), e),
                        created,
                        skipped,
                    );
                }
            }
        }

        // User side: the home directory and the sets directory under it.
        let home = match config::rote_home() {
            Some(home) => home,
            None => {
                return InitOutput::failure(
                    "Could not determine Rote home directory",
                    created,
                    skipped,
                );
            }
        };

        for dir in [home.clone(), home.join("sets")] {
            match self.ensure_dir(&dir) {
                Ok(true) => created.push(dir.display().to_string()),
                Ok(false) => skipped.push(dir.display().to_string()),
                Err(e) => return InitOutput::failure(e, created, skipped),
            }
        }

        InitOutput::success(created, skipped)
    }

    /// Create a directory if missing. Returns true if it was created.
    fn ensure_dir(&self, path: &Path) -> Result<bool, String> {
        if path.exists() {
            return Ok(false);
        }
        std::fs::create_dir_all(path)
            .map(|_| true)
            .map_err(|e| format!("Failed to create {}: {}", path.display(), e))
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &InitOutput, options: &InitOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    /// Format output as human-readable text.
    fn format_human_readable(&self, output: &InitOutput) -> String {
        let mut lines = Vec::new();

        if output.success {
            lines.push("Initialized Rote.".to_string());

            if !output.created.is_empty() {
                lines.push(String::new());
                lines.push("Created:".to_string());
                for path in &output.created {
                    lines.push(format!("  {}", path));
                }
            }
            if !output.skipped.is_empty() {
                lines.push(String::new());
                lines.push("Already exists (skipped):".to_string());
                for path in &output.skipped {
                    lines.push(format!("  {}", path));
                }
            }
        } else {
            lines.push(format!(
                "Init failed: {}",
                output.error.as_deref().unwrap_or("unknown error")
            ));

            if !output.created.is_empty() {
                lines.push(String::new());
                lines.push("Partially created before failure:".to_string());
                for path in &output.created {
                    lines.push(format!("  {}", path));
                }
            }
            if !output.skipped.is_empty() {
                lines.push(String::new());
                lines.push("Already existed (skipped):".to_string());
                for path in &output.skipped {
                    lines.push(format!("  {}", path));
                }
            }
        }

        lines.join("\n")
    }
}
