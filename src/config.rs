//! Configuration for Rote.
//!
//! Configuration is layered: defaults, then the user config at
//! `~/.rote/config.toml`, then the project config at `.rote/config.toml`,
//! then environment variables. Higher layers win field by field.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoteError};

/// Minimum allowed countdown poll interval, in milliseconds.
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Maximum allowed countdown poll interval, in milliseconds.
pub const MAX_POLL_INTERVAL_MS: u64 = 10_000;

/// Minimum allowed history display limit.
pub const MIN_HISTORY_LIMIT: usize = 1;

/// Maximum allowed history display limit.
pub const MAX_HISTORY_LIMIT: usize = 500;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Drill behavior settings.
    #[serde(default)]
    pub drill: DrillConfig,

    /// Completion history settings.
    #[serde(default)]
    pub history: HistoryConfig,
}

/// Drill behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrillConfig {
    /// Set id used when `rote run` is given no argument.
    #[serde(default)]
    pub default_set: Option<String>,

    /// Cadence of the review-gate countdown redraw, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    500
}

impl DrillConfig {
    /// Check if a poll interval is within the allowed range.
    pub fn is_valid_poll_interval(ms: u64) -> bool {
        (MIN_POLL_INTERVAL_MS..=MAX_POLL_INTERVAL_MS).contains(&ms)
    }
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            default_set: None,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Completion history settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Default number of completion records shown by `rote results`.
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

fn default_history_limit() -> usize {
    20
}

impl HistoryConfig {
    /// Check if a history limit is within the allowed range.
    pub fn is_valid_limit(limit: usize) -> bool {
        (MIN_HISTORY_LIMIT..=MAX_HISTORY_LIMIT).contains(&limit)
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: default_history_limit(),
        }
    }
}

impl Config {
    /// Load configuration with full precedence chain.
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables
    /// 2. Project config (`.rote/config.toml` at the project root)
    /// 3. User config (`~/.rote/config.toml`)
    /// 4. Defaults
    pub fn load() -> Self {
        // Fail-open: if cwd is unavailable, return defaults with env overrides
        // rather than trying path operations with an empty PathBuf
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                // Still apply user config and env overrides
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        // Start with defaults
        let mut config = Config::default();

        // Layer 4 → 3: Apply user config
        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        // Layer 3 → 2: Apply project config
        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        // Layer 2 → 1: Apply environment variables
        config.apply_env_overrides();

        config
    }

    /// Load user config from `~/.rote/config.toml`.
    fn load_user_config() -> Option<Config> {
        let home = rote_home()?;
        let config_path = home.join("config.toml");
        Self::load_from_file(&config_path).ok()
    }

    /// Load project config from `.rote/config.toml` at the project root.
    ///
    /// The project root is found by walking up from `cwd`; see
    /// [`find_project_root`].
    fn load_project_config(cwd: &Path) -> Option<Config> {
        let config_path = project_rote_dir(cwd).join("config.toml");
        Self::load_from_file(&config_path).ok()
    }

    /// Load config from a specific file path.
    fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| RoteError::storage(path, e))?;
        toml::from_str(&content).map_err(|e| RoteError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // ROTE_DEFAULT_SET
        if let Ok(val) = env::var("ROTE_DEFAULT_SET") {
            if val.trim().is_empty() {
                eprintln!("Warning: Ignoring empty ROTE_DEFAULT_SET.");
            } else {
                self.drill.default_set = Some(val);
            }
        }

        // ROTE_POLL_INTERVAL_MS
        if let Ok(val) = env::var("ROTE_POLL_INTERVAL_MS") {
            match val.parse::<u64>() {
                Ok(n) => {
                    if DrillConfig::is_valid_poll_interval(n) {
                        self.drill.poll_interval_ms = n;
                    } else {
                        eprintln!(
                            "Warning: Invalid ROTE_POLL_INTERVAL_MS value '{}'. \
                            Must be in range [{}, {}]. Using default '{}'.",
                            n,
                            MIN_POLL_INTERVAL_MS,
                            MAX_POLL_INTERVAL_MS,
                            self.drill.poll_interval_ms
                        );
                    }
                }
                Err(_) => eprintln!(
                    "Warning: Invalid ROTE_POLL_INTERVAL_MS value '{}'. \
                    Expected a positive integer. Using default '{}'.",
                    val, self.drill.poll_interval_ms
                ),
            }
        }

        // ROTE_HISTORY_LIMIT
        if let Ok(val) = env::var("ROTE_HISTORY_LIMIT") {
            match val.parse::<usize>() {
                Ok(n) => {
                    if HistoryConfig::is_valid_limit(n) {
                        self.history.limit = n;
                    } else {
                        eprintln!(
                            "Warning: Invalid ROTE_HISTORY_LIMIT value '{}'. \
                            Must be in range [{}, {}]. Using default '{}'.",
                            n, MIN_HISTORY_LIMIT, MAX_HISTORY_LIMIT, self.history.limit
                        );
                    }
                }
                Err(_) => eprintln!(
                    "Warning: Invalid ROTE_HISTORY_LIMIT value '{}'. \
                    Expected a positive integer. Using default '{}'.",
                    val, self.history.limit
                ),
            }
        }
    }

    /// Merge another config into this one.
    ///
    /// The `other` config takes precedence. All non-default fields from `other`
    /// are applied to `self`, enabling proper layering of the precedence chain.
    /// This is field-by-field merging, not section-by-section, which ensures
    /// that explicit defaults in one config do not block overrides from another.
    ///
    /// # Limitation
    ///
    /// A config cannot explicitly set a value back to the default to override a
    /// non-default value from a lower-precedence config. For example:
    /// - User config sets `poll_interval_ms = 900`
    /// - Project config sets `poll_interval_ms = 500` (the default)
    /// - Result: `poll_interval_ms = 900` because the project value equals default
    ///
    /// This limitation exists because we cannot distinguish between "not set in
    /// file" and "explicitly set to default value" without using `Option<T>` for
    /// all config fields. The current approach enables additive config layering
    /// where each layer only needs to specify its customizations.
    fn merge(mut self, other: Config) -> Self {
        // Drill: merge field by field
        let default_drill = DrillConfig::default();
        if other.drill.default_set != default_drill.default_set {
            self.drill.default_set = other.drill.default_set;
        }
        if other.drill.poll_interval_ms != default_drill.poll_interval_ms {
            self.drill.poll_interval_ms = other.drill.poll_interval_ms;
        }

        // History: merge field by field
        let default_history = HistoryConfig::default();
        if other.history.limit != default_history.limit {
            self.history.limit = other.history.limit;
        }

        self
    }

    /// Save configuration to the project config file.
    ///
    /// Writes to `.rote/config.toml` in the given directory.
    /// Creates the `.rote` directory if it doesn't exist.
    /// Uses atomic write (write to temp file, then rename) for safety.
    pub fn save_project(&self, cwd: &Path) -> Result<()> {
        let rote_dir = cwd.join(".rote");

        // Create .rote directory if it doesn't exist
        if !rote_dir.exists() {
            fs::create_dir_all(&rote_dir).map_err(|e| RoteError::storage(&rote_dir, e))?;
        }

        let config_path = rote_dir.join("config.toml");

        // Serialize to TOML
        let content = toml::to_string_pretty(self).map_err(|e| RoteError::config(e.to_string()))?;

        // Atomic write: write to temp file, then rename
        let temp_path = rote_dir.join(".config.toml.tmp");
        fs::write(&temp_path, &content).map_err(|e| RoteError::storage(&temp_path, e))?;

        // Sync the file to disk
        let file = fs::File::open(&temp_path).map_err(|e| RoteError::storage(&temp_path, e))?;
        file.sync_all()
            .map_err(|e| RoteError::storage(&temp_path, e))?;
        drop(file);

        // Rename temp to final (atomic on most filesystems)
        fs::rename(&temp_path, &config_path).map_err(|e| RoteError::storage(&config_path, e))?;

        Ok(())
    }
}

/// Get the Rote home directory.
///
/// Checks `ROTE_HOME` environment variable first, then falls back to
/// `~/.rote`.
///
/// # Validation
///
/// If `ROTE_HOME` is set, it must be:
/// - Non-empty
/// - An absolute path (or we canonicalize it)
///
/// Invalid values are ignored and we fall back to the default.
pub fn rote_home() -> Option<PathBuf> {
    // Check ROTE_HOME env var first
    if let Ok(home) = env::var("ROTE_HOME") {
        // Validate: must be non-empty
        if home.is_empty() {
            tracing::warn!("ROTE_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            // If it's an absolute path, use it directly
            if path.is_absolute() {
                return Some(path);
            }
            // For relative paths, try to canonicalize it
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            // If canonicalization fails (path doesn't exist), use as-is but warn
            tracing::warn!("ROTE_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    // Fall back to ~/.rote
    if let Some(home) = dirs::home_dir() {
        return Some(home.join(".rote"));
    }

    // Fallback for containerized/minimal environments without HOME
    let fallback_path = fallback_rote_home();
    tracing::warn!(
        "HOME not set, using fallback location: {}",
        fallback_path.display()
    );
    Some(fallback_path)
}

/// Get fallback rote home path when HOME is unavailable.
#[cfg(unix)]
fn fallback_rote_home() -> PathBuf {
    use std::os::unix::fs::MetadataExt;
    // Get UID for unique temp directory
    let uid = std::fs::metadata("/").map(|m| m.uid()).unwrap_or(0);
    PathBuf::from(format!("/tmp/rote-{}", uid))
}

/// Get fallback rote home path when HOME is unavailable.
#[cfg(not(unix))]
fn fallback_rote_home() -> PathBuf {
    std::env::temp_dir().join("rote")
}

/// Find the project root for a given working directory.
///
/// This function walks up the directory tree to find the appropriate project
/// root, using the following precedence:
///
/// 1. **Existing `.rote/` directory** - If a `.rote/` directory exists in the
///    current directory or any ancestor, that directory is used. This allows
///    explicit placement of the Rote directory.
///
/// 2. **Git repository root** - If no `.rote/` is found, we ask git for the
///    repository root via `git rev-parse --show-toplevel`. This handles all
///    git edge cases including worktrees and submodules.
///
/// 3. **Fallback to cwd** - If neither is found (e.g., not a git repo, git
///    not installed), the original working directory is used.
pub fn find_project_root(cwd: &Path) -> PathBuf {
    // 1. Walk up looking for existing .rote/ (explicit placement wins)
    for ancestor in cwd.ancestors() {
        if ancestor.join(".rote").is_dir() {
            return ancestor.to_path_buf();
        }
    }

    // 2. Ask git for the repo root
    if let Ok(output) = std::process::Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .current_dir(cwd)
        .output()
    {
        if output.status.success() {
            if let Ok(path) = String::from_utf8(output.stdout) {
                let trimmed = path.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
        }
    }

    // 3. Fall back to cwd
    cwd.to_path_buf()
}

/// Get the sets directory.
///
/// Returns `<rote_home>/sets/`.
pub fn sets_dir() -> Option<PathBuf> {
    rote_home().map(|h| h.join("sets"))
}

/// Get the completion log path.
///
/// Returns `<rote_home>/completions.log`.
pub fn completions_log_path() -> Option<PathBuf> {
    rote_home().map(|h| h.join("completions.log"))
}

/// Get the project rote directory for a given working directory.
///
/// This function first finds the project root (by looking for an existing
/// `.rote/` directory or the git repository root), then returns the `.rote/`
/// subdirectory. See [`find_project_root`] for details.
pub fn project_rote_dir(cwd: &Path) -> PathBuf {
    find_project_root(cwd).join(".rote")
}
