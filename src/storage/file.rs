//! File-based storage for Rote.
//!
//! Knowledge sets are stored as JSON files in `~/.rote/sets/`, one file per
//! set, with atomic writes via temp file + rename. Completions are appended
//! to a JSONL log, one record per line.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use crate::config::{completions_log_path, sets_dir};
use crate::core::{CompletionRecord, KnowledgeSet};
use crate::error::{Result, RoteError};
use crate::storage::{CompletionLog, SetStore};
use crate::util::read_to_string_limited;

/// File-based knowledge-set storage.
///
/// Stores sets as JSON files in a configurable directory.
/// Uses atomic writes via temp file + rename pattern.
#[derive(Debug, Clone)]
pub struct FileSetStore {
    /// Directory where set files are stored.
    sets_dir: PathBuf,
}

impl FileSetStore {
    /// Create a new file set store with the default directory.
    ///
    /// Uses `~/.rote/sets/` or `$ROTE_HOME/sets/`.
    pub fn new() -> Result<Self> {
        let dir = sets_dir().ok_or_else(|| {
            RoteError::config("Could not determine sets directory (no home directory)")
        })?;
        Self::with_dir(dir)
    }

    /// Create a new file set store with a custom directory.
    pub fn with_dir(sets_dir: impl Into<PathBuf>) -> Result<Self> {
        let sets_dir = sets_dir.into();

        // Create the directory if it doesn't exist
        if !sets_dir.exists() {
            fs::create_dir_all(&sets_dir).map_err(|e| RoteError::storage(&sets_dir, e))?;
        }

        Ok(Self { sets_dir })
    }

    /// Get the path for a set file.
    fn set_path(&self, id: &str) -> PathBuf {
        self.sets_dir.join(format!("{}.json", id))
    }

    /// Get the path for a temp file used during atomic writes.
    fn temp_path(&self, id: &str) -> PathBuf {
        self.sets_dir.join(format!(".{}.json.tmp", id))
    }

    /// Write a set atomically using temp file + rename.
    fn atomic_write(&self, set: &KnowledgeSet) -> Result<()> {
        let final_path = self.set_path(&set.id);
        let temp_path = self.temp_path(&set.id);

        // Serialize to JSON
        let json = serde_json::to_string_pretty(set)?;

        // Write to temp file
        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| RoteError::storage(&temp_path, e))?;
            file.write_all(json.as_bytes())
                .map_err(|e| RoteError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| RoteError::storage(&temp_path, e))?;
        }

        // Rename temp file to final path (atomic on POSIX)
        fs::rename(&temp_path, &final_path).map_err(|e| RoteError::storage(&final_path, e))?;

        Ok(())
    }
}

impl SetStore for FileSetStore {
    fn load(&self, id: &str) -> Result<Option<KnowledgeSet>> {
        let path = self.set_path(id);

        if !path.exists() {
            return Ok(None);
        }

        let content = read_to_string_limited(&path)?;
        let set: KnowledgeSet = serde_json::from_str(&content)?;

        // A file can hold well-formed JSON that still isn't a usable set.
        set.validate()?;

        Ok(Some(set))
    }

    fn save(&self, set: &KnowledgeSet) -> Result<()> {
        set.validate()?;
        self.atomic_write(set)
    }

    fn list(&self, limit: usize) -> Result<Vec<KnowledgeSet>> {
        if !self.sets_dir.exists() {
            return Ok(Vec::new());
        }

        let mut sets: Vec<(KnowledgeSet, std::time::SystemTime)> = Vec::new();

        let entries =
            fs::read_dir(&self.sets_dir).map_err(|e| RoteError::storage(&self.sets_dir, e))?;

        for entry in entries {
            let entry = entry.map_err(|e| RoteError::storage(&self.sets_dir, e))?;
            let path = entry.path();

            // Skip non-JSON files and temp files
            if path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }
            if path
                .file_name()
                .map(|n| n.to_string_lossy().starts_with('.'))
                .unwrap_or(true)
            {
                continue;
            }

            // Read and parse the set; unreadable or invalid files are
            // skipped rather than failing the whole listing.
            if let Ok(content) = fs::read_to_string(&path) {
                if let Ok(set) = serde_json::from_str::<KnowledgeSet>(&content) {
                    if set.validate().is_err() {
                        continue;
                    }
                    let mtime = entry
                        .metadata()
                        .and_then(|m| m.modified())
                        .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
                    sets.push((set, mtime));
                }
            }
        }

        // Sort by modification time (most recent first)
        sets.sort_by(|a, b| b.1.cmp(&a.1));

        Ok(sets.into_iter().take(limit).map(|(s, _)| s).collect())
    }

    fn delete(&self, id: &str) -> Result<()> {
        let path = self.set_path(id);

        if path.exists() {
            fs::remove_file(&path).map_err(|e| RoteError::storage(&path, e))?;
        }

        // Also clean up any temp file
        let temp_path = self.temp_path(id);
        if temp_path.exists() {
            let _ = fs::remove_file(&temp_path);
        }

        Ok(())
    }
}

/// File-based completion log.
///
/// Appends one JSON record per line. Appends are close to atomic for short
/// records, and a torn or corrupted line only costs that line on read.
#[derive(Debug, Clone)]
pub struct FileCompletionLog {
    /// Path to the JSONL log file.
    path: PathBuf,
}

impl FileCompletionLog {
    /// Create a new completion log at the default path.
    ///
    /// Uses `~/.rote/completions.log` or `$ROTE_HOME/completions.log`.
    pub fn new() -> Result<Self> {
        let path = completions_log_path().ok_or_else(|| {
            RoteError::config("Could not determine completion log path (no home directory)")
        })?;
        Ok(Self::with_path(path))
    }

    /// Create a new completion log at a custom path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the log file path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl CompletionLog for FileCompletionLog {
    fn record(&self, record: &CompletionRecord) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| RoteError::storage(parent, e))?;
        }

        let json = serde_json::to_string(record)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| RoteError::storage(&self.path, e))?;

        writeln!(file, "{}", json).map_err(|e| RoteError::storage(&self.path, e))?;

        Ok(())
    }

    fn history(&self, limit: usize) -> Result<Vec<CompletionRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = read_to_string_limited(&self.path)?;

        let mut records = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<CompletionRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    // One bad line must not hide the rest of the history.
                    tracing::warn!(
                        line = index + 1,
                        error = %e,
                        "Skipping unreadable completion record"
                    );
                }
            }
        }

        // Appends are chronological; newest first for display.
        records.reverse();
        records.truncate(limit);

        Ok(records)
    }
}
