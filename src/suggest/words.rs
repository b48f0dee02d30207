//! Word-list suggestion provider.
//!
//! Reads a newline-delimited word list, runs every line through the
//! shared candidate filter, and buckets the survivors by first letter.
//! The whole file is processed once at construction; `suggest` then only
//! slices the prepared buckets.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::core::matcher;
use crate::error::{Result, RoteError};
use crate::suggest::filter::{dedup_candidates, group_by_initial, is_valid_candidate};
use crate::suggest::SuggestionProvider;
use crate::util::read_to_string_limited;

/// Suggestion provider backed by a newline-delimited word list.
#[derive(Debug, Clone)]
pub struct WordListProvider {
    /// Source file, kept for logging.
    path: PathBuf,
    /// Usable candidates bucketed by uppercase first letter.
    groups: BTreeMap<String, Vec<String>>,
}

impl WordListProvider {
    /// Load a word list from a file.
    ///
    /// Lines that fail the candidate filter are dropped; survivors are
    /// de-duplicated in first-occurrence order and bucketed by initial.
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = read_to_string_limited(&path)?;

        let candidates =
            dedup_candidates(content.lines().filter(|line| is_valid_candidate(line)));
        let groups = group_by_initial(candidates, usize::MAX);

        Ok(Self { path, groups })
    }

    /// Path of the source file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Number of usable candidates across all buckets.
    pub fn len(&self) -> usize {
        self.groups.values().map(|bucket| bucket.len()).sum()
    }

    /// Whether the word list yielded no usable candidates at all.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl SuggestionProvider for WordListProvider {
    fn suggest(&self, key: &str, limit: usize) -> Result<Vec<String>> {
        let normalized = matcher::normalize(key);
        let mut chars = normalized.chars();
        let initial = match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => c.to_ascii_uppercase(),
            _ => {
                return Err(RoteError::suggest(format!(
                    "key '{}' is not a single letter",
                    key
                )));
            }
        };

        Ok(self
            .groups
            .get(&initial.to_string())
            .map(|bucket| bucket.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "word-list"
    }
}
