//! Knowledge set model.
//!
//! A knowledge set is the immutable input to a drill session: a mapping from
//! keys to non-empty sets of accepted values. Sets are persisted as single
//! JSON documents by the storage layer and validated at every boundary where
//! one enters the system (construction, deserialization from disk).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::core::matcher;
use crate::error::{Result, RoteError};

/// A fixed set of key→values pairs drilled by one session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KnowledgeSet {
    /// Identifier the set is stored and addressed under.
    pub id: String,
    /// Key to accepted-values mapping. Keys and value sets are non-empty.
    pub entries: BTreeMap<String, BTreeSet<String>>,
}

impl KnowledgeSet {
    /// Create a validated knowledge set.
    pub fn new(id: impl Into<String>, entries: BTreeMap<String, BTreeSet<String>>) -> Result<Self> {
        let set = Self {
            id: id.into(),
            entries,
        };
        set.validate()?;
        Ok(set)
    }

    /// Validate the set's structural invariants.
    ///
    /// Storage implementations call this after deserializing, so a
    /// hand-edited file cannot smuggle a malformed set into a session.
    pub fn validate(&self) -> Result<()> {
        if matcher::is_blank(&self.id) {
            return Err(RoteError::invalid_set("set id is empty"));
        }
        if self.entries.is_empty() {
            return Err(RoteError::invalid_set(format!(
                "set '{}' has no entries",
                self.id
            )));
        }
        for (key, values) in &self.entries {
            if matcher::is_blank(key) {
                return Err(RoteError::invalid_set(format!(
                    "set '{}' contains an empty key",
                    self.id
                )));
            }
            if values.is_empty() {
                return Err(RoteError::invalid_set(format!(
                    "value set for key '{}' is empty",
                    key
                )));
            }
            if values.iter().any(|v| matcher::is_blank(v)) {
                return Err(RoteError::invalid_set(format!(
                    "value set for key '{}' contains a blank value",
                    key
                )));
            }
        }
        Ok(())
    }

    /// The accepted values for a key, if the key exists.
    pub fn accepted(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(key)
    }

    /// Keys in canonical order: alphabetical, case-insensitive, ties broken
    /// by raw byte order.
    ///
    /// This ordering is the single authority for Practice windows and the
    /// Final-stage cursor.
    pub fn ordered_keys(&self) -> Vec<&String> {
        let mut keys: Vec<&String> = self.entries.keys().collect();
        keys.sort_by(|a, b| {
            a.to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b))
        });
        keys
    }

    /// Number of keys in the set.
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    /// Total number of accepted values across all keys.
    pub fn value_count(&self) -> usize {
        self.entries.values().map(|v| v.len()).sum()
    }
}
