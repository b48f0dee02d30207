//! Storage traits for Rote.
//!
//! This module defines the `SetStore` trait for knowledge-set persistence
//! and the `CompletionLog` trait for the append-only completion history.

use std::sync::Arc;

use crate::core::{CompletionRecord, KnowledgeSet};
use crate::error::Result;

/// Trait for knowledge-set storage backends.
///
/// Implementations provide persistent storage for knowledge sets,
/// supporting CRUD operations and listing recent sets.
pub trait SetStore: Send + Sync {
    /// Retrieve a set by id.
    ///
    /// Returns `Ok(None)` if the set doesn't exist.
    fn load(&self, id: &str) -> Result<Option<KnowledgeSet>>;

    /// Save a set.
    ///
    /// Creates a new set or replaces an existing one.
    fn save(&self, set: &KnowledgeSet) -> Result<()>;

    /// List stored sets.
    ///
    /// Returns up to `limit` sets, ordered by most recently written.
    fn list(&self, limit: usize) -> Result<Vec<KnowledgeSet>>;

    /// Delete a set.
    ///
    /// Returns `Ok(())` even if the set doesn't exist.
    fn delete(&self, id: &str) -> Result<()>;

    /// Check if a set exists.
    fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.load(id)?.is_some())
    }
}

/// Trait for the append-only completion history.
pub trait CompletionLog: Send + Sync {
    /// Append one completion record.
    fn record(&self, record: &CompletionRecord) -> Result<()>;

    /// List recorded completions.
    ///
    /// Returns up to `limit` records, newest first.
    fn history(&self, limit: usize) -> Result<Vec<CompletionRecord>>;
}

/// Blanket implementation of SetStore for Arc-wrapped stores.
///
/// This allows using `Arc<T>` where `T: SetStore` is expected, which is
/// useful for sharing stores between tests and commands.
impl<T: SetStore + ?Sized> SetStore for Arc<T> {
    fn load(&self, id: &str) -> Result<Option<KnowledgeSet>> {
        (**self).load(id)
    }

    fn save(&self, set: &KnowledgeSet) -> Result<()> {
        (**self).save(set)
    }

    fn list(&self, limit: usize) -> Result<Vec<KnowledgeSet>> {
        (**self).list(limit)
    }

    fn delete(&self, id: &str) -> Result<()> {
        (**self).delete(id)
    }
}

/// Blanket implementation of CompletionLog for Arc-wrapped logs.
impl<T: CompletionLog + ?Sized> CompletionLog for Arc<T> {
    fn record(&self, record: &CompletionRecord) -> Result<()> {
        (**self).record(record)
    }

    fn history(&self, limit: usize) -> Result<Vec<CompletionRecord>> {
        (**self).history(limit)
    }
}

/// Test utilities for storage implementations.
#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::core::knowledge::tests::sample_set;
    use chrono::{Duration, Utc};

    /// Test helper to verify SetStore implementations.
    pub fn test_set_store_crud<S: SetStore>(store: &S) {
        let set = sample_set();

        // Initially should not exist
        assert!(!store.exists(&set.id).unwrap());
        assert!(store.load(&set.id).unwrap().is_none());

        // Save the set
        store.save(&set).unwrap();

        // Now should exist, and round-trip intact
        assert!(store.exists(&set.id).unwrap());
        let retrieved = store.load(&set.id).unwrap().unwrap();
        assert_eq!(retrieved, set);

        // List should include the set
        let listed = store.list(10).unwrap();
        assert!(!listed.is_empty());
        assert!(listed.iter().any(|s| s.id == set.id));

        // Delete the set
        store.delete(&set.id).unwrap();

        // Should no longer exist
        assert!(!store.exists(&set.id).unwrap());
        assert!(store.load(&set.id).unwrap().is_none());

        // Delete again should succeed
        store.delete(&set.id).unwrap();
    }

    /// Test helper to verify CompletionLog implementations.
    pub fn test_completion_log_records_history<L: CompletionLog>(log: &L) {
        assert!(log.history(10).unwrap().is_empty());

        let base = Utc::now();
        for (offset, set_id) in ["fruit", "capitals", "fruit"].iter().enumerate() {
            let record =
                CompletionRecord::with_timestamp(*set_id, base + Duration::seconds(offset as i64));
            log.record(&record).unwrap();
        }

        // Newest first, truncated by the limit
        let recent = log.history(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].set_id, "fruit");
        assert_eq!(recent[1].set_id, "capitals");
        assert!(recent[0].ts > recent[1].ts);

        assert_eq!(log.history(10).unwrap().len(), 3);
    }
}
