//! In-memory storage for testing.
//!
//! This module provides thread-safe in-memory implementations of the
//! SetStore and CompletionLog traits, primarily for use in unit tests.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::core::{CompletionRecord, KnowledgeSet};
use crate::error::Result;
use crate::storage::{CompletionLog, SetStore};

/// In-memory set store for testing.
///
/// Thread-safe implementation using `RwLock<HashMap>`. Sets are stored in
/// memory and lost when the store is dropped. Each save records a sequence
/// number so listing can order by most recently written, matching the
/// file store's mtime ordering.
#[derive(Debug, Default)]
pub struct MemorySetStore {
    /// Set storage, keyed by id, with a write sequence number.
    sets: RwLock<HashMap<String, (KnowledgeSet, u64)>>,
}

impl MemorySetStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            sets: RwLock::new(HashMap::new()),
        }
    }

    /// Get the number of sets in the store.
    pub fn len(&self) -> usize {
        self.sets.read().unwrap().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.sets.read().unwrap().is_empty()
    }

    /// Clear all sets from the store.
    pub fn clear(&self) {
        self.sets.write().unwrap().clear();
    }
}

impl SetStore for MemorySetStore {
    fn load(&self, id: &str) -> Result<Option<KnowledgeSet>> {
        let sets = self.sets.read().unwrap();
        Ok(sets.get(id).map(|(set, _)| set.clone()))
    }

    fn save(&self, set: &KnowledgeSet) -> Result<()> {
        set.validate()?;
        let mut sets = self.sets.write().unwrap();
        // Replacing an existing id still counts as the most recent write.
        let seq = sets.values().map(|(_, seq)| *seq).max().unwrap_or(0) + 1;
        sets.insert(set.id.clone(), (set.clone(), seq));
        Ok(())
    }

    fn list(&self, limit: usize) -> Result<Vec<KnowledgeSet>> {
        let sets = self.sets.read().unwrap();
        let mut result: Vec<(KnowledgeSet, u64)> = sets.values().cloned().collect();

        // Sort by write sequence descending (most recent first)
        result.sort_by(|a, b| b.1.cmp(&a.1));
        result.truncate(limit);

        Ok(result.into_iter().map(|(set, _)| set).collect())
    }

    fn delete(&self, id: &str) -> Result<()> {
        let mut sets = self.sets.write().unwrap();
        sets.remove(id);
        Ok(())
    }
}

/// In-memory completion log for testing.
#[derive(Debug, Default)]
pub struct MemoryCompletionLog {
    /// Records in append order.
    records: RwLock<Vec<CompletionRecord>>,
}

impl MemoryCompletionLog {
    /// Create a new empty in-memory log.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Get the number of recorded completions.
    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    /// Check if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.records.read().unwrap().is_empty()
    }

    /// Clear all records from the log.
    pub fn clear(&self) {
        self.records.write().unwrap().clear();
    }
}

impl CompletionLog for MemoryCompletionLog {
    fn record(&self, record: &CompletionRecord) -> Result<()> {
        let mut records = self.records.write().unwrap();
        records.push(record.clone());
        Ok(())
    }

    fn history(&self, limit: usize) -> Result<Vec<CompletionRecord>> {
        let records = self.records.read().unwrap();
        let mut result: Vec<CompletionRecord> = records.iter().rev().cloned().collect();
        result.truncate(limit);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::knowledge::tests::{entry, sample_set};
    use crate::storage::traits::tests::{test_completion_log_records_history, test_set_store_crud};

    fn set_with_id(id: &str) -> KnowledgeSet {
        KnowledgeSet::new(id, [entry("A", &["a1"])].into_iter().collect()).unwrap()
    }

    // =========================================================================
    // MemorySetStore
    // =========================================================================

    #[test]
    fn test_memory_store_crud() {
        let store = MemorySetStore::new();
        test_set_store_crud(&store);
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = MemorySetStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_default_trait() {
        let store = MemorySetStore::default();
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear() {
        let store = MemorySetStore::new();

        store.save(&set_with_id("one")).unwrap();
        store.save(&set_with_id("two")).unwrap();
        assert_eq!(store.len(), 2);

        store.clear();

        assert!(store.is_empty());
    }

    #[test]
    fn test_list_most_recent_first() {
        let store = MemorySetStore::new();

        store.save(&set_with_id("one")).unwrap();
        store.save(&set_with_id("two")).unwrap();
        store.save(&set_with_id("three")).unwrap();

        let result = store.list(10).unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].id, "three");
        assert_eq!(result[1].id, "two");
        assert_eq!(result[2].id, "one");
    }

    #[test]
    fn test_list_limit() {
        let store = MemorySetStore::new();

        for i in 0..10 {
            store.save(&set_with_id(&format!("set-{}", i))).unwrap();
        }

        assert_eq!(store.len(), 10);
        assert_eq!(store.list(3).unwrap().len(), 3);
    }

    #[test]
    fn test_save_replaces_and_refreshes_recency() {
        let store = MemorySetStore::new();

        store.save(&sample_set()).unwrap();
        store.save(&set_with_id("capitals")).unwrap();

        // Re-saving "fruit" makes it the most recent again.
        store.save(&sample_set()).unwrap();

        assert_eq!(store.len(), 2);
        let result = store.list(10).unwrap();
        assert_eq!(result[0].id, "fruit");
    }

    #[test]
    fn test_save_rejects_invalid_set() {
        let store = MemorySetStore::new();

        let mut set = sample_set();
        set.id = String::new();
        assert!(store.save(&set).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(MemorySetStore::new());
        let mut handles = vec![];

        // Spawn multiple threads that read and write
        for i in 0..10 {
            let store_clone = Arc::clone(&store);
            let handle = thread::spawn(move || {
                let set = set_with_id(&format!("set-{}", i));
                store_clone.save(&set).unwrap();
                store_clone.load(&format!("set-{}", i)).unwrap();
            });
            handles.push(handle);
        }

        // Wait for all threads
        for handle in handles {
            handle.join().unwrap();
        }

        // All sets should be stored
        assert_eq!(store.len(), 10);
    }

    // =========================================================================
    // MemoryCompletionLog
    // =========================================================================

    #[test]
    fn test_memory_log_records_history() {
        let log = MemoryCompletionLog::new();
        test_completion_log_records_history(&log);
    }

    #[test]
    fn test_log_len_and_clear() {
        let log = MemoryCompletionLog::new();
        assert!(log.is_empty());

        log.record(&CompletionRecord::new("fruit")).unwrap();
        log.record(&CompletionRecord::new("fruit")).unwrap();
        assert_eq!(log.len(), 2);

        log.clear();
        assert!(log.is_empty());
    }
}
