//! Storage for Rote.
//!
//! This module provides persistent storage for knowledge sets and the
//! completion history, supporting file-based and in-memory backends.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::{FileCompletionLog, FileSetStore};
pub use memory::{MemoryCompletionLog, MemorySetStore};
pub use traits::{CompletionLog, SetStore};
