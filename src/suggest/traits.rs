//! Suggestion provider trait for Rote.
//!
//! This module defines the trait interface for sources of candidate
//! values consulted when building a knowledge set.

use crate::error::Result;

/// Trait for suggestion providers.
///
/// A provider answers "which values could key X accept?". Candidates it
/// returns have already passed the shared filter and de-duplication, in
/// normalized form. All providers must be thread-safe.
pub trait SuggestionProvider: Send + Sync {
    /// Suggest up to `limit` candidate values for a key.
    ///
    /// Keys are single-letter group ids; matching against candidates is
    /// case-insensitive. A key that isn't a single ASCII letter is an
    /// error; a letter with no candidates returns an empty list.
    fn suggest(&self, key: &str, limit: usize) -> Result<Vec<String>>;

    /// Get the provider name for logging.
    fn name(&self) -> &'static str;
}
