//! Value suggestion for Rote.
//!
//! This module provides the trait interface and implementations for
//! suggestion providers that propose accepted values when building
//! knowledge sets, plus the shared candidate filter they all run behind.
//!
//! Available providers:
//! - **Word list**: newline-delimited file, bucketed by first letter

pub mod filter;
pub mod traits;
pub mod words;

pub use filter::{dedup_candidates, group_by_initial, is_valid_candidate};
pub use traits::SuggestionProvider;
pub use words::WordListProvider;
