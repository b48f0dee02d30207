//! Unified error types for rote.
//!
//! Domain outcomes (wrong answers, duplicates, gate lockouts) are expressed
//! as `Feedback` values, never as errors. Errors here cover the remaining
//! taxonomy: storage and serialization failures, malformed knowledge sets,
//! configuration problems, and caller mistakes such as submitting an answer
//! in a stage that does not accept one.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for rote operations.
#[derive(Error, Debug)]
pub enum RoteError {
    /// I/O errors from set or completion-log file operations.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON or JSONL parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// State machine violations (submitting in Practice, advancing from Quiz).
    #[error("invalid state: {message}")]
    InvalidState { message: String },

    /// Knowledge set not found in storage.
    #[error("knowledge set not found: {set_id}")]
    SetNotFound { set_id: String },

    /// Knowledge set failed validation (empty id, key, or value set).
    #[error("invalid knowledge set: {message}")]
    InvalidSet { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },

    /// Candidate-suggestion errors (unreadable word list, no usable candidates).
    #[error("suggestion error: {message}")]
    Suggest { message: String },
}

/// A specialized Result type for rote operations.
pub type Result<T> = std::result::Result<T, RoteError>;

impl RoteError {
    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create an invalid state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a set not found error.
    pub fn set_not_found(set_id: impl Into<String>) -> Self {
        Self::SetNotFound {
            set_id: set_id.into(),
        }
    }

    /// Create an invalid set error.
    pub fn invalid_set(message: impl Into<String>) -> Self {
        Self::InvalidSet {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a suggestion error.
    pub fn suggest(message: impl Into<String>) -> Self {
        Self::Suggest {
            message: message.into(),
        }
    }
}

impl From<io::Error> for RoteError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for RoteError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Trait for fail-open error handling.
///
/// Reporting surfaces (completion logging, history reads) must never take a
/// finished session down with them: log a warning and continue with a safe
/// value. The session's in-memory state is the source of truth.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;

    /// Handle an error by logging a warning and returning the provided fallback.
    fn fail_open_with(self, context: &str, fallback: T) -> T;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using default)", context, err);
                T::default()
            }
        }
    }

    fn fail_open_with(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using fallback)", context, err);
                fallback
            }
        }
    }
}

/// Exit codes for the rote CLI.
pub mod exit_codes {
    /// Exit code for a successful command.
    pub const SUCCESS: i32 = 0;

    /// Exit code for a command that ran but reported failure.
    pub const ERROR: i32 = 1;

    /// Exit code used by the panic handler.
    pub const CRASH: i32 = 3;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = RoteError::storage(
            "/tmp/states.json",
            io::Error::new(io::ErrorKind::NotFound, "file not found"),
        );
        assert!(err.to_string().contains("storage error"));
        assert!(err.to_string().contains("/tmp/states.json"));
    }

    #[test]
    fn test_serde_error_display() {
        let err = RoteError::serde("invalid JSON");
        assert_eq!(err.to_string(), "serialization error: invalid JSON");
    }

    #[test]
    fn test_invalid_state_error_display() {
        let err = RoteError::invalid_state("answers are not checked during practice");
        assert!(err.to_string().contains("invalid state"));
    }

    #[test]
    fn test_set_not_found_error_display() {
        let err = RoteError::set_not_found("capitals");
        assert_eq!(err.to_string(), "knowledge set not found: capitals");
    }

    #[test]
    fn test_invalid_set_error_display() {
        let err = RoteError::invalid_set("value set for key 'A' is empty");
        assert!(err.to_string().contains("invalid knowledge set"));
    }

    #[test]
    fn test_config_error_display() {
        let err = RoteError::config("invalid TOML");
        assert_eq!(err.to_string(), "config error: invalid TOML");
    }

    #[test]
    fn test_suggest_error_display() {
        let err = RoteError::suggest("word list produced no candidates");
        assert_eq!(
            err.to_string(),
            "suggestion error: word list produced no candidates"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: RoteError = io_err.into();
        assert!(matches!(err, RoteError::Storage { .. }));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: RoteError = json_err.into();
        assert!(matches!(err, RoteError::Serde { .. }));
    }

    #[test]
    fn test_fail_open_default() {
        let result: Result<Vec<String>> = Err(RoteError::serde("test"));
        let value = result.fail_open_default("test context");
        assert!(value.is_empty());
    }

    #[test]
    fn test_fail_open_with() {
        let result: Result<i32> = Err(RoteError::config("test"));
        let value = result.fail_open_with("test context", 42);
        assert_eq!(value, 42);
    }

    #[test]
    fn test_fail_open_success() {
        let result: Result<i32> = Ok(100);
        let value = result.fail_open_default("test context");
        assert_eq!(value, 100);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_codes::SUCCESS, 0);
        assert_eq!(exit_codes::ERROR, 1);
        assert_eq!(exit_codes::CRASH, 3);
    }
}
