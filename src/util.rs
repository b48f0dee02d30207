//! Utility functions shared across rote modules.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Result, RoteError};

/// Maximum file size that can be read into memory (10 MB).
///
/// Word lists and completion logs are read whole; this cap keeps an
/// unexpectedly large file from exhausting memory. Normal files sit far
/// below it.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10 MB

/// Read a file into a string with size limit protection.
///
/// # Errors
///
/// Returns an error if:
/// * The file cannot be read (doesn't exist, permission denied, etc.)
/// * The file exceeds `MAX_FILE_SIZE`
pub fn read_to_string_limited(path: &Path) -> Result<String> {
    read_to_string_with_limit(path, MAX_FILE_SIZE)
}

/// Read a file into a string with a custom size limit.
///
/// # Errors
///
/// Returns an error if the file exceeds `max_size` or cannot be read.
pub fn read_to_string_with_limit(path: &Path, max_size: u64) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| RoteError::storage(path, e))?;

    let size = metadata.len();
    if size > max_size {
        return Err(RoteError::storage(
            path,
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("file is too large ({} bytes, max {} bytes)", size, max_size),
            ),
        ));
    }

    fs::read_to_string(path).map_err(|e| RoteError::storage(path, e))
}
