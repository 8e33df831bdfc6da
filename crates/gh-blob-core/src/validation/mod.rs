//! Input validation
//!
//! Checks performed before any request is issued. Failures are
//! [`BlobError::Validation`] and never reach the network.

use std::path::Path;

use crate::error::{BlobError, BlobResult};

/// The archive must exist, be a regular file and be openable for reading.
pub fn validate_archive_path(path: &Path) -> BlobResult<()> {
    let metadata = std::fs::metadata(path)
        .map_err(|_| BlobError::validation(format!("file does not exist: {}", path.display())))?;

    if !metadata.is_file() {
        return Err(BlobError::validation(format!(
            "not a regular file: {}",
            path.display()
        )));
    }

    std::fs::File::open(path).map_err(|e| {
        BlobError::validation(format!("file is not readable: {}: {}", path.display(), e))
    })?;

    Ok(())
}

/// Opaque archive node ids and organization logins must be non-empty.
pub fn require_non_empty(field: &str, value: &str) -> BlobResult<()> {
    if value.trim().is_empty() {
        return Err(BlobError::validation(format!("{} is required", field)));
    }
    Ok(())
}
