use std::path::{Path, PathBuf};

use crate::error::{BlobError, BlobResult};

/// Input to an upload: which file, and which organization receives it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSpec {
    pub file_path: PathBuf,
    /// Numeric organization id (see [`crate::models::Organization::numeric_id`])
    pub organization_id: String,
}

impl UploadSpec {
    pub fn new(file_path: impl Into<PathBuf>, organization_id: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            organization_id: organization_id.into(),
        }
    }

    /// Ensure the file is an existing regular file and the organization id is set.
    pub fn validate(&self) -> BlobResult<()> {
        if self.organization_id.trim().is_empty() {
            return Err(BlobError::validation("organization id is required"));
        }
        crate::validation::validate_archive_path(&self.file_path)
    }

    /// Base name of the file, used as the archive name on the server.
    pub fn file_name(&self) -> BlobResult<String> {
        file_name(&self.file_path)
    }
}

pub(crate) fn file_name(path: &Path) -> BlobResult<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| BlobError::validation(format!("no file name in {}", path.display())))
}
