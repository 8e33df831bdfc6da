//! Upload engine
//!
//! Measures the archive and picks the transfer strategy: a single POST below
//! the multipart threshold, a chunked session at or above it. Both paths end
//! in the same [`ArchiveDescriptor`]; any failure is reported as
//! [`BlobError::Upload`] naming the file.

pub mod chunked;
pub mod location;
pub mod simple;

use std::io::SeekFrom;

use gh_blob_core::{ArchiveDescriptor, BlobError, BlobResult, UploadConfig, UploadSpec};
use tokio::fs::File;
use tokio::io::{AsyncSeek, AsyncSeekExt};

use crate::GitHubClient;
pub use chunked::ChunkedUploadSession;
pub use simple::simple_upload;

/// How an archive of a given size is transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStrategy {
    Simple,
    Chunked,
}

impl UploadStrategy {
    pub fn for_size(size: u64, config: &UploadConfig) -> Self {
        if size < config.multipart_threshold {
            Self::Simple
        } else {
            Self::Chunked
        }
    }
}

/// Size of a seekable stream, leaving its position where it was.
pub async fn stream_size<S>(stream: &mut S) -> std::io::Result<u64>
where
    S: AsyncSeek + Unpin,
{
    let position = stream.stream_position().await?;
    let end = stream.seek(SeekFrom::End(0)).await?;
    stream.seek(SeekFrom::Start(position)).await?;
    Ok(end)
}

pub struct UploadEngine<'a> {
    client: &'a GitHubClient,
}

impl<'a> UploadEngine<'a> {
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    pub async fn upload(&self, spec: &UploadSpec) -> BlobResult<ArchiveDescriptor> {
        self.upload_inner(spec).await.map_err(|e| {
            tracing::error!(file = %spec.file_path.display(), error = %e, "Upload failed");
            BlobError::upload(spec.file_path.display().to_string(), e)
        })
    }

    async fn upload_inner(&self, spec: &UploadSpec) -> BlobResult<ArchiveDescriptor> {
        spec.validate()?;
        let name = spec.file_name()?;

        let mut file = File::open(&spec.file_path)
            .await
            .map_err(|e| BlobError::io(format!("open {}", spec.file_path.display()), e))?;
        let size = stream_size(&mut file)
            .await
            .map_err(|e| BlobError::io("determine archive size", e))?;

        let strategy = UploadStrategy::for_size(size, &self.client.config().upload);
        tracing::debug!(name = %name, size, ?strategy, "Selected upload strategy");

        match strategy {
            UploadStrategy::Simple => {
                simple_upload(self.client, &spec.organization_id, &name, file, size).await
            }
            UploadStrategy::Chunked => {
                ChunkedUploadSession::new(self.client, &spec.organization_id, &name, size)
                    .run(&mut file)
                    .await
            }
        }
    }
}
