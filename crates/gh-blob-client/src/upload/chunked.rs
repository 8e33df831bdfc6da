//! Resumable, session-based chunked upload.
//!
//! `Initiating -> Uploading(part, location) -> Finalizing -> Completed | Failed`
//!
//! The server hands out a new location after every part; each PATCH goes to
//! the location returned by the previous step and the final PUT goes to the
//! location the last part was sent to. Session state lives only for the
//! duration of [`ChunkedUploadSession::run`]. A failure after some parts have
//! been accepted leaves the remote session orphaned; nothing here aborts or
//! resumes it.

use gh_blob_core::constants::{NODE_ID_UNAVAILABLE, OCTET_STREAM};
use gh_blob_core::{ArchiveDescriptor, BlobError, BlobResult};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, DATE, LOCATION};
use reqwest::{Method, Response, StatusCode};
use serde_json::json;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::location::parse_session_ids;
use crate::GitHubClient;

const INIT: &str = "chunked upload init";
const PART: &str = "chunked upload part";
const FINALIZE: &str = "chunked upload finalize";

/// Mutable progress of one in-flight session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UploadSession {
    pub upload_id: String,
    pub guid: String,
    /// Where the next part goes
    pub current_location: String,
    /// Where the last part went; the finalize target
    pub previous_location: String,
    pub bytes_uploaded: u64,
    pub next_part_number: u32,
    /// Set when a part response carried no next location
    pub closed_by_server: bool,
}

impl UploadSession {
    pub(crate) fn start(location: String) -> BlobResult<Self> {
        let ids = parse_session_ids(&location)?;
        Ok(Self {
            upload_id: ids.upload_id,
            guid: ids.guid,
            previous_location: location.clone(),
            current_location: location,
            bytes_uploaded: 0,
            next_part_number: 1,
            closed_by_server: false,
        })
    }

    /// Record an accepted part. An empty `next_location` closes the session.
    pub(crate) fn advance(&mut self, next_location: String, sent: u64) {
        self.previous_location = std::mem::replace(&mut self.current_location, next_location);
        self.bytes_uploaded += sent;
        self.next_part_number += 1;
        if self.current_location.is_empty() {
            self.closed_by_server = true;
        }
    }

    fn has_more(&self, size: u64) -> bool {
        self.bytes_uploaded < size && !self.closed_by_server
    }
}

/// Drives one chunked upload to completion.
pub struct ChunkedUploadSession<'a> {
    client: &'a GitHubClient,
    org_id: &'a str,
    name: &'a str,
    size: u64,
    part_size: u64,
}

impl<'a> ChunkedUploadSession<'a> {
    pub fn new(client: &'a GitHubClient, org_id: &'a str, name: &'a str, size: u64) -> Self {
        Self {
            client,
            org_id,
            name,
            size,
            part_size: client.config().upload.part_size,
        }
    }

    /// Upload `size` bytes from `reader` and return the assembled descriptor.
    pub async fn run<R>(self, reader: &mut R) -> BlobResult<ArchiveDescriptor>
    where
        R: AsyncRead + Unpin + Send,
    {
        tracing::info!(
            org_id = %self.org_id,
            name = %self.name,
            size = self.size,
            part_size = self.part_size,
            "Uploading archive in parts"
        );

        let mut session = self.initiate().await?;
        self.upload_parts(&mut session, reader).await?;
        self.finalize(&session).await
    }

    async fn initiate(&self) -> BlobResult<UploadSession> {
        let url = self.client.uploads_url(&format!(
            "/organizations/{}/gei/archive/blobs/uploads",
            self.org_id
        ));
        let request = self
            .client
            .feature_request(Method::POST, &url)
            .json(&json!({
                "content_type": OCTET_STREAM,
                "name": self.name,
                "size": self.size,
            }));

        let response = self
            .client
            .send_expecting(INIT, request, StatusCode::ACCEPTED)
            .await?;
        let location = location_header(INIT, &response)?;
        if location.is_empty() {
            return Err(BlobError::protocol(INIT, "missing Location header in response"));
        }

        let session = UploadSession::start(location)?;
        tracing::info!(
            upload_id = %session.upload_id,
            guid = %session.guid,
            "Started upload session"
        );
        Ok(session)
    }

    async fn upload_parts<R>(&self, session: &mut UploadSession, reader: &mut R) -> BlobResult<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        while session.has_more(self.size) {
            let part_len = self.part_size.min(self.size - session.bytes_uploaded);
            let buffer = read_part(reader, part_len).await?;
            if buffer.is_empty() {
                return Err(BlobError::protocol(
                    PART,
                    format!(
                        "source ended after {} of {} bytes",
                        session.bytes_uploaded, self.size
                    ),
                ));
            }

            let sent = buffer.len() as u64;
            let part_number = session.next_part_number;
            tracing::info!(part_number, bytes = sent, "Uploading part");

            let url = self.client.uploads_url(&session.current_location);
            let request = self
                .client
                .feature_request(Method::PATCH, &url)
                .header(CONTENT_TYPE, OCTET_STREAM)
                .header(CONTENT_LENGTH, sent)
                .body(buffer);

            let operation = format!("{} {}", PART, part_number);
            let response = self
                .client
                .send_expecting(&operation, request, StatusCode::ACCEPTED)
                .await?;

            session.advance(location_header(&operation, &response)?, sent);
            tracing::debug!(
                part_number,
                bytes_uploaded = session.bytes_uploaded,
                "Part accepted"
            );
        }

        if session.closed_by_server && session.bytes_uploaded < self.size {
            tracing::warn!(
                bytes_uploaded = session.bytes_uploaded,
                size = self.size,
                "Server returned no next location; finalizing early"
            );
        } else if session.bytes_uploaded != self.size {
            return Err(BlobError::protocol(
                FINALIZE,
                format!(
                    "uploaded {} bytes but the archive is {} bytes",
                    session.bytes_uploaded, self.size
                ),
            ));
        }

        Ok(())
    }

    async fn finalize(&self, session: &UploadSession) -> BlobResult<ArchiveDescriptor> {
        tracing::info!(guid = %session.guid, "Finalizing upload");

        let url = self.client.uploads_url(&session.previous_location);
        let request = self
            .client
            .feature_request(Method::PUT, &url)
            .header(CONTENT_TYPE, OCTET_STREAM);

        let response = self
            .client
            .send_expecting(FINALIZE, request, StatusCode::CREATED)
            .await?;
        let date = response
            .headers()
            .get(DATE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response
            .text()
            .await
            .map_err(|e| BlobError::transport(FINALIZE, e))?;

        let mut archive = if body.trim().is_empty() {
            ArchiveDescriptor::default()
        } else {
            serde_json::from_str(&body).map_err(|e| BlobError::decode(FINALIZE, e))?
        };
        self.apply_session(&mut archive, session, date);

        tracing::info!(guid = %archive.guid, uri = %archive.uri, "Archive uploaded");
        Ok(archive)
    }

    /// The finalize response carries little of the descriptor; the session
    /// is authoritative for every field.
    fn apply_session(&self, archive: &mut ArchiveDescriptor, session: &UploadSession, date: String) {
        archive.guid = session.guid.clone();
        archive.uri = ArchiveDescriptor::uri_for_guid(&session.guid);
        archive.node_id = NODE_ID_UNAVAILABLE.to_string();
        archive.name = self.name.to_string();
        archive.size = self.size;
        archive.created_at = date;
    }
}

/// The `Location` header, or an empty string when the server sent none.
fn location_header(operation: &str, response: &Response) -> BlobResult<String> {
    match response.headers().get(LOCATION) {
        None => Ok(String::new()),
        Some(value) => value.to_str().map(str::to_string).map_err(|_| {
            BlobError::protocol(operation, "Location header is not valid ASCII")
        }),
    }
}

/// Read up to `len` bytes. Fewer bytes come back only at end of stream.
async fn read_part<R>(reader: &mut R, len: u64) -> BlobResult<Vec<u8>>
where
    R: AsyncRead + Unpin + Send,
{
    let mut buffer = Vec::with_capacity(len as usize);
    reader
        .take(len)
        .read_to_end(&mut buffer)
        .await
        .map_err(|e| BlobError::io("read archive part", e))?;
    Ok(buffer)
}
