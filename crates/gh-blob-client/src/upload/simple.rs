//! Single-request upload for archives below the multipart threshold.

use gh_blob_core::constants::OCTET_STREAM;
use gh_blob_core::{ArchiveDescriptor, BlobError, BlobResult};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Method, StatusCode};
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use crate::GitHubClient;

const OPERATION: &str = "simple upload";

/// POST the whole archive in one request. Only `201 Created` is success.
pub async fn simple_upload<R>(
    client: &GitHubClient,
    org_id: &str,
    name: &str,
    reader: R,
    size: u64,
) -> BlobResult<ArchiveDescriptor>
where
    R: AsyncRead + Send + Sync + 'static,
{
    tracing::info!(org_id = %org_id, name = %name, size, "Uploading archive in a single request");

    let url = client.uploads_url(&format!("/organizations/{}/gei/archive", org_id));
    let request = client
        .request(Method::POST, &url)
        .query(&[("name", name)])
        .header(CONTENT_TYPE, OCTET_STREAM)
        .header(CONTENT_LENGTH, size)
        .body(Body::wrap_stream(ReaderStream::new(reader)));

    let response = client
        .send_expecting(OPERATION, request, StatusCode::CREATED)
        .await?;
    let body = response
        .text()
        .await
        .map_err(|e| BlobError::transport(OPERATION, e))?;

    let archive: ArchiveDescriptor =
        serde_json::from_str(&body).map_err(|e| BlobError::decode(OPERATION, e))?;

    tracing::info!(guid = %archive.guid, node_id = %archive.node_id, "Archive uploaded");
    Ok(archive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::client_for;
    use mockito::Matcher;
    use std::io::Cursor;

    const CREATED: &str = r#"{
        "guid": "9f1c7d52-0b7e-4f2a-a0d4-6f1f6b0c2e11",
        "node_id": "MA_kwDOAAAAAc4AAAAB",
        "name": "repo.tar.gz",
        "size": 11,
        "uri": "gei://archive/9f1c7d52-0b7e-4f2a-a0d4-6f1f6b0c2e11",
        "created_at": "2024-05-02T09:15:00.000-07:00"
    }"#;

    #[tokio::test]
    async fn posts_body_with_exact_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Regex(r"^/organizations/77/gei/archive(\?.*)?$".to_string()))
            .match_query(Matcher::UrlEncoded("name".into(), "repo.tar.gz".into()))
            .match_header("authorization", "Bearer test-token")
            .match_header("content-type", "application/octet-stream")
            .match_header("content-length", "11")
            .match_header("user-agent", "gh-blob")
            .match_body("hello world")
            .with_status(201)
            .with_body(CREATED)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server.url(), Default::default());
        let archive = simple_upload(&client, "77", "repo.tar.gz", Cursor::new(b"hello world".to_vec()), 11)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(archive.guid, "9f1c7d52-0b7e-4f2a-a0d4-6f1f6b0c2e11");
        assert_eq!(archive.node_id, "MA_kwDOAAAAAc4AAAAB");
        assert_eq!(archive.size, 11);
        assert_eq!(archive.created_at, "2024-05-02T09:15:00.000-07:00");
    }

    #[tokio::test]
    async fn non_created_status_captures_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", Matcher::Regex(r"^/organizations/77/gei/archive(\?.*)?$".to_string()))
            .with_status(200)
            .with_body("archive accepted but not created")
            .create_async()
            .await;

        let client = client_for(&server.url(), Default::default());
        let err = simple_upload(&client, "77", "a.tar", Cursor::new(vec![1u8, 2, 3]), 3)
            .await
            .unwrap_err();

        assert!(matches!(err, BlobError::Remote { status: 200, .. }));
        assert_eq!(err.remote_body(), Some("archive accepted but not created"));
    }

    #[tokio::test]
    async fn malformed_json_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", Matcher::Regex(r"^/organizations/77/gei/archive(\?.*)?$".to_string()))
            .with_status(201)
            .with_body("<html>")
            .create_async()
            .await;

        let client = client_for(&server.url(), Default::default());
        let err = simple_upload(&client, "77", "a.tar", Cursor::new(vec![0u8]), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, BlobError::Decode { .. }));
    }
}
