//! Archive deletion.
//!
//! The remote API does not promise idempotent deletes; deleting an unknown id
//! returns whatever error the server reports, unmodified.

use gh_blob_core::validation::require_non_empty;
use gh_blob_core::BlobResult;
use serde_json::json;

use crate::graphql::{GraphQlRequest, QueryTransport};

const OPERATION: &str = "deleteMigrationArchive";
const ACCEPT_V3: &str = "application/vnd.github.v3+json";

const MUTATION: &str = r#"
mutation deleteMigrationArchive($migrationArchiveId: ID!) {
  deleteMigrationArchive(input: { migrationArchiveId: $migrationArchiveId }) {
    migrationArchive { id guid name size uri createdAt }
  }
}"#;

/// Delete the archive with the given node id.
pub async fn delete_blob<T: QueryTransport>(transport: T, id: &str) -> BlobResult<()> {
    require_non_empty("archive id", id)?;
    tracing::info!(id = %id, "Deleting archive");

    let request = GraphQlRequest::new(OPERATION, MUTATION, json!({ "migrationArchiveId": id }))
        .with_features()
        .with_accept(ACCEPT_V3);
    transport.execute(request).await?;

    tracing::info!(id = %id, "Deleted archive");
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::test_support::client_for;
    use gh_blob_core::BlobError;
    use mockito::Matcher;

    #[tokio::test]
    async fn sends_mutation_with_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/graphql")
            .match_header("authorization", "Bearer test-token")
            .match_header("graphql-features", "octoshift_github_owned_storage")
            .match_header("accept", "application/vnd.github.v3+json")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "operationName": "deleteMigrationArchive",
                "variables": { "migrationArchiveId": "MA_del" }
            })))
            .with_status(200)
            .with_body(r#"{"data":{"deleteMigrationArchive":{"migrationArchive":{"id":"MA_del"}}}}"#)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server.url(), Default::default());
        client.delete_blob("MA_del").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_ok_status_surfaces_literal_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(502)
            .with_body("<html>Bad gateway</html>")
            .create_async()
            .await;

        let client = client_for(&server.url(), Default::default());
        let err = client.delete_blob("MA_del").await.unwrap_err();

        assert!(matches!(err, BlobError::Remote { status: 502, .. }));
        assert_eq!(err.remote_body(), Some("<html>Bad gateway</html>"));
    }

    #[tokio::test]
    async fn graphql_errors_surface_first_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_body(
                r#"{"data":{"deleteMigrationArchive":null},"errors":[{"type":"NOT_FOUND","message":"Could not resolve to a node with the global id of 'MA_gone'"},{"message":"other"}]}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server.url(), Default::default());
        let err = client.delete_blob("MA_gone").await.unwrap_err();

        assert!(matches!(err, BlobError::Remote { status: 200, .. }));
        assert_eq!(
            err.remote_body(),
            Some("Could not resolve to a node with the global id of 'MA_gone'")
        );
    }

    #[tokio::test]
    async fn empty_id_is_rejected_locally() {
        let client = client_for("http://127.0.0.1:9", Default::default());
        assert!(matches!(
            client.delete_blob("").await,
            Err(BlobError::Validation(_))
        ));
    }
}
