//! Organization lookup.

use gh_blob_core::validation::require_non_empty;
use gh_blob_core::{BlobError, BlobResult, Organization};
use serde::Deserialize;
use serde_json::json;

use crate::graphql::{decode, GraphQlRequest, QueryTransport};

const OPERATION: &str = "GetOrganization";

const QUERY: &str = r#"
query GetOrganization($login: String!) {
  organization(login: $login) {
    login
    id
    name
    databaseId
  }
}"#;

#[derive(Debug, Deserialize)]
struct OrganizationData {
    organization: Option<Organization>,
}

/// Resolves an organization login to its node id and numeric id.
pub struct OrgResolver<T> {
    transport: T,
}

impl<T: QueryTransport> OrgResolver<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Every failure (query error, no such organization, unexpected shape)
    /// comes back as [`BlobError::Resolution`].
    pub async fn resolve(&self, login: &str) -> BlobResult<Organization> {
        require_non_empty("organization login", login)?;

        let request = GraphQlRequest::new(OPERATION, QUERY, json!({ "login": login }));
        let data = self
            .transport
            .execute(request)
            .await
            .map_err(|e| BlobError::resolution(login, e.to_string()))?;

        let organization = decode::<OrganizationData>(OPERATION, data)
            .map_err(|e| BlobError::resolution(login, e.to_string()))?
            .organization
            .ok_or_else(|| BlobError::resolution(login, "no organization with that login"))?;

        tracing::debug!(
            login = %organization.login,
            database_id = organization.database_id,
            "Resolved organization"
        );
        Ok(organization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GitHubClient;
    use gh_blob_core::{ClientConfig, GraphQlEnvelope};
    use mockito::Matcher;

    fn client(server: &mockito::Server, envelope: GraphQlEnvelope) -> GitHubClient {
        let config = ClientConfig::new("test-token")
            .with_api_url(server.url())
            .with_envelope(envelope);
        GitHubClient::new(config).unwrap()
    }

    const ORG: &str = r#"{"login":"acme","id":"O_kgDOABCDEF","name":"Acme","databaseId":9876543}"#;

    #[tokio::test]
    async fn resolves_wrapped_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/graphql")
            .match_header("authorization", "Bearer test-token")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "operationName": "GetOrganization",
                "variables": { "login": "acme" }
            })))
            .with_status(200)
            .with_body(format!(r#"{{"data":{{"organization":{}}}}}"#, ORG))
            .create_async()
            .await;

        let client = client(&server, GraphQlEnvelope::Wrapped);
        let org = client.resolve_organization("acme").await.unwrap();

        mock.assert_async().await;
        assert_eq!(org.id, "O_kgDOABCDEF");
        assert_eq!(org.database_id, 9876543);
        assert_eq!(org.numeric_id(), "9876543");
    }

    #[tokio::test]
    async fn resolves_bare_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_body(format!(r#"{{"organization":{}}}"#, ORG))
            .create_async()
            .await;

        let client = client(&server, GraphQlEnvelope::Bare);
        let org = client.resolve_organization("acme").await.unwrap();
        assert_eq!(org.login, "acme");
        assert_eq!(org.name.as_deref(), Some("Acme"));
    }

    #[tokio::test]
    async fn unknown_login_is_resolution_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_body(r#"{"data":{"organization":null}}"#)
            .create_async()
            .await;

        let client = client(&server, GraphQlEnvelope::Wrapped);
        let err = client.resolve_organization("ghost").await.unwrap_err();
        assert!(matches!(err, BlobError::Resolution { ref login, .. } if login == "ghost"));
    }

    #[tokio::test]
    async fn query_errors_become_resolution_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(401)
            .with_body(r#"{"message":"Bad credentials"}"#)
            .create_async()
            .await;

        let client = client(&server, GraphQlEnvelope::Wrapped);
        let err = client.resolve_organization("acme").await.unwrap_err();
        match err {
            BlobError::Resolution { reason, .. } => assert!(reason.contains("Bad credentials")),
            other => panic!("expected resolution error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unparseable_shape_is_resolution_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_body(r#"{"data":{"organization":{"login":"acme"}}}"#)
            .create_async()
            .await;

        let client = client(&server, GraphQlEnvelope::Wrapped);
        assert!(matches!(
            client.resolve_organization("acme").await,
            Err(BlobError::Resolution { .. })
        ));
    }

    #[tokio::test]
    async fn blank_login_never_hits_the_network() {
        let client = GitHubClient::new(ClientConfig::new("t")).unwrap();
        assert!(matches!(
            client.resolve_organization("").await,
            Err(BlobError::Validation(_))
        ));
    }
}
