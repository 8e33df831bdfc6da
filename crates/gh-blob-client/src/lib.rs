//! HTTP client for migration archive storage.
//!
//! Provides an authenticated client over the GraphQL and uploads endpoints,
//! the upload engine (single-request or chunked session), cursor-paginated
//! listing, lookup by id and deletion. The CLI uses this client directly.

pub mod graphql;
pub mod lifecycle;
pub mod org;
pub mod query;
pub mod upload;

use std::path::Path;

use gh_blob_core::constants::FEATURE_FLAG_HEADER;
use gh_blob_core::{ArchiveDescriptor, BlobError, BlobResult, ClientConfig, Organization, UploadSpec};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};

pub use graphql::{GraphQlRequest, QueryTransport};
pub use org::OrgResolver;
pub use query::{BlobListing, BlobPager};
pub use upload::{ChunkedUploadSession, UploadEngine, UploadStrategy};

/// Authenticated client for the archive API.
#[derive(Clone, Debug)]
pub struct GitHubClient {
    client: Client,
    config: ClientConfig,
}

impl GitHubClient {
    pub fn new(config: ClientConfig) -> BlobResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| BlobError::transport("create HTTP client", e))?;

        Ok(Self { client, config })
    }

    /// Create client from environment (see [`ClientConfig::from_env`]).
    pub fn from_env() -> BlobResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Absolute URL for a path on the uploads host. Absolute locations are
    /// returned unchanged.
    pub fn uploads_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.config.uploads_url, path)
        }
    }

    /// Request with the bearer credential applied.
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(AUTHORIZATION, self.config.auth.header_value())
    }

    /// Request with the bearer credential and the feature-flag header.
    pub fn feature_request(&self, method: Method, url: &str) -> RequestBuilder {
        self.request(method, url)
            .header(FEATURE_FLAG_HEADER, self.config.feature_flag.as_str())
    }

    /// Send a request, mapping connection-level failures to `Transport`.
    pub async fn send(&self, operation: &str, request: RequestBuilder) -> BlobResult<Response> {
        request
            .send()
            .await
            .map_err(|e| BlobError::transport(operation, e))
    }

    /// Send and require one exact status. Any other status becomes `Remote`
    /// with the response body captured verbatim.
    pub async fn send_expecting(
        &self,
        operation: &str,
        request: RequestBuilder,
        expected: StatusCode,
    ) -> BlobResult<Response> {
        let response = self.send(operation, request).await?;
        expect_status(operation, response, expected).await
    }

    /// Look up an organization by login.
    pub async fn resolve_organization(&self, login: &str) -> BlobResult<Organization> {
        OrgResolver::new(self).resolve(login).await
    }

    /// Upload a local archive to the organization with the given numeric id.
    pub async fn upload_blob(
        &self,
        file_path: impl AsRef<Path>,
        organization_id: &str,
    ) -> BlobResult<ArchiveDescriptor> {
        let spec = UploadSpec::new(file_path.as_ref(), organization_id);
        UploadEngine::new(self).upload(&spec).await
    }

    /// Lazily page through every archive of an organization.
    pub fn list_blobs(&self, login: &str) -> BlobPager<&Self> {
        BlobPager::new(self, login, self.config.page_size)
    }

    /// Fetch one archive by its node id.
    pub async fn get_blob(&self, id: &str) -> BlobResult<ArchiveDescriptor> {
        query::get_blob(self, id).await
    }

    /// Delete one archive by its node id.
    pub async fn delete_blob(&self, id: &str) -> BlobResult<()> {
        lifecycle::delete_blob(self, id).await
    }
}

/// Turn an unexpected status into `BlobError::Remote` carrying the raw body.
pub(crate) async fn expect_status(
    operation: &str,
    response: Response,
    expected: StatusCode,
) -> BlobResult<Response> {
    let status = response.status();
    if status == expected {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
    tracing::debug!(operation, status = status.as_u16(), "Unexpected response status");
    Err(BlobError::remote(operation, status.as_u16(), body))
}
