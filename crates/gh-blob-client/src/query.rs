//! Archive queries: cursor-paginated listing and lookup by node id.

use futures::stream::{self, Stream, TryStreamExt};
use gh_blob_core::validation::require_non_empty;
use gh_blob_core::{ArchiveConnection, ArchiveDescriptor, BlobError, BlobResult, MigrationArchiveNode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::graphql::{decode, GraphQlRequest, QueryTransport};

const ALL_BLOBS: &str = "AllBlobs";
const ALL_BLOBS_QUERY: &str = r#"
query AllBlobs($login: String!, $first: Int!, $endCursor: String) {
  organization(login: $login) {
    migrationArchives(first: $first, after: $endCursor) {
      nodes { id guid name size uri createdAt }
      pageInfo { hasNextPage endCursor }
    }
  }
}"#;

const QUERY_BLOB: &str = "QueryBlob";
const QUERY_BLOB_QUERY: &str = r#"
query QueryBlob($id: ID!) {
  node(id: $id) {
    ... on MigrationArchive { id guid name size uri createdAt }
  }
}"#;

#[derive(Debug, Deserialize)]
struct AllBlobsData {
    organization: Option<OrganizationArchives>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrganizationArchives {
    migration_archives: ArchiveConnection,
}

#[derive(Debug, Deserialize)]
struct NodeData {
    node: Option<MigrationArchiveNode>,
}

/// Everything a finished listing produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BlobListing {
    pub archives: Vec<ArchiveDescriptor>,
    pub total_count: usize,
    pub pages: usize,
}

/// Lazy, finite, non-restartable walk over an organization's archives.
///
/// Each call to [`next_page`](Self::next_page) fetches one page, threading
/// the previous page's end cursor. Once a page reports no next page the pager
/// is exhausted and never issues another request.
pub struct BlobPager<T> {
    transport: T,
    login: String,
    page_size: u32,
    cursor: Option<String>,
    exhausted: bool,
    pages_fetched: usize,
    total_count: usize,
}

impl<T: QueryTransport> BlobPager<T> {
    pub fn new(transport: T, login: &str, page_size: u32) -> Self {
        Self {
            transport,
            login: login.to_string(),
            page_size,
            cursor: None,
            exhausted: false,
            pages_fetched: 0,
            total_count: 0,
        }
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Records returned so far.
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Fetch the next page, or `None` once the listing is complete.
    pub async fn next_page(&mut self) -> BlobResult<Option<Vec<ArchiveDescriptor>>> {
        if self.exhausted {
            return Ok(None);
        }
        require_non_empty("organization login", &self.login)?;

        let request = GraphQlRequest::new(
            ALL_BLOBS,
            ALL_BLOBS_QUERY,
            json!({
                "login": self.login,
                "first": self.page_size,
                "endCursor": self.cursor,
            }),
        )
        .with_features();

        let data = self.transport.execute(request).await?;
        let connection = decode::<AllBlobsData>(ALL_BLOBS, data)?
            .organization
            .ok_or_else(|| BlobError::NotFound(format!("organization '{}'", self.login)))?
            .migration_archives;

        self.pages_fetched += 1;
        let page: Vec<ArchiveDescriptor> = connection
            .nodes
            .into_iter()
            .map(ArchiveDescriptor::from)
            .collect();
        self.total_count += page.len();
        tracing::info!(page = self.pages_fetched, records = page.len(), "Fetched archive page");

        let next_cursor = connection.page_info.end_cursor.filter(|c| !c.is_empty());
        match next_cursor {
            Some(cursor)
                if connection.page_info.has_next_page && self.cursor.as_ref() != Some(&cursor) =>
            {
                self.cursor = Some(cursor)
            }
            next => {
                if connection.page_info.has_next_page {
                    if next.is_some() {
                        tracing::warn!("Page repeated the previous end cursor; stopping");
                    } else {
                        tracing::warn!("Page reported a next page without an end cursor; stopping");
                    }
                }
                self.exhausted = true;
                tracing::info!(total = self.total_count, "Total archives");
            }
        }

        Ok(Some(page))
    }

    /// Drain the pager.
    pub async fn collect_all(mut self) -> BlobResult<BlobListing> {
        let mut archives = Vec::new();
        while let Some(page) = self.next_page().await? {
            archives.extend(page);
        }
        Ok(BlobListing {
            archives,
            total_count: self.total_count,
            pages: self.pages_fetched,
        })
    }

    /// One stream item per archive, fetching pages as the stream is polled.
    pub fn into_stream(self) -> impl Stream<Item = BlobResult<ArchiveDescriptor>> {
        stream::try_unfold(self, |mut pager| async move {
            let page = pager.next_page().await?;
            Ok::<_, BlobError>(page.map(|records| {
                let records = records.into_iter().map(Ok::<_, BlobError>);
                (stream::iter(records), pager)
            }))
        })
        .try_flatten()
    }
}

/// Fetch one archive by node id. A null node is `NotFound`.
pub async fn get_blob<T: QueryTransport>(transport: T, id: &str) -> BlobResult<ArchiveDescriptor> {
    require_non_empty("archive id", id)?;

    let request =
        GraphQlRequest::new(QUERY_BLOB, QUERY_BLOB_QUERY, json!({ "id": id })).with_features();
    let data = transport.execute(request).await?;
    let node = decode::<NodeData>(QUERY_BLOB, data)?
        .node
        .ok_or_else(|| BlobError::NotFound(format!("archive '{}'", id)))?;

    let archive = ArchiveDescriptor::from(node);
    tracing::info!(
        id = %archive.node_id,
        guid = %archive.guid,
        name = %archive.name,
        size = archive.size,
        "Fetched archive"
    );
    Ok(archive)
}
