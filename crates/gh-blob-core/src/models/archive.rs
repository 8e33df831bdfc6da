use serde::{Deserialize, Serialize};

use crate::constants::ARCHIVE_URI_PREFIX;

/// A migration archive stored server-side.
///
/// Decodes the REST upload response directly (`node_id`, `created_at`). Every
/// field may be absent because the chunked finalize response omits most of
/// them; the session then supplies every field itself. `created_at` is kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveDescriptor {
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub node_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub created_at: String,
}

impl ArchiveDescriptor {
    /// `gei://archive/{guid}`
    pub fn uri_for_guid(guid: &str) -> String {
        format!("{}{}", ARCHIVE_URI_PREFIX, guid)
    }
}

/// `MigrationArchive` node as returned by GraphQL queries and mutations.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationArchiveNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub created_at: String,
}

impl From<MigrationArchiveNode> for ArchiveDescriptor {
    fn from(node: MigrationArchiveNode) -> Self {
        Self {
            guid: node.guid,
            node_id: node.id,
            name: node.name,
            size: node.size,
            uri: node.uri,
            created_at: node.created_at,
        }
    }
}

/// Relay-style page info.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

/// One page of an organization's archives.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveConnection {
    #[serde(default)]
    pub nodes: Vec<MigrationArchiveNode>,
    #[serde(rename = "pageInfo")]
    pub page_info: PageInfo,
}
