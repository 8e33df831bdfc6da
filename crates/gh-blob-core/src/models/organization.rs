use serde::{Deserialize, Serialize};

/// An organization as returned by the `organization(login:)` query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub login: String,
    /// Opaque GraphQL node id
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Numeric id used by the upload endpoints
    pub database_id: u64,
}

impl Organization {
    /// The identifier expected in `/organizations/{id}/...` upload paths.
    pub fn numeric_id(&self) -> String {
        self.database_id.to_string()
    }
}
