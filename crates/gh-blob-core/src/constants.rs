//! Wire constants shared by the client and the CLI.

/// Size of one part in a chunked upload (100 MiB).
pub const DEFAULT_PART_SIZE: u64 = 100 * 1024 * 1024;

/// Files at or above this size use the chunked protocol (5000 MiB).
pub const DEFAULT_MULTIPART_THRESHOLD: u64 = 5000 * 1024 * 1024;

/// Records requested per page when listing archives.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_UPLOADS_URL: &str = "https://uploads.github.com";
pub const DEFAULT_USER_AGENT: &str = "gh-blob";

/// Value of the `GraphQL-Features` header that enables owned-storage endpoints.
pub const DEFAULT_FEATURE_FLAG: &str = "octoshift_github_owned_storage";
pub const FEATURE_FLAG_HEADER: &str = "GraphQL-Features";

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Placeholder for the node id, which the finalize response does not carry.
pub const NODE_ID_UNAVAILABLE: &str = "Not available";

/// Scheme used for archive URIs synthesized from a GUID.
pub const ARCHIVE_URI_PREFIX: &str = "gei://archive/";
