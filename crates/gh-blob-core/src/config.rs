//! Configuration module
//!
//! Endpoints, credentials and tuning knobs are carried in an explicit
//! [`ClientConfig`] handed to the client at construction time. Nothing here
//! reads process state after `from_env` returns.

use std::env;
use std::fmt;
use std::time::Duration;

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_FEATURE_FLAG, DEFAULT_MULTIPART_THRESHOLD, DEFAULT_PAGE_SIZE,
    DEFAULT_PART_SIZE, DEFAULT_UPLOADS_URL, DEFAULT_USER_AGENT,
};
use crate::error::{BlobError, BlobResult};

const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Authentication strategy for the API.
#[derive(Clone)]
pub enum Auth {
    /// `Authorization: Bearer {token}`
    Bearer(String),
}

impl Auth {
    /// Value of the `Authorization` header.
    pub fn header_value(&self) -> String {
        match self {
            Auth::Bearer(token) => format!("Bearer {}", token),
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::Bearer(_) => f.write_str("Bearer(***)"),
        }
    }
}

/// Shape of GraphQL response bodies.
///
/// Chosen once per client. `Wrapped` is the standard `{"data": ..., "errors": [...]}`
/// envelope; `Bare` is a proxy that returns the data object directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GraphQlEnvelope {
    #[default]
    Wrapped,
    Bare,
}

impl std::str::FromStr for GraphQlEnvelope {
    type Err = BlobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wrapped" | "data" => Ok(Self::Wrapped),
            "bare" | "unwrapped" => Ok(Self::Bare),
            other => Err(BlobError::Config(format!(
                "unknown GraphQL envelope '{}', expected 'wrapped' or 'bare'",
                other
            ))),
        }
    }
}

/// Sizing rules for uploads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadConfig {
    /// Bytes per PATCH in a chunked upload
    pub part_size: u64,
    /// Files of this size or larger use the chunked protocol
    pub multipart_threshold: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            part_size: DEFAULT_PART_SIZE,
            multipart_threshold: DEFAULT_MULTIPART_THRESHOLD,
        }
    }
}

impl UploadConfig {
    pub fn with_part_size(mut self, bytes: u64) -> Self {
        self.part_size = bytes;
        self
    }

    pub fn with_multipart_threshold(mut self, bytes: u64) -> Self {
        self.multipart_threshold = bytes;
        self
    }
}

/// Client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL for GraphQL (`{api_url}/graphql`)
    pub api_url: String,
    /// Base URL for archive uploads
    pub uploads_url: String,
    pub auth: Auth,
    pub user_agent: String,
    /// Value sent in the `GraphQL-Features` header
    pub feature_flag: String,
    pub envelope: GraphQlEnvelope,
    pub upload: UploadConfig,
    pub page_size: u32,
    pub connect_timeout: Duration,
}

impl ClientConfig {
    /// Configuration for the public GitHub endpoints.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            uploads_url: DEFAULT_UPLOADS_URL.to_string(),
            auth: Auth::Bearer(token.into()),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            feature_flag: DEFAULT_FEATURE_FLAG.to_string(),
            envelope: GraphQlEnvelope::default(),
            upload: UploadConfig::default(),
            page_size: DEFAULT_PAGE_SIZE,
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
        }
    }

    /// Create config from environment: GITHUB_TOKEN (required),
    /// GH_BLOB_API_URL, GH_BLOB_UPLOADS_URL, GH_BLOB_GRAPHQL_ENVELOPE.
    pub fn from_env() -> BlobResult<Self> {
        let token = env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                BlobError::Config("Missing token. Set GITHUB_TOKEN".to_string())
            })?;

        let mut config = Self::new(token);
        if let Ok(url) = env::var("GH_BLOB_API_URL") {
            config = config.with_api_url(url);
        }
        if let Ok(url) = env::var("GH_BLOB_UPLOADS_URL") {
            config = config.with_uploads_url(url);
        }
        if let Ok(envelope) = env::var("GH_BLOB_GRAPHQL_ENVELOPE") {
            config.envelope = envelope.parse()?;
        }
        Ok(config)
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_uploads_url(mut self, url: impl Into<String>) -> Self {
        self.uploads_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_envelope(mut self, envelope: GraphQlEnvelope) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn with_upload(mut self, upload: UploadConfig) -> Self {
        self.upload = upload;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn graphql_url(&self) -> String {
        format!("{}/graphql", self.api_url)
    }

    /// Check values that would otherwise fail deep inside an upload.
    pub fn validate(&self) -> BlobResult<()> {
        if self.upload.part_size == 0 {
            return Err(BlobError::Config("part size must be greater than zero".to_string()));
        }
        if self.page_size == 0 {
            return Err(BlobError::Config("page size must be greater than zero".to_string()));
        }
        Ok(())
    }
}
