//! Error types module
//!
//! All fallible operations in the workspace return [`BlobError`]. The variants
//! follow the failure taxonomy of the client: bad input, organization lookup,
//! transport, remote rejection and protocol violations. Upload failures are
//! wrapped once more in [`BlobError::Upload`] so the caller always learns which
//! file was being sent.

use std::io;

/// Result type for blob operations
pub type BlobResult<T> = Result<T, BlobError>;

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Failed to resolve organization '{login}': {reason}")]
    Resolution { login: String, reason: String },

    #[error("Transport error during {operation}: {source}")]
    Transport {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{operation} failed with status {status}: {body}")]
    Remote {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("Protocol error during {operation}: {reason}")]
    Protocol { operation: String, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error ({context}): {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to decode {operation} response: {source}")]
    Decode {
        operation: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Upload of '{file}' failed: {source}")]
    Upload {
        file: String,
        #[source]
        source: Box<BlobError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BlobError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn resolution<L: Into<String>, R: Into<String>>(login: L, reason: R) -> Self {
        Self::Resolution {
            login: login.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a network-level failure (connect, TLS, body streaming).
    pub fn transport<S, E>(operation: S, error: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport {
            operation: operation.into(),
            source: Box::new(error),
        }
    }

    pub fn remote<S: Into<String>, B: Into<String>>(operation: S, status: u16, body: B) -> Self {
        Self::Remote {
            operation: operation.into(),
            status,
            body: body.into(),
        }
    }

    pub fn protocol<S: Into<String>, R: Into<String>>(operation: S, reason: R) -> Self {
        Self::Protocol {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    pub fn io<S: Into<String>>(context: S, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn decode<S: Into<String>>(operation: S, source: serde_json::Error) -> Self {
        Self::Decode {
            operation: operation.into(),
            source,
        }
    }

    /// Wrap any failure of an upload with the file it concerned.
    pub fn upload<S: Into<String>>(file: S, source: BlobError) -> Self {
        Self::Upload {
            file: file.into(),
            source: Box::new(source),
        }
    }

    /// The innermost error, looking through [`BlobError::Upload`] wrappers.
    pub fn root(&self) -> &BlobError {
        match self {
            Self::Upload { source, .. } => source.root(),
            other => other,
        }
    }

    /// Raw response body for remote rejections, if any.
    pub fn remote_body(&self) -> Option<&str> {
        match self.root() {
            Self::Remote { body, .. } => Some(body.as_str()),
            _ => None,
        }
    }
}
