//! gh-blob core library
//!
//! Domain models, error types, configuration and input validation shared by
//! the client and the command-line front end.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{Auth, ClientConfig, GraphQlEnvelope, UploadConfig};
pub use error::{BlobError, BlobResult};
pub use models::{
    ArchiveConnection, ArchiveDescriptor, MigrationArchiveNode, Organization, PageInfo, UploadSpec,
};
