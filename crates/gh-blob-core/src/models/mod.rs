//! Data models for the archive API
//!
//! Archive records, organization records and the upload input. Wire shapes
//! that differ between the REST upload endpoints and GraphQL are decoded by
//! separate structs and converted into the one [`ArchiveDescriptor`].

mod archive;
mod organization;
mod upload;

pub use archive::*;
pub use organization::*;
pub use upload::*;
