//! Attachment domain entities.

pub mod model;
pub mod upload;
pub mod version;

pub use model::Attachment;
pub use upload::{AttachmentParams, FileUpload};
pub use version::AttachmentVersion;

/// Anything that points at one stored blob: the live attachment row or
/// one of its version snapshots.
pub trait StoredContent {
    /// Storage key of the content.
    fn file_location(&self) -> &str;

    /// Sanitized path, without a leading `/`.
    fn file_path(&self) -> &str;

    /// Version number this content belongs to.
    fn version(&self) -> i32;
}
