//! Attachment version entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use attachhub_core::types::id::{AttachmentId, SectionId};

use super::StoredContent;

/// Immutable snapshot of an attachment at one version. Rows are only ever
/// appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AttachmentVersion {
    /// Row identifier.
    pub id: i64,
    /// The attachment this version belongs to.
    pub attachment_id: AttachmentId,
    /// Sequential version number.
    pub version: i32,
    /// Section at this version.
    pub section_id: SectionId,
    /// Sanitized path at this version.
    pub file_path: String,
    /// Storage key of this version's content.
    pub file_location: String,
    /// Original file name of the upload that produced the content.
    pub file_name: String,
    /// MIME type of the content.
    pub file_type: Option<String>,
    /// Content size in bytes.
    pub file_size: i64,
    /// When this version was created.
    pub created_at: DateTime<Utc>,
}

impl StoredContent for AttachmentVersion {
    fn file_location(&self) -> &str {
        &self.file_location
    }

    fn file_path(&self) -> &str {
        &self.file_path
    }

    fn version(&self) -> i32 {
        self.version
    }
}
