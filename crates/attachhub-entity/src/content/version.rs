//! Content record version entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use attachhub_core::traits::attachment::HasAttachment;
use attachhub_core::types::id::{AttachmentId, RecordId};

/// Read-only snapshot of a content record taken at one save. The
/// attachment pointer is frozen at what it was when the snapshot was
/// written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ContentRecordVersion {
    /// Row identifier.
    pub id: i64,
    /// The record this snapshot belongs to.
    pub record_id: RecordId,
    /// Record version number.
    pub version: i32,
    /// Display name at this version.
    pub name: String,
    /// Bound attachment at this version.
    pub attachment_id: Option<AttachmentId>,
    /// Attachment version pinned by this snapshot.
    pub attachment_version: Option<i32>,
    /// Record creation time.
    pub created_at: DateTime<Utc>,
    /// Record update time as of this version.
    pub updated_at: DateTime<Utc>,
}

impl HasAttachment for ContentRecordVersion {
    fn attachment_id(&self) -> Option<AttachmentId> {
        self.attachment_id
    }

    fn attachment_version(&self) -> Option<i32> {
        self.attachment_version
    }
}
