//! Content record entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use attachhub_core::traits::attachment::HasAttachment;
use attachhub_core::types::id::{AttachmentId, RecordId};

use crate::attachment::AttachmentParams;

/// A content record. The same column layout backs every content type's
/// table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ContentRecord {
    /// Unique record identifier.
    pub id: RecordId,
    /// Display name.
    pub name: String,
    /// Bound attachment; set iff the record has a file.
    pub attachment_id: Option<AttachmentId>,
    /// Attachment version the record currently points at.
    pub attachment_version: Option<i32>,
    /// Record version counter (stays at 1 for unversioned types).
    pub version: i32,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl HasAttachment for ContentRecord {
    fn attachment_id(&self) -> Option<AttachmentId> {
        self.attachment_id
    }

    fn attachment_version(&self) -> Option<i32> {
        self.attachment_version
    }
}

/// Data for creating a content record.
#[derive(Debug, Clone, Default)]
pub struct NewContent {
    /// Display name.
    pub name: String,
    /// Attachment fields.
    pub attachment: AttachmentParams,
}

impl NewContent {
    /// A record with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attachment: AttachmentParams::default(),
        }
    }

    /// Attach the given fields.
    pub fn with_attachment(mut self, attachment: AttachmentParams) -> Self {
        self.attachment = attachment;
        self
    }
}

/// Changes applied by an update. `None` fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct ContentChanges {
    /// New display name.
    pub name: Option<String>,
    /// Attachment fields.
    pub attachment: AttachmentParams,
}

impl ContentChanges {
    /// Rename only.
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            attachment: AttachmentParams::default(),
        }
    }

    /// Attachment change only.
    pub fn attachment(attachment: AttachmentParams) -> Self {
        Self {
            name: None,
            attachment,
        }
    }
}
