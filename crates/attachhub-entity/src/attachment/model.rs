//! Attachment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use attachhub_core::types::id::{AttachmentId, SectionId};

use super::StoredContent;

/// One logical uploaded file. The id survives every replacement; only
/// `version` moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Attachment {
    /// Unique attachment identifier.
    pub id: AttachmentId,
    /// The section this file is filed under.
    pub section_id: SectionId,
    /// Sanitized path, stored without a leading `/`.
    pub file_path: String,
    /// Storage key of the current content.
    pub file_location: String,
    /// Original file name of the upload.
    pub file_name: String,
    /// MIME type of the content.
    pub file_type: Option<String>,
    /// Content size in bytes.
    pub file_size: i64,
    /// Current version number (starts at 1).
    pub version: i32,
    /// When the attachment was created.
    pub created_at: DateTime<Utc>,
    /// When the attachment was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Attachment {
    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        let name = self.file_path.rsplit('/').next().unwrap_or(&self.file_path);
        name.rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty())
    }
}

impl StoredContent for Attachment {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension() {
        let now = Utc::now();
        let mut attachment = Attachment {
            id: AttachmentId::new(1),
            section_id: SectionId::new(1),
            file_path: "docs/Report.PDF".into(),
            file_location: "attachments/x".into(),
            file_name: "Report.PDF".into(),
            file_type: None,
            file_size: 0,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(attachment.extension().as_deref(), Some("pdf"));

        attachment.file_path = "v1.0/README".into();
        assert_eq!(attachment.extension(), None);
    }
}
