//! Shared test helpers for service integration tests.

use attachhub_core::config::AppConfig;
use attachhub_entity::attachment::{AttachmentParams, FileUpload, StoredContent};
use attachhub_entity::section::Section;
use attachhub_service::Services;
use futures::StreamExt;

/// Test application context.
pub struct TestApp {
    /// Keeps the database and storage root alive for the test.
    _dir: tempfile::TempDir,
    /// The wired services.
    pub services: Services,
    /// The root section.
    pub root: Section,
}

impl TestApp {
    /// Create a new test application over a fresh database and storage root.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut config = AppConfig::default();
        config.database.url = format!("sqlite://{}", dir.path().join("test.db").display());
        config.storage.root_path = dir.path().join("files").display().to_string();

        let services = Services::bootstrap(&config)
            .await
            .expect("Failed to bootstrap services");
        let root = services
            .sections
            .root()
            .await
            .expect("Failed to create root section");

        Self {
            _dir: dir,
            services,
            root,
        }
    }

    /// Attachment fields filing `file` under the root section.
    pub fn in_root(&self, file: FileUpload) -> AttachmentParams {
        AttachmentParams::default().section(self.root.id).file(file)
    }

    /// Current attachment and attachment-version counts.
    pub async fn attachment_counts(&self) -> (i64, i64) {
        (
            self.services.attachments.count().await.unwrap(),
            self.services.attachments.count_versions().await.unwrap(),
        )
    }

    /// The full content behind an attachment or version.
    pub async fn read_content(&self, content: &impl StoredContent) -> Vec<u8> {
        let mut stream = self.services.attachments.open_content(content).await.unwrap();
        let mut collected = Vec::new();
        while let Some(chunk) = stream.next().await {
            collected.extend_from_slice(&chunk.unwrap());
        }
        collected
    }
}

/// A small image upload.
pub fn jpg(name: &str, data: &'static [u8]) -> FileUpload {
    FileUpload::new(name, Some("image/jpeg"), data)
}
