//! Attachment service: create, update, and read versioned attachments.
//!
//! Content is written to a fresh storage key before the database rows that
//! reference it. If the surrounding transaction does not commit, the staged
//! content is discarded again, so neither an orphaned blob nor a row
//! pointing at missing content survives a failed save.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};

use attachhub_core::config::StorageConfig;
use attachhub_core::error::AppError;
use attachhub_core::result::AppResult;
use attachhub_core::traits::storage::{ByteStream, StorageProvider};
use attachhub_core::types::id::{AttachmentId, SectionId};
use attachhub_database::repositories::attachment::{AttachmentRepository, AttachmentState};
use attachhub_database::repositories::section::SectionRepository;
use attachhub_entity::attachment::{
    Attachment, AttachmentParams, AttachmentVersion, FileUpload, StoredContent,
};
use attachhub_entity::section::Section;
use attachhub_storage::keys::new_content_key;
use attachhub_storage::mime::mime_from_path;
use attachhub_storage::sanitize::sanitize_file_path;

/// Upload content that has been written to storage but is not yet
/// referenced by any committed row.
#[derive(Debug, Clone)]
pub struct StagedContent {
    /// Storage key the content was written to.
    pub file_location: String,
    /// Original file name of the upload.
    pub file_name: String,
    /// MIME type.
    pub file_type: Option<String>,
    /// Content size in bytes.
    pub file_size: i64,
}

/// The versioned attachment store.
#[derive(Debug, Clone)]
pub struct AttachmentService {
    /// Pool used to open transactions for standalone operations.
    pool: SqlitePool,
    /// Attachment repository.
    attachment_repo: Arc<AttachmentRepository>,
    /// Section repository.
    section_repo: Arc<SectionRepository>,
    /// Content storage.
    storage: Arc<dyn StorageProvider>,
    /// Storage configuration.
    config: StorageConfig,
}

impl AttachmentService {
    /// Creates a new attachment service.
    pub fn new(
        pool: SqlitePool,
        attachment_repo: Arc<AttachmentRepository>,
        section_repo: Arc<SectionRepository>,
        storage: Arc<dyn StorageProvider>,
        config: StorageConfig,
    ) -> Self {
        Self {
            pool,
            attachment_repo,
            section_repo,
            storage,
            config,
        }
    }

    /// Fetch an attachment in its current state.
    pub async fn find(&self, id: AttachmentId) -> AppResult<Attachment> {
        self.attachment_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Attachment {id} not found")))
    }

    /// Resolve a section, failing when it does not exist.
    pub async fn require_section(&self, id: SectionId) -> AppResult<Section> {
        self.section_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Section {id} not found")))
    }

    /// Create an attachment at version 1 in its own transaction.
    ///
    /// `file_path` defaults to the upload's original file name.
    pub async fn create(
        &self,
        section_id: SectionId,
        file_path: Option<&str>,
        upload: &FileUpload,
    ) -> AppResult<Attachment> {
        self.require_section(section_id).await?;
        let staged = self.stage(upload).await?;
        let path = file_path.unwrap_or(&upload.original_filename);

        let result = async {
            let mut tx = self.pool.begin().await?;
            let attachment = self
                .insert_in(&mut tx, section_id, path, &staged, Utc::now())
                .await?;
            tx.commit().await?;
            Ok::<_, AppError>(attachment)
        }
        .await;

        if result.is_err() {
            self.discard(&staged).await;
        }
        result
    }

    /// Apply a change to an attachment in its own transaction.
    ///
    /// The id never changes. When nothing differs from the current state
    /// the attachment is returned untouched and no version is added.
    pub async fn update(&self, id: AttachmentId, change: &AttachmentParams) -> AppResult<Attachment> {
        let current = self.find(id).await?;
        if let Some(section_id) = change.section_id {
            self.require_section(section_id).await?;
        }
        let staged = match &change.file {
            Some(upload) => Some(self.stage(upload).await?),
            None => None,
        };

        let result = async {
            let mut tx = self.pool.begin().await?;
            let updated = self
                .apply_in(
                    &mut tx,
                    &current,
                    change.section_id,
                    change.file_path.as_deref(),
                    staged.as_ref(),
                    Utc::now(),
                )
                .await?;
            tx.commit().await?;
            Ok::<_, AppError>(updated.unwrap_or(current))
        }
        .await;

        if let (Err(_), Some(staged)) = (&result, &staged) {
            self.discard(staged).await;
        }
        result
    }

    /// Write upload content to a fresh storage key.
    pub async fn stage(&self, upload: &FileUpload) -> AppResult<StagedContent> {
        if upload.size() > self.config.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.config.max_upload_size_bytes
            )));
        }

        let file_location = new_content_key(Utc::now());
        self.storage
            .write(&file_location, upload.data.clone())
            .await?;

        Ok(StagedContent {
            file_location,
            file_name: upload.original_filename.clone(),
            file_type: upload
                .content_type
                .clone()
                .or_else(|| mime_from_path(&upload.original_filename)),
            file_size: upload.size() as i64,
        })
    }

    /// Remove staged content after the save that wanted it failed.
    pub async fn discard(&self, staged: &StagedContent) {
        if let Err(e) = self.storage.delete(&staged.file_location).await {
            warn!(
                file_location = %staged.file_location,
                error = %e,
                "Failed to discard staged attachment content"
            );
        }
    }

    /// Insert a new attachment and its version-1 snapshot on `conn`.
    pub async fn insert_in(
        &self,
        conn: &mut SqliteConnection,
        section_id: SectionId,
        file_path: &str,
        staged: &StagedContent,
        now: DateTime<Utc>,
    ) -> AppResult<Attachment> {
        let state = AttachmentState {
            section_id,
            file_path: sanitize_file_path(file_path),
            file_location: staged.file_location.clone(),
            file_name: staged.file_name.clone(),
            file_type: staged.file_type.clone(),
            file_size: staged.file_size,
        };

        let attachment = self.attachment_repo.create(conn, &state, now).await?;
        self.attachment_repo.snapshot(conn, &attachment).await?;

        info!(
            attachment_id = %attachment.id,
            section_id = %attachment.section_id,
            file_path = %attachment.file_path,
            size = attachment.file_size,
            "Attachment created"
        );
        Ok(attachment)
    }

    /// Move `current` to its next version on `conn` when anything changed.
    ///
    /// A path or section change without new content keeps pointing at the
    /// previous content. Returns `None` when nothing differs.
    pub async fn apply_in(
        &self,
        conn: &mut SqliteConnection,
        current: &Attachment,
        section_id: Option<SectionId>,
        file_path: Option<&str>,
        staged: Option<&StagedContent>,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Attachment>> {
        let mut next = AttachmentState::of(current);
        let mut changed = false;

        if let Some(section_id) = section_id.filter(|id| *id != current.section_id) {
            next.section_id = section_id;
            changed = true;
        }

        if let Some(path) = file_path.map(sanitize_file_path) {
            if path != current.file_path {
                next.file_path = path;
                changed = true;
            }
        }

        if let Some(staged) = staged {
            next.file_location = staged.file_location.clone();
            next.file_name = staged.file_name.clone();
            next.file_type = staged.file_type.clone();
            next.file_size = staged.file_size;
            changed = true;
        }

        if !changed {
            return Ok(None);
        }

        let updated = self
            .attachment_repo
            .bump_version(conn, current.id, &next, now)
            .await?;
        self.attachment_repo.snapshot(conn, &updated).await?;

        info!(
            attachment_id = %updated.id,
            version = updated.version,
            new_content = staged.is_some(),
            "Attachment updated"
        );
        Ok(Some(updated))
    }

    /// The immutable snapshot of an attachment at `version`.
    pub async fn version_at(&self, id: AttachmentId, version: i32) -> AppResult<AttachmentVersion> {
        self.attachment_repo
            .find_version(id, version)
            .await?
            .ok_or_else(|| AppError::invalid_version(version))
    }

    /// Every snapshot of an attachment, oldest first.
    pub async fn versions(&self, id: AttachmentId) -> AppResult<Vec<AttachmentVersion>> {
        self.find(id).await?;
        self.attachment_repo.find_versions(id).await
    }

    /// On-disk location of the content behind an attachment or version.
    pub fn full_file_location(&self, content: &impl StoredContent) -> PathBuf {
        self.storage.locate(content.file_location())
    }

    /// Open the content behind an attachment or version as a byte stream.
    pub async fn open_content(&self, content: &impl StoredContent) -> AppResult<ByteStream> {
        self.storage.read(content.file_location()).await
    }

    /// Count attachments.
    pub async fn count(&self) -> AppResult<i64> {
        self.attachment_repo.count().await
    }

    /// Count attachment versions.
    pub async fn count_versions(&self) -> AppResult<i64> {
        self.attachment_repo.count_versions().await
    }
}
