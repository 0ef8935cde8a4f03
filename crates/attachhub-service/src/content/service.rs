//! Content service. Saves content records and keeps their attachment
//! binding in step.
//!
//! A save is planned first (validation, section lookup, staging new
//! content) and then applied inside a single transaction that writes the
//! attachment rows, the record row, and, for versioned types, the record
//! snapshot. A rejected save leaves every table as it was.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use attachhub_core::error::AppError;
use attachhub_core::result::AppResult;
use attachhub_core::traits::attachment::HasAttachment;
use attachhub_core::types::id::{RecordId, SectionId};
use attachhub_database::repositories::content::ContentRecordRepository;
use attachhub_entity::attachment::{Attachment, AttachmentParams, AttachmentVersion};
use attachhub_entity::content::{ContentChanges, ContentRecord, ContentType, NewContent};
use attachhub_entity::section::Section;
use attachhub_storage::sanitize::display_file_path;

use crate::attachment::{AttachmentService, StagedContent};

/// What a save is going to do with the record's attachment.
#[derive(Debug)]
enum AttachmentPlan {
    /// Leave the attachment pointer alone.
    Keep,
    /// Create the record's first attachment.
    Create {
        section_id: SectionId,
        file_path: String,
        staged: StagedContent,
    },
    /// Advance the existing attachment if anything differs.
    Update {
        current: Attachment,
        staged: Option<StagedContent>,
    },
}

impl AttachmentPlan {
    fn staged(&self) -> Option<&StagedContent> {
        match self {
            Self::Keep => None,
            Self::Create { staged, .. } => Some(staged),
            Self::Update { staged, .. } => staged.as_ref(),
        }
    }
}

/// Creates and updates content records together with their attachment.
#[derive(Debug, Clone)]
pub struct ContentService {
    /// Pool used to open save transactions.
    pool: SqlitePool,
    /// Content record repository.
    content_repo: Arc<ContentRecordRepository>,
    /// Attachment store.
    attachments: Arc<AttachmentService>,
}

impl ContentService {
    /// Creates a new content service.
    pub fn new(
        pool: SqlitePool,
        content_repo: Arc<ContentRecordRepository>,
        attachments: Arc<AttachmentService>,
    ) -> Self {
        Self {
            pool,
            content_repo,
            attachments,
        }
    }

    /// Save a new record, creating its attachment when one is supplied.
    pub async fn create(&self, content_type: ContentType, new: NewContent) -> AppResult<ContentRecord> {
        validate_name(&new.name)?;
        let plan = self.plan(content_type, None, &new.attachment).await?;

        let result = async {
            let now = Utc::now();
            let mut tx = self.pool.begin().await?;

            let attachment = self.apply(&mut tx, &plan, &new.attachment, now).await?;
            let record = self
                .content_repo
                .create(
                    &mut tx,
                    content_type,
                    &new.name,
                    attachment.map(|a| (a.id, a.version)),
                    now,
                )
                .await?;
            if content_type.versioned {
                self.content_repo.snapshot(&mut tx, content_type, &record).await?;
            }

            tx.commit().await?;
            Ok::<_, AppError>(record)
        }
        .await;

        let record = self.finish(&plan, result).await?;
        info!(
            content_type = %content_type,
            record_id = %record.id,
            attachment_id = ?record.attachment_id,
            attachment_version = ?record.attachment_version,
            "Content record created"
        );
        Ok(record)
    }

    /// Save changes to an existing record.
    ///
    /// Versioned types get a new record snapshot on every successful save,
    /// whether or not the attachment moved.
    pub async fn update(
        &self,
        content_type: ContentType,
        id: RecordId,
        changes: ContentChanges,
    ) -> AppResult<ContentRecord> {
        let mut record = self.find(content_type, id).await?;
        if let Some(name) = &changes.name {
            validate_name(name)?;
        }

        let existing = match record.attachment_id {
            Some(attachment_id) => Some(self.attachments.find(attachment_id).await?),
            None => None,
        };
        let plan = self.plan(content_type, existing, &changes.attachment).await?;

        let result = async {
            let now = Utc::now();
            let mut tx = self.pool.begin().await?;

            if let Some(attachment) = self.apply(&mut tx, &plan, &changes.attachment, now).await? {
                record.attachment_id = Some(attachment.id);
                record.attachment_version = Some(attachment.version);
            }
            if let Some(name) = &changes.name {
                record.name = name.clone();
            }

            let saved = self
                .content_repo
                .update(&mut tx, content_type, &record, content_type.versioned, now)
                .await?;
            if content_type.versioned {
                self.content_repo.snapshot(&mut tx, content_type, &saved).await?;
            }

            tx.commit().await?;
            Ok::<_, AppError>(saved)
        }
        .await;

        let saved = self.finish(&plan, result).await?;
        info!(
            content_type = %content_type,
            record_id = %saved.id,
            version = saved.version,
            attachment_version = ?saved.attachment_version,
            "Content record updated"
        );
        Ok(saved)
    }

    /// Find a record by ID.
    pub async fn find(&self, content_type: ContentType, id: RecordId) -> AppResult<ContentRecord> {
        self.content_repo
            .find_by_id(content_type, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("{content_type} {id} not found")))
    }

    /// All records of a type, newest first.
    pub async fn list(&self, content_type: ContentType) -> AppResult<Vec<ContentRecord>> {
        self.content_repo.find_all(content_type).await
    }

    /// Count records of a type.
    pub async fn count(&self, content_type: ContentType) -> AppResult<i64> {
        self.content_repo.count(content_type).await
    }

    /// The attachment exactly as `record` saw it: the snapshot at the
    /// record's pinned attachment version.
    pub async fn attachment<R>(&self, record: &R) -> AppResult<Option<AttachmentVersion>>
    where
        R: HasAttachment + Sync,
    {
        match record.attachment_ref() {
            Some((id, version)) => Ok(Some(self.attachments.version_at(id, version).await?)),
            None => Ok(None),
        }
    }

    /// The record-visible attachment path, e.g. `/test.jpg`.
    pub async fn attachment_file_path<R>(&self, record: &R) -> AppResult<Option<String>>
    where
        R: HasAttachment + Sync,
    {
        Ok(self
            .attachment(record)
            .await?
            .map(|version| display_file_path(&version.file_path)))
    }

    /// The section the record's attachment is filed under.
    pub async fn attachment_section<R>(&self, record: &R) -> AppResult<Option<Section>>
    where
        R: HasAttachment + Sync,
    {
        match self.attachment(record).await? {
            Some(version) => Ok(Some(self.attachments.require_section(version.section_id).await?)),
            None => Ok(None),
        }
    }

    /// Validate attachment input and stage any new content.
    async fn plan(
        &self,
        content_type: ContentType,
        existing: Option<Attachment>,
        params: &AttachmentParams,
    ) -> AppResult<AttachmentPlan> {
        if params.is_empty() {
            return Ok(AttachmentPlan::Keep);
        }
        if !content_type.belongs_to_attachment() {
            return Err(AppError::validation(format!(
                "{content_type} records cannot have an attachment"
            )));
        }

        match existing {
            None => {
                let (section_id, upload) = match (params.section_id, &params.file) {
                    (Some(section_id), Some(upload)) => (section_id, upload),
                    (None, _) => {
                        return Err(AppError::missing_section_or_file(
                            "An attachment section is required to save a file",
                        ));
                    }
                    (Some(_), None) => {
                        return Err(AppError::missing_section_or_file(
                            "An attachment file is required when a section is given",
                        ));
                    }
                };

                self.attachments.require_section(section_id).await?;
                let file_path = params
                    .file_path
                    .clone()
                    .unwrap_or_else(|| upload.original_filename.clone());
                let staged = self.attachments.stage(upload).await?;

                Ok(AttachmentPlan::Create {
                    section_id,
                    file_path,
                    staged,
                })
            }
            Some(current) => {
                if let Some(section_id) = params.section_id {
                    self.attachments.require_section(section_id).await?;
                }
                let staged = match &params.file {
                    Some(upload) => Some(self.attachments.stage(upload).await?),
                    None => None,
                };

                Ok(AttachmentPlan::Update { current, staged })
            }
        }
    }

    /// Carry out a plan on `conn`. Returns the attachment the record should
    /// now point at, or `None` to keep its current pointer.
    async fn apply(
        &self,
        conn: &mut SqliteConnection,
        plan: &AttachmentPlan,
        params: &AttachmentParams,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Attachment>> {
        match plan {
            AttachmentPlan::Keep => Ok(None),
            AttachmentPlan::Create {
                section_id,
                file_path,
                staged,
            } => {
                let attachment = self
                    .attachments
                    .insert_in(conn, *section_id, file_path, staged, now)
                    .await?;
                Ok(Some(attachment))
            }
            AttachmentPlan::Update { current, staged } => {
                self.attachments
                    .apply_in(
                        conn,
                        current,
                        params.section_id,
                        params.file_path.as_deref(),
                        staged.as_ref(),
                        now,
                    )
                    .await
            }
        }
    }

    /// Drop staged content when the save did not commit.
    async fn finish<T>(&self, plan: &AttachmentPlan, result: AppResult<T>) -> AppResult<T> {
        if result.is_err() {
            if let Some(staged) = plan.staged() {
                self.attachments.discard(staged).await;
            }
        }
        result
    }
}

fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("Name must not be blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use attachhub_core::error::ErrorKind;
    use attachhub_entity::attachment::FileUpload;

    use super::*;
    use crate::testing::{stored_files, test_services};

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Foo").is_ok());
        assert_eq!(validate_name(" \t").unwrap_err().kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let (_dir, services) = test_services().await;

        let err = services
            .content
            .create(ContentType::ATTACHABLE, NewContent::named(""))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(services.content.count(ContentType::ATTACHABLE).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unversioned_rename_keeps_record_version() {
        let (_dir, services) = test_services().await;
        let root = services.sections.root().await.unwrap();
        let ct = ContentType::ATTACHABLE;

        let record = services
            .content
            .create(
                ct,
                NewContent::named("Foo").with_attachment(
                    AttachmentParams::default()
                        .section(root.id)
                        .file(FileUpload::new("foo.txt", None, &b"foo"[..])),
                ),
            )
            .await
            .unwrap();

        let renamed = services
            .content
            .update(ct, record.id, ContentChanges::rename("Bar"))
            .await
            .unwrap();

        assert_eq!(renamed.name, "Bar");
        assert_eq!(renamed.version, 1);
        assert_eq!(renamed.attachment_id, record.attachment_id);
        assert_eq!(renamed.attachment_version, Some(1));
        assert_eq!(services.attachments.count_versions().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_of_missing_record_is_not_found() {
        let (_dir, services) = test_services().await;

        let err = services
            .content
            .update(
                ContentType::VERSIONED_ATTACHABLE,
                RecordId::new(42),
                ContentChanges::rename("Nope"),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_failed_snapshot_discards_staged_content() {
        let (dir, services) = test_services().await;
        let root = services.sections.root().await.unwrap();
        let ct = ContentType::VERSIONED_ATTACHABLE;

        let record = services
            .content
            .create(
                ct,
                NewContent::named("Foo").with_attachment(
                    AttachmentParams::default()
                        .section(root.id)
                        .file(FileUpload::new("foo.txt", None, &b"first"[..])),
                ),
            )
            .await
            .unwrap();
        sqlx::query("DROP TABLE versioned_attachable_versions")
            .execute(services.db.pool())
            .await
            .unwrap();

        let result = services
            .content
            .update(
                ct,
                record.id,
                ContentChanges::attachment(
                    AttachmentParams::default().file(FileUpload::new("foo.txt", None, &b"second"[..])),
                ),
            )
            .await;

        assert!(result.is_err());
        assert_eq!(services.attachments.count().await.unwrap(), 1);
        assert_eq!(services.attachments.count_versions().await.unwrap(), 1);
        assert_eq!(services.content.find(ct, record.id).await.unwrap(), record);
        assert_eq!(stored_files(&dir.path().join("files")), 1);
    }
}
