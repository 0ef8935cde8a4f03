//! Attachment repository implementation.
//!
//! The attachment row carries the current state; `attachment_versions`
//! carries one immutable snapshot per version. [`AttachmentRepository::bump_version`]
//! and [`AttachmentRepository::snapshot`] must run on the same transaction so the
//! counter and the log never drift apart.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use attachhub_core::error::{AppError, ErrorKind};
use attachhub_core::result::AppResult;
use attachhub_core::types::id::{AttachmentId, SectionId};
use attachhub_entity::attachment::{Attachment, AttachmentVersion};

/// Column values for a new attachment or a new attachment state.
#[derive(Debug, Clone)]
pub struct AttachmentState {
    /// Section the file is filed under.
    pub section_id: SectionId,
    /// Sanitized path.
    pub file_path: String,
    /// Storage key of the content.
    pub file_location: String,
    /// Original file name.
    pub file_name: String,
    /// MIME type.
    pub file_type: Option<String>,
    /// Content size in bytes.
    pub file_size: i64,
}

impl AttachmentState {
    /// The state an existing attachment is currently in.
    pub fn of(attachment: &Attachment) -> Self {
        Self {
            section_id: attachment.section_id,
            file_path: attachment.file_path.clone(),
            file_location: attachment.file_location.clone(),
            file_name: attachment.file_name.clone(),
            file_type: attachment.file_type.clone(),
            file_size: attachment.file_size,
        }
    }
}

/// Repository for attachments and their version log.
#[derive(Debug, Clone)]
pub struct AttachmentRepository {
    pool: SqlitePool,
}

impl AttachmentRepository {
    /// Create a new attachment repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find an attachment by ID.
    pub async fn find_by_id(&self, id: AttachmentId) -> AppResult<Option<Attachment>> {
        sqlx::query_as::<_, Attachment>("SELECT * FROM attachments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find attachment", e))
    }

    /// Insert a new attachment at version 1.
    pub async fn create(
        &self,
        conn: &mut SqliteConnection,
        state: &AttachmentState,
        now: DateTime<Utc>,
    ) -> AppResult<Attachment> {
        let attachment = sqlx::query_as::<_, Attachment>(
            "INSERT INTO attachments \
             (section_id, file_path, file_location, file_name, file_type, file_size, version, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?) RETURNING *",
        )
        .bind(state.section_id)
        .bind(&state.file_path)
        .bind(&state.file_location)
        .bind(&state.file_name)
        .bind(&state.file_type)
        .bind(state.file_size)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create attachment", e))?;

        debug!(attachment_id = %attachment.id, "Inserted attachment");
        Ok(attachment)
    }

    /// Replace the current state and advance the version counter by one.
    pub async fn bump_version(
        &self,
        conn: &mut SqliteConnection,
        id: AttachmentId,
        state: &AttachmentState,
        now: DateTime<Utc>,
    ) -> AppResult<Attachment> {
        sqlx::query_as::<_, Attachment>(
            "UPDATE attachments SET section_id = ?, file_path = ?, file_location = ?, \
             file_name = ?, file_type = ?, file_size = ?, version = version + 1, updated_at = ? \
             WHERE id = ? RETURNING *",
        )
        .bind(state.section_id)
        .bind(&state.file_path)
        .bind(&state.file_location)
        .bind(&state.file_name)
        .bind(&state.file_type)
        .bind(state.file_size)
        .bind(now)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update attachment", e))?
        .ok_or_else(|| AppError::not_found(format!("Attachment {id} not found")))
    }

    /// Append the version-log entry for the attachment's current state.
    pub async fn snapshot(
        &self,
        conn: &mut SqliteConnection,
        attachment: &Attachment,
    ) -> AppResult<AttachmentVersion> {
        sqlx::query_as::<_, AttachmentVersion>(
            "INSERT INTO attachment_versions \
             (attachment_id, version, section_id, file_path, file_location, file_name, file_type, file_size, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(attachment.id)
        .bind(attachment.version)
        .bind(attachment.section_id)
        .bind(&attachment.file_path)
        .bind(&attachment.file_location)
        .bind(&attachment.file_name)
        .bind(&attachment.file_type)
        .bind(attachment.file_size)
        .bind(attachment.updated_at)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::conflict(format!(
                    "Attachment {} already has version {}",
                    attachment.id, attachment.version
                ))
            }
            _ => AppError::with_source(
                ErrorKind::Database,
                "Failed to create attachment version",
                e,
            ),
        })
    }

    // -- Versions --

    /// Find a specific version of an attachment.
    pub async fn find_version(
        &self,
        id: AttachmentId,
        version: i32,
    ) -> AppResult<Option<AttachmentVersion>> {
        sqlx::query_as::<_, AttachmentVersion>(
            "SELECT * FROM attachment_versions WHERE attachment_id = ? AND version = ?",
        )
        .bind(id)
        .bind(version)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find attachment version", e)
        })
    }

    /// List all versions of an attachment, oldest first.
    pub async fn find_versions(&self, id: AttachmentId) -> AppResult<Vec<AttachmentVersion>> {
        sqlx::query_as::<_, AttachmentVersion>(
            "SELECT * FROM attachment_versions WHERE attachment_id = ? ORDER BY version ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list attachment versions", e)
        })
    }

    /// Count attachments.
    pub async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM attachments")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count attachments", e)
            })
    }

    /// Count attachment versions across all attachments.
    pub async fn count_versions(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM attachment_versions")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count attachment versions", e)
            })
    }
}

#[cfg(test)]
mod tests {
    use attachhub_entity::section::CreateSection;

    use super::*;
    use crate::repositories::section::SectionRepository;
    use crate::testing::test_pool;

    async fn seed_section(pool: &SqlitePool) -> SectionId {
        let mut conn = pool.acquire().await.unwrap();
        SectionRepository::new(pool.clone())
            .create(
                &mut conn,
                &CreateSection {
                    name: "root".into(),
                    parent_id: None,
                    path: "/".into(),
                },
            )
            .await
            .unwrap()
            .id
    }

    fn state(section_id: SectionId, path: &str, location: &str) -> AttachmentState {
        AttachmentState {
            section_id,
            file_path: path.into(),
            file_location: location.into(),
            file_name: "foo.jpg".into(),
            file_type: Some("image/jpeg".into()),
            file_size: 17,
        }
    }

    #[tokio::test]
    async fn test_bump_and_snapshot_share_a_transaction() {
        let (_dir, db) = test_pool().await;
        let repo = AttachmentRepository::new(db.pool().clone());
        let section_id = seed_section(db.pool()).await;

        let mut tx = db.pool().begin().await.unwrap();
        let created = repo
            .create(&mut tx, &state(section_id, "test.jpg", "loc/1"), Utc::now())
            .await
            .unwrap();
        repo.snapshot(&mut tx, &created).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(created.version, 1);

        // A rolled back bump leaves both the counter and the log untouched.
        let mut tx = db.pool().begin().await.unwrap();
        let bumped = repo
            .bump_version(&mut tx, created.id, &state(section_id, "test2.jpg", "loc/1"), Utc::now())
            .await
            .unwrap();
        assert_eq!(bumped.version, 2);
        repo.snapshot(&mut tx, &bumped).await.unwrap();
        tx.rollback().await.unwrap();

        let current = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(current.version, 1);
        assert_eq!(current.file_path, "test.jpg");
        assert_eq!(repo.count_versions().await.unwrap(), 1);

        let mut tx = db.pool().begin().await.unwrap();
        let bumped = repo
            .bump_version(&mut tx, created.id, &state(section_id, "test2.jpg", "loc/1"), Utc::now())
            .await
            .unwrap();
        repo.snapshot(&mut tx, &bumped).await.unwrap();
        tx.commit().await.unwrap();

        let versions = repo.find_versions(created.id).await.unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].file_path, "test.jpg");
        assert_eq!(versions[1].file_path, "test2.jpg");
        assert_eq!(versions[1].file_location, "loc/1");
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_snapshot_is_conflict() {
        let (_dir, db) = test_pool().await;
        let repo = AttachmentRepository::new(db.pool().clone());
        let section_id = seed_section(db.pool()).await;

        let mut conn = db.pool().acquire().await.unwrap();
        let created = repo
            .create(&mut conn, &state(section_id, "a.txt", "loc/a"), Utc::now())
            .await
            .unwrap();
        repo.snapshot(&mut conn, &created).await.unwrap();
        let err = repo.snapshot(&mut conn, &created).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_bump_missing_attachment_is_not_found() {
        let (_dir, db) = test_pool().await;
        let repo = AttachmentRepository::new(db.pool().clone());
        let section_id = seed_section(db.pool()).await;

        let mut conn = db.pool().acquire().await.unwrap();
        let err = repo
            .bump_version(
                &mut conn,
                AttachmentId::new(404),
                &state(section_id, "a.txt", "loc/a"),
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(repo.find_version(AttachmentId::new(404), 1).await.unwrap().is_none());
    }
}
