//! Content record repository implementation.
//!
//! One repository serves every [`ContentType`]; the table names come from
//! the type's static descriptor, never from user input.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use attachhub_core::error::{AppError, ErrorKind};
use attachhub_core::result::AppResult;
use attachhub_core::types::id::{AttachmentId, RecordId};
use attachhub_entity::content::{ContentRecord, ContentRecordVersion, ContentType};

/// Repository for content records and their snapshots.
#[derive(Debug, Clone)]
pub struct ContentRecordRepository {
    pool: SqlitePool,
}

impl ContentRecordRepository {
    /// Create a new content record repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a record by ID.
    pub async fn find_by_id(
        &self,
        content_type: ContentType,
        id: RecordId,
    ) -> AppResult<Option<ContentRecord>> {
        let sql = format!("SELECT * FROM {} WHERE id = ?", content_type.table);
        sqlx::query_as::<_, ContentRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to find {content_type} {id}"),
                    e,
                )
            })
    }

    /// List records of a type, newest first.
    pub async fn find_all(&self, content_type: ContentType) -> AppResult<Vec<ContentRecord>> {
        let sql = format!("SELECT * FROM {} ORDER BY id DESC", content_type.table);
        sqlx::query_as::<_, ContentRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to list {content_type} records"),
                    e,
                )
            })
    }

    /// Insert a new record at version 1.
    pub async fn create(
        &self,
        conn: &mut SqliteConnection,
        content_type: ContentType,
        name: &str,
        attachment: Option<(AttachmentId, i32)>,
        now: DateTime<Utc>,
    ) -> AppResult<ContentRecord> {
        let sql = format!(
            "INSERT INTO {} (name, attachment_id, attachment_version, version, created_at, updated_at) \
             VALUES (?, ?, ?, 1, ?, ?) RETURNING *",
            content_type.table
        );
        let record = sqlx::query_as::<_, ContentRecord>(&sql)
            .bind(name)
            .bind(attachment.map(|(id, _)| id))
            .bind(attachment.map(|(_, version)| version))
            .bind(now)
            .bind(now)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to create {content_type}"),
                    e,
                )
            })?;

        debug!(content_type = %content_type, record_id = %record.id, "Inserted content record");
        Ok(record)
    }

    /// Persist a record's name and attachment pointer. The record version
    /// is advanced when `bump_version` is set.
    pub async fn update(
        &self,
        conn: &mut SqliteConnection,
        content_type: ContentType,
        record: &ContentRecord,
        bump_version: bool,
        now: DateTime<Utc>,
    ) -> AppResult<ContentRecord> {
        let sql = format!(
            "UPDATE {} SET name = ?, attachment_id = ?, attachment_version = ?, \
             version = version + ?, updated_at = ? WHERE id = ? RETURNING *",
            content_type.table
        );
        sqlx::query_as::<_, ContentRecord>(&sql)
            .bind(&record.name)
            .bind(record.attachment_id)
            .bind(record.attachment_version)
            .bind(i32::from(bump_version))
            .bind(now)
            .bind(record.id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to update {content_type} {}", record.id),
                    e,
                )
            })?
            .ok_or_else(|| AppError::not_found(format!("{content_type} {} not found", record.id)))
    }

    /// Count records of a type.
    pub async fn count(&self, content_type: ContentType) -> AppResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", content_type.table);
        sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to count {content_type} records"),
                    e,
                )
            })
    }

    // -- Record versions --

    /// Append a snapshot of the record's current state.
    pub async fn snapshot(
        &self,
        conn: &mut SqliteConnection,
        content_type: ContentType,
        record: &ContentRecord,
    ) -> AppResult<ContentRecordVersion> {
        let sql = format!(
            "INSERT INTO {} (record_id, version, name, attachment_id, attachment_version, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
            content_type.versions_table
        );
        sqlx::query_as::<_, ContentRecordVersion>(&sql)
            .bind(record.id)
            .bind(record.version)
            .bind(&record.name)
            .bind(record.attachment_id)
            .bind(record.attachment_version)
            .bind(record.created_at)
            .bind(record.updated_at)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    AppError::conflict(format!(
                        "{content_type} {} already has version {}",
                        record.id, record.version
                    ))
                }
                _ => AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to snapshot {content_type} {}", record.id),
                    e,
                ),
            })
    }

    /// Find one snapshot of a record.
    pub async fn find_version(
        &self,
        content_type: ContentType,
        id: RecordId,
        version: i32,
    ) -> AppResult<Option<ContentRecordVersion>> {
        let sql = format!(
            "SELECT * FROM {} WHERE record_id = ? AND version = ?",
            content_type.versions_table
        );
        sqlx::query_as::<_, ContentRecordVersion>(&sql)
            .bind(id)
            .bind(version)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to find {content_type} {id} version {version}"),
                    e,
                )
            })
    }

    /// List all snapshots of a record, oldest first.
    pub async fn find_versions(
        &self,
        content_type: ContentType,
        id: RecordId,
    ) -> AppResult<Vec<ContentRecordVersion>> {
        let sql = format!(
            "SELECT * FROM {} WHERE record_id = ? ORDER BY version ASC",
            content_type.versions_table
        );
        sqlx::query_as::<_, ContentRecordVersion>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to list {content_type} {id} versions"),
                    e,
                )
            })
    }
}
