//! Historical snapshots of versioned records.

use std::sync::Arc;

use attachhub_core::error::{AppError, ErrorKind};
use attachhub_core::result::AppResult;
use attachhub_core::types::id::RecordId;
use attachhub_database::repositories::content::ContentRecordRepository;
use attachhub_entity::content::{ContentRecordVersion, ContentType};

/// Reads back earlier states of versioned content records.
#[derive(Debug, Clone)]
pub struct RecordVersionService {
    /// Content record repository.
    content_repo: Arc<ContentRecordRepository>,
}

impl RecordVersionService {
    /// Creates a new record version service.
    pub fn new(content_repo: Arc<ContentRecordRepository>) -> Self {
        Self { content_repo }
    }

    /// The record exactly as it was saved at `version`.
    ///
    /// The snapshot keeps its own attachment pointer, so resolving its
    /// attachment yields the file as it was at that save.
    pub async fn as_of_version(
        &self,
        content_type: ContentType,
        id: RecordId,
        version: i32,
    ) -> AppResult<ContentRecordVersion> {
        ensure_versioned(content_type)?;
        self.require_record(content_type, id).await?;

        self.content_repo
            .find_version(content_type, id, version)
            .await?
            .ok_or_else(|| AppError::invalid_version(version))
    }

    /// Every snapshot of a record, oldest first.
    pub async fn versions(
        &self,
        content_type: ContentType,
        id: RecordId,
    ) -> AppResult<Vec<ContentRecordVersion>> {
        ensure_versioned(content_type)?;
        self.require_record(content_type, id).await?;
        self.content_repo.find_versions(content_type, id).await
    }

    async fn require_record(&self, content_type: ContentType, id: RecordId) -> AppResult<()> {
        match self.content_repo.find_by_id(content_type, id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::not_found(format!("{content_type} {id} not found"))),
        }
    }
}

fn ensure_versioned(content_type: ContentType) -> AppResult<()> {
    if content_type.versioned {
        Ok(())
    } else {
        Err(AppError::new(
            ErrorKind::InvalidVersion,
            format!("{content_type} records are not versioned"),
        ))
    }
}
