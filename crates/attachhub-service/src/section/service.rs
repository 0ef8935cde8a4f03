//! Storage sections that attachments are filed under.

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::info;

use attachhub_core::error::{AppError, ErrorKind};
use attachhub_core::result::AppResult;
use attachhub_core::types::id::SectionId;
use attachhub_database::repositories::section::SectionRepository;
use attachhub_entity::section::{CreateSection, Section};
use attachhub_storage::sanitize::sanitize_file_path;

/// Name given to the lazily created root section.
const ROOT_SECTION_NAME: &str = "My Site";

/// Manages storage sections.
#[derive(Debug, Clone)]
pub struct SectionService {
    /// Pool used for writes.
    pool: SqlitePool,
    /// Section repository.
    section_repo: Arc<SectionRepository>,
}

impl SectionService {
    /// Creates a new section service.
    pub fn new(pool: SqlitePool, section_repo: Arc<SectionRepository>) -> Self {
        Self { pool, section_repo }
    }

    /// The root section, created on first use.
    pub async fn root(&self) -> AppResult<Section> {
        if let Some(root) = self.section_repo.find_by_path("/").await? {
            return Ok(root);
        }

        let mut conn = self.pool.acquire().await?;
        let created = self
            .section_repo
            .create(
                &mut conn,
                &CreateSection {
                    name: ROOT_SECTION_NAME.to_string(),
                    parent_id: None,
                    path: "/".to_string(),
                },
            )
            .await;

        match created {
            Ok(root) => {
                info!(section_id = %root.id, "Root section created");
                Ok(root)
            }
            // Created concurrently by another caller.
            Err(e) if e.kind == ErrorKind::Conflict => self
                .section_repo
                .find_by_path("/")
                .await?
                .ok_or_else(|| AppError::internal("Root section vanished after conflict")),
            Err(e) => Err(e),
        }
    }

    /// Create a section below `parent_id`, or below the root when `None`.
    pub async fn create(&self, name: &str, parent_id: Option<SectionId>) -> AppResult<Section> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Section name must not be blank"));
        }

        let parent = match parent_id {
            Some(id) => self.find(id).await?,
            None => self.root().await?,
        };

        let data = CreateSection {
            name: name.to_string(),
            parent_id: Some(parent.id),
            path: parent.child_path(&sanitize_file_path(name)),
        };

        let mut conn = self.pool.acquire().await?;
        let section = self.section_repo.create(&mut conn, &data).await?;

        info!(section_id = %section.id, path = %section.path, "Section created");
        Ok(section)
    }

    /// Find a section by ID.
    pub async fn find(&self, id: SectionId) -> AppResult<Section> {
        self.section_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Section {id} not found")))
    }

    /// All sections ordered by path.
    pub async fn list(&self) -> AppResult<Vec<Section>> {
        self.section_repo.find_all().await
    }
}
