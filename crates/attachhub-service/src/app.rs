//! Service wiring.

use std::sync::Arc;

use tracing::info;

use attachhub_core::config::{AppConfig, StorageConfig};
use attachhub_core::error::AppError;
use attachhub_core::result::AppResult;
use attachhub_core::traits::storage::StorageProvider;
use attachhub_database::DatabasePool;
use attachhub_database::migration::run_migrations;
use attachhub_database::repositories::attachment::AttachmentRepository;
use attachhub_database::repositories::content::ContentRecordRepository;
use attachhub_database::repositories::section::SectionRepository;
use attachhub_storage::LocalStorageProvider;

use crate::attachment::AttachmentService;
use crate::content::{ContentService, RecordVersionService};
use crate::section::SectionService;

/// The full set of services sharing one database pool and one storage
/// provider.
#[derive(Debug, Clone)]
pub struct Services {
    /// Database pool.
    pub db: DatabasePool,
    /// Content storage.
    pub storage: Arc<dyn StorageProvider>,
    /// Storage sections.
    pub sections: Arc<SectionService>,
    /// Versioned attachments.
    pub attachments: Arc<AttachmentService>,
    /// Content records.
    pub content: Arc<ContentService>,
    /// Record snapshots.
    pub record_versions: Arc<RecordVersionService>,
}

impl Services {
    /// Wire the services over an existing pool and storage provider.
    pub fn new(db: &DatabasePool, storage: Arc<dyn StorageProvider>, config: StorageConfig) -> Self {
        let pool = db.pool().clone();

        // ── Repositories ─────────────────────────────────────────
        let section_repo = Arc::new(SectionRepository::new(pool.clone()));
        let attachment_repo = Arc::new(AttachmentRepository::new(pool.clone()));
        let content_repo = Arc::new(ContentRecordRepository::new(pool.clone()));

        // ── Services ─────────────────────────────────────────────
        let sections = Arc::new(SectionService::new(pool.clone(), Arc::clone(&section_repo)));
        let attachments = Arc::new(AttachmentService::new(
            pool.clone(),
            attachment_repo,
            section_repo,
            Arc::clone(&storage),
            config,
        ));
        let content = Arc::new(ContentService::new(
            pool,
            Arc::clone(&content_repo),
            Arc::clone(&attachments),
        ));
        let record_versions = Arc::new(RecordVersionService::new(content_repo));

        Self {
            db: db.clone(),
            storage,
            sections,
            attachments,
            content,
            record_versions,
        }
    }

    /// Connect to the database, apply migrations, open the local storage
    /// root, and wire the services. Fails if either backend reports itself
    /// unhealthy.
    pub async fn bootstrap(config: &AppConfig) -> AppResult<Self> {
        let db = DatabasePool::connect(&config.database).await?;
        run_migrations(db.pool()).await?;
        if !db.health_check().await? {
            return Err(AppError::database("Database health check failed"));
        }

        let storage = LocalStorageProvider::new(&config.storage.root_path).await?;
        if !storage.health_check().await? {
            return Err(AppError::storage(format!(
                "Storage root is not a usable directory: {}",
                storage.root().display()
            )));
        }
        info!(root = %storage.root().display(), "Local storage ready");

        Ok(Self::new(&db, Arc::new(storage), config.storage.clone()))
    }
}
