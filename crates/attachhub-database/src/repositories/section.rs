//! Section repository implementation.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use attachhub_core::error::{AppError, ErrorKind};
use attachhub_core::result::AppResult;
use attachhub_core::types::id::SectionId;
use attachhub_entity::section::{CreateSection, Section};

/// Repository for storage sections.
#[derive(Debug, Clone)]
pub struct SectionRepository {
    pool: SqlitePool,
}

impl SectionRepository {
    /// Create a new section repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a section by ID.
    pub async fn find_by_id(&self, id: SectionId) -> AppResult<Option<Section>> {
        sqlx::query_as::<_, Section>("SELECT * FROM sections WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find section", e))
    }

    /// Find a section by its materialized path.
    pub async fn find_by_path(&self, path: &str) -> AppResult<Option<Section>> {
        sqlx::query_as::<_, Section>("SELECT * FROM sections WHERE path = ?")
            .bind(path)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find section by path", e)
            })
    }

    /// List sections ordered by path.
    pub async fn find_all(&self) -> AppResult<Vec<Section>> {
        sqlx::query_as::<_, Section>("SELECT * FROM sections ORDER BY path ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list sections", e))
    }

    /// Create a new section.
    pub async fn create(
        &self,
        conn: &mut SqliteConnection,
        data: &CreateSection,
    ) -> AppResult<Section> {
        sqlx::query_as::<_, Section>(
            "INSERT INTO sections (name, parent_id, path, created_at) \
             VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(&data.name)
        .bind(data.parent_id)
        .bind(&data.path)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::conflict(format!("Section '{}' already exists", data.path))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create section", e),
        })
    }

    /// Count sections.
    pub async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM sections")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count sections", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_pool;

    #[tokio::test]
    async fn test_create_and_find() {
        let (_dir, db) = test_pool().await;
        let repo = SectionRepository::new(db.pool().clone());

        let mut conn = db.pool().acquire().await.unwrap();
        let root = repo
            .create(
                &mut conn,
                &CreateSection {
                    name: "My Site".into(),
                    parent_id: None,
                    path: "/".into(),
                },
            )
            .await
            .unwrap();

        let found = repo.find_by_id(root.id).await.unwrap().unwrap();
        assert_eq!(found, root);
        assert_eq!(repo.find_by_path("/").await.unwrap(), Some(root.clone()));

        let dup = repo
            .create(
                &mut conn,
                &CreateSection {
                    name: "Again".into(),
                    parent_id: None,
                    path: "/".into(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(dup.kind, ErrorKind::Conflict);
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
