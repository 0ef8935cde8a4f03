//! Section entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use attachhub_core::types::id::SectionId;

/// A storage section: the namespace an attachment is filed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Section {
    /// Unique section identifier.
    pub id: SectionId,
    /// Section name.
    pub name: String,
    /// Parent section (null for the root).
    pub parent_id: Option<SectionId>,
    /// Full materialized path (e.g., `/` or `/attachables`).
    pub path: String,
    /// When the section was created.
    pub created_at: DateTime<Utc>,
}

impl Section {
    /// Check if this is the root section (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Materialized path of a child named `name` below this section.
    pub fn child_path(&self, name: &str) -> String {
        if self.path == "/" {
            format!("/{name}")
        } else {
            format!("{}/{name}", self.path)
        }
    }
}

/// Data required to create a new section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSection {
    /// Section name.
    pub name: String,
    /// Parent section (None for root).
    pub parent_id: Option<SectionId>,
    /// Full materialized path.
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(path: &str, parent: Option<i64>) -> Section {
        Section {
            id: SectionId::new(1),
            name: "s".into(),
            parent_id: parent.map(SectionId::new),
            path: path.into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_child_path() {
        assert_eq!(section("/", None).child_path("docs"), "/docs");
        assert_eq!(section("/docs", Some(1)).child_path("pdf"), "/docs/pdf");
        assert!(section("/", None).is_root());
    }
}
