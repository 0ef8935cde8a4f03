//! Storage key generation for attachment content.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Prefix under which all attachment content is stored.
pub const CONTENT_PREFIX: &str = "attachments";

/// Build a fresh, never-reused key for one piece of content.
///
/// Keys are bucketed by day (`attachments/2024/05/17/<uuid>`) so that no
/// single directory grows without bound.
pub fn new_content_key(now: DateTime<Utc>) -> String {
    format!(
        "{CONTENT_PREFIX}/{}/{}",
        now.format("%Y/%m/%d"),
        Uuid::new_v4().simple()
    )
}
