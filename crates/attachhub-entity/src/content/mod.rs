//! Content record entities.

pub mod content_type;
pub mod model;
pub mod version;

pub use content_type::ContentType;
pub use model::{ContentChanges, ContentRecord, NewContent};
pub use version::ContentRecordVersion;
