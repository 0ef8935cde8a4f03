//! Content records: attachment binding and record versioning.

pub mod service;
pub mod version;

pub use service::ContentService;
pub use version::RecordVersionService;
