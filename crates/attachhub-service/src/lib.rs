//! # attachhub-service
//!
//! Business logic layer for AttachHub. Each service orchestrates
//! repositories and the storage provider to implement one use case:
//!
//! - [`AttachmentService`]: the versioned attachment store
//! - [`ContentService`]: binding content records to attachments on save
//! - [`RecordVersionService`]: historical snapshots of versioned records
//! - [`SectionService`]: storage sections
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references. [`Services`] wires the whole
//! set from configuration.

pub mod app;
pub mod attachment;
pub mod content;
pub mod section;

pub use app::Services;
pub use attachment::{AttachmentService, StagedContent};
pub use content::{ContentService, RecordVersionService};
pub use section::SectionService;
