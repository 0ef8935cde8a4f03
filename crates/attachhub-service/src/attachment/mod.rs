//! Attachment store: versioned file content filed under sections.

pub mod service;

pub use service::{AttachmentService, StagedContent};
