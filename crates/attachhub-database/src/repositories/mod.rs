//! Repository implementations for all AttachHub entities.

pub mod attachment;
pub mod content;
pub mod section;

pub use attachment::AttachmentRepository;
pub use content::ContentRecordRepository;
pub use section::SectionRepository;
