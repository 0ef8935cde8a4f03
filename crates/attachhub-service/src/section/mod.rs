//! Storage section management.

pub mod service;

pub use service::SectionService;
