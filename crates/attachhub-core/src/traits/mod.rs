//! Core traits defined in `attachhub-core` and implemented by other crates.

pub mod attachment;
pub mod storage;

pub use attachment::HasAttachment;
pub use storage::StorageProvider;
