//! # attachhub-storage
//!
//! Attachment content storage for AttachHub: the local filesystem provider,
//! storage key generation, MIME detection, and the file path sanitizer.

pub mod keys;
pub mod mime;
pub mod providers;
pub mod sanitize;

pub use providers::LocalStorageProvider;
pub use sanitize::{display_file_path, sanitize_file_path};
