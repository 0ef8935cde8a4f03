//! # attachhub-core
//!
//! Core crate for AttachHub. Contains the unified error system,
//! configuration schemas, typed identifiers, and the traits that the
//! storage and service crates implement or consume.
//!
//! This crate has **no** internal dependencies on other AttachHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
