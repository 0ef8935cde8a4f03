//! # attachhub-entity
//!
//! Domain entity models for AttachHub. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities derive `sqlx::FromRow`.

pub mod attachment;
pub mod content;
pub mod section;
