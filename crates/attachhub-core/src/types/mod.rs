//! Core type definitions used across the AttachHub workspace.

pub mod id;

pub use id::*;
