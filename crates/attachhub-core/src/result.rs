//! Convenience result type alias for AttachHub.

use crate::error::AppError;

/// A specialized `Result` type for AttachHub operations.
pub type AppResult<T> = Result<T, AppError>;
