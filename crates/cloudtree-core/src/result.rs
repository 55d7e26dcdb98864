//! Convenience result type alias for CloudTree.

use crate::error::AppError;

/// A specialized `Result` type for CloudTree operations.
pub type AppResult<T> = Result<T, AppError>;
