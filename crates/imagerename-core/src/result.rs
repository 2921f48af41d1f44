//! Convenience result type alias for ImageRename.

use crate::error::AppError;

/// A specialized `Result` type for ImageRename operations.
///
/// Plugin handlers, job callbacks and engine operations all return this so
/// that failures can be logged uniformly by the host.
pub type AppResult<T> = Result<T, AppError>;
