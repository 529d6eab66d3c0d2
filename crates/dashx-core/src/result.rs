//! Convenience result type alias for DashboardX.

use crate::error::AppError;

/// A specialized `Result` type for DashboardX operations.
pub type AppResult<T> = Result<T, AppError>;
