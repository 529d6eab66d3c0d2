//! Repository contracts and their PostgreSQL implementations.

pub mod broker;
pub mod device;
pub mod device_control;
pub mod user;

pub use broker::{BrokerRepository, PgBrokerRepository};
pub use device::{DeviceRepository, PgDeviceRepository};
pub use device_control::{DeviceControlRepository, PgDeviceControlRepository};
pub use user::{PgUserRepository, UserRepository};

use dashx_core::error::{AppError, ErrorKind};

/// Wrap a sqlx error with a short description of the failed operation.
pub(crate) fn db_err(context: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

/// Whether the error is a unique constraint violation.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}
