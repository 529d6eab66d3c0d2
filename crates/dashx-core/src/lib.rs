//! # dashx-core
//!
//! Core crate for DashboardX. Contains configuration schemas, the cache
//! provider contract and the unified error system shared by every other
//! crate.
//!
//! This crate has **no** internal dependencies on other DashboardX crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
