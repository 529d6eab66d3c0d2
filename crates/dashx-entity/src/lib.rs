//! # dashx-entity
//!
//! Domain entity models for DashboardX. Row types derive `sqlx::FromRow`;
//! the `Create*`/`Update*` structs describe mutations handed to
//! repositories. In `Update*` structs an outer `None` leaves a column
//! untouched and `Some(None)` clears a nullable column.

pub mod broker;
pub mod device;
pub mod device_control;
pub mod event;
pub mod user;
