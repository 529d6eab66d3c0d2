//! # dashx-database
//!
//! PostgreSQL connection management and repository implementations for
//! users, brokers, devices and device controls. Services depend on the
//! repository traits only; the `Pg*` types are wired in by the binary.
//!
//! The `memory` feature adds in-process implementations of the same traits.

pub mod connection;
#[cfg(feature = "memory")]
pub mod memory;
pub mod repositories;

pub use connection::DatabasePool;
