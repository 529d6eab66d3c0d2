//! # dashx-cache
//!
//! Key-value store providers for DashboardX. Two backends are available:
//!
//! - **memory**: in-process store using [moka](https://crates.io/crates/moka)
//!   with per-entry expiration
//! - **redis**: Redis-backed store using the [redis](https://crates.io/crates/redis) crate
//!
//! The provider is selected at runtime from configuration. Token, pending
//! registration and user-action records all live here.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::CacheManager;
