//! Route handlers organized by domain.

pub mod auth;
pub mod broker;
pub mod device;
pub mod events;
pub mod user;
