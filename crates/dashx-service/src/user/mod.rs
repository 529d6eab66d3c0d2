//! Account lifecycle: registration, login, profile and password recovery.

pub mod service;

pub use service::{NewUser, UserService};
