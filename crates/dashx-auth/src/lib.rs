//! # dashx-auth
//!
//! Authentication building blocks for DashboardX.
//!
//! ## Modules
//!
//! - `jwt`: claims and the per-kind signing table
//! - `password`: Argon2id password and subject hashing
//! - `store`: key-value records for tokens, pending registrations and user actions
//! - `crypto`: AES-256-GCM encryption of broker credentials
//! - `service`: the token lifecycle exposed to the rest of the system

pub mod crypto;
pub mod jwt;
pub mod password;
pub mod service;
pub mod store;

pub use crypto::CryptoService;
pub use jwt::{Claims, JwtCodec, TokenKind};
pub use password::PasswordHasher;
pub use service::{AuthService, TokenPair};
