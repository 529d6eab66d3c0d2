//! Argon2id hashing.

pub mod hasher;

pub use hasher::PasswordHasher;
