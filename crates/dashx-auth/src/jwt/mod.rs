//! JWT claims and the per-kind signing table.

pub mod claims;
pub mod codec;

pub use claims::{Claims, TokenKind};
pub use codec::JwtCodec;
