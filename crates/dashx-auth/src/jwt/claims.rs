//! JWT claims carried by every token kind.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The four token kinds. Each has its own secret and lifespan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived, stateless credential for API calls.
    Access,
    /// Single-use, server-tracked credential exchanged for a new pair.
    Refresh,
    /// Stateless credential over a pending registration.
    Confirm,
    /// Single-use, server-tracked credential authorising a password change.
    Reset,
}

impl TokenKind {
    pub const ALL: [TokenKind; 4] = [Self::Access, Self::Refresh, Self::Confirm, Self::Reset];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
            Self::Confirm => "confirm",
            Self::Reset => "reset",
        }
    }

    /// Whether issued tokens of this kind are recorded in the key-value store.
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Refresh | Self::Reset)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: a user id, a pre-user id or a reset subject depending on kind.
    pub sub: Uuid,
    /// Token id; part of the store key for stored kinds.
    pub jti: Uuid,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiration (seconds since epoch).
    pub exp: i64,
    #[serde(default)]
    pub is_admin: bool,
    pub kind: TokenKind,
}
