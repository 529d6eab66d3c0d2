//! Key builders for every record DashboardX keeps in the key-value store.
//!
//! Provider-level prefixes (e.g. `dashx:` on Redis) are added by the
//! provider, not here.

use std::fmt::Display;

use uuid::Uuid;

// ── Tokens ─────────────────────────────────────────────────

/// Key of a single stored token: `token:{kind}:{id}:{subject}`.
pub fn token(kind: impl Display, token_id: Uuid, subject: Uuid) -> String {
    format!("token:{kind}:{token_id}:{subject}")
}

/// Pattern matching every token of one kind issued to a subject.
pub fn token_sweep(kind: impl Display, subject: Uuid) -> String {
    format!("token:{kind}:*:{subject}")
}

// ── Pending registrations ──────────────────────────────────

pub fn pre_user_id(id: Uuid) -> String {
    format!("pre-user:id:{id}")
}

/// Emails are matched case-insensitively.
pub fn pre_user_email(email: &str) -> String {
    format!("pre-user:email:{}", email.to_lowercase())
}

// ── User actions ───────────────────────────────────────────

/// Key binding a one-off flow (e.g. `reset-password`) to a user.
pub fn user_action(action: &str, key_id: Uuid) -> String {
    format!("{action}:{key_id}")
}
