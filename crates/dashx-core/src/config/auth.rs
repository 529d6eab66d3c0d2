//! Token signing and password hashing configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Authentication configuration.
///
/// Every token kind has its own secret; none of them is shared.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Access tokens.
    #[serde(default = "default_access")]
    pub access: TokenKindConfig,
    /// Refresh tokens.
    #[serde(default = "default_refresh")]
    pub refresh: TokenKindConfig,
    /// Account confirmation tokens.
    #[serde(default = "default_confirm")]
    pub confirm: TokenKindConfig,
    /// Password reset tokens.
    #[serde(default)]
    pub reset: ResetTokenConfig,
    /// Argon2 parameters.
    #[serde(default)]
    pub password: PasswordConfig,
}

/// Secret and lifespan (in hours) of one token kind.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TokenKindConfig {
    /// HMAC signing secret.
    #[serde(default)]
    pub secret: String,
    /// Lifespan in hours; fractions are allowed.
    #[serde(default)]
    pub lifespan_hours: f64,
}

impl TokenKindConfig {
    pub fn lifespan(&self) -> Duration {
        Duration::from_secs_f64(self.lifespan_hours.max(0.0) * 3600.0)
    }
}

/// Secret and lifespan (in minutes) of reset tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetTokenConfig {
    /// HMAC signing secret.
    #[serde(default)]
    pub secret: String,
    /// Lifespan in minutes; fractions are allowed.
    #[serde(default = "default_reset_minutes")]
    pub lifespan_minutes: f64,
}

impl Default for ResetTokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            lifespan_minutes: default_reset_minutes(),
        }
    }
}

impl ResetTokenConfig {
    pub fn lifespan(&self) -> Duration {
        Duration::from_secs_f64(self.lifespan_minutes.max(0.0) * 60.0)
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Number of passes.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

impl AuthConfig {
    /// Check that secrets are set and pairwise distinct and lifespans are positive.
    pub fn validate(&self) -> Result<(), AppError> {
        let secrets = [
            ("access", self.access.secret.as_str()),
            ("refresh", self.refresh.secret.as_str()),
            ("confirm", self.confirm.secret.as_str()),
            ("reset", self.reset.secret.as_str()),
        ];

        for (name, secret) in &secrets {
            if secret.is_empty() {
                return Err(AppError::configuration(format!(
                    "auth.{name}.secret must be set"
                )));
            }
        }

        for (i, (a_name, a)) in secrets.iter().enumerate() {
            for (b_name, b) in secrets.iter().skip(i + 1) {
                if a == b {
                    return Err(AppError::configuration(format!(
                        "auth.{a_name}.secret and auth.{b_name}.secret must differ"
                    )));
                }
            }
        }

        let lifespans = [
            ("access", self.access.lifespan()),
            ("refresh", self.refresh.lifespan()),
            ("confirm", self.confirm.lifespan()),
            ("reset", self.reset.lifespan()),
        ];
        for (name, lifespan) in lifespans {
            if lifespan.is_zero() {
                return Err(AppError::configuration(format!(
                    "auth.{name} lifespan must be positive"
                )));
            }
        }

        Ok(())
    }
}

fn default_access() -> TokenKindConfig {
    TokenKindConfig {
        secret: String::new(),
        lifespan_hours: 0.25,
    }
}

fn default_refresh() -> TokenKindConfig {
    TokenKindConfig {
        secret: String::new(),
        lifespan_hours: 24.0 * 7.0,
    }
}

fn default_confirm() -> TokenKindConfig {
    TokenKindConfig {
        secret: String::new(),
        lifespan_hours: 24.0,
    }
}

fn default_reset_minutes() -> f64 {
    15.0
}

fn default_memory_kib() -> u32 {
    19_456
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}
