//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! `config/default.toml`, an environment overlay and `DASHX__*` variables.

pub mod app;
pub mod auth;
pub mod cache;
pub mod crypto;
pub mod database;
pub mod logging;
pub mod mail;
pub mod realtime;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, FeaturesConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::cache::CacheConfig;
pub use self::crypto::CryptoConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::mail::{MailConfig, SmtpConfig};
pub use self::realtime::RealtimeConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Key-value store settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Token and password settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Encryption keys.
    #[serde(default)]
    pub crypto: CryptoConfig,
    /// Outbound mail settings.
    #[serde(default)]
    pub mail: MailConfig,
    /// Event stream settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Optional endpoint switches.
    #[serde(default)]
    pub features: FeaturesConfig,
}

impl AppConfig {
    /// Load configuration for the given environment name.
    ///
    /// Merges `config/default`, `config/{env}` and environment variables
    /// prefixed with `DASHX__` (e.g. `DASHX__AUTH__ACCESS__SECRET`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("DASHX")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the server cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        self.auth.validate()?;
        self.crypto.brokers_key()?;

        match self.cache.provider.as_str() {
            "memory" | "redis" => {}
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown cache provider: '{other}'. Supported: memory, redis"
                )));
            }
        }

        match self.mail.provider.as_str() {
            "log" => {}
            "smtp" if !self.mail.smtp.host.is_empty() => {
                if !matches!(self.mail.smtp.security.as_str(), "tls" | "starttls" | "none") {
                    return Err(AppError::configuration(format!(
                        "Unknown mail.smtp.security: '{}'. Supported: tls, starttls, none",
                        self.mail.smtp.security
                    )));
                }
            }
            "smtp" => {
                return Err(AppError::configuration(
                    "mail.smtp.host must be set when mail.provider = \"smtp\"",
                ));
            }
            "http" if !self.mail.api_url.is_empty() => {}
            "http" => {
                return Err(AppError::configuration(
                    "mail.api_url must be set when mail.provider = \"http\"",
                ));
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown mail provider: '{other}'. Supported: log, smtp, http"
                )));
            }
        }

        Ok(())
    }
}
