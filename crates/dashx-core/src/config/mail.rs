//! Outbound mail configuration.

use serde::{Deserialize, Serialize};

/// Mail delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// When `false`, messages are rendered and dropped.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Delivery backend: `"log"` (write to the log only), `"smtp"` or `"http"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Endpoint of the transactional mail API when `provider = "http"`.
    #[serde(default)]
    pub api_url: String,
    /// Bearer key for the mail API.
    #[serde(default)]
    pub api_key: String,
    /// Relay used when `provider = "smtp"`.
    #[serde(default)]
    pub smtp: SmtpConfig,
    /// Sender address.
    #[serde(default = "default_from_address")]
    pub from_address: String,
    /// Sender display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Frontend pages the mailed links point to.
    #[serde(default)]
    pub frontend: FrontendConfig,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            provider: default_provider(),
            api_url: String::new(),
            api_key: String::new(),
            smtp: SmtpConfig::default(),
            from_address: default_from_address(),
            from_name: default_from_name(),
            frontend: FrontendConfig::default(),
        }
    }
}

/// SMTP relay connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// `"tls"` (implicit TLS), `"starttls"` or `"none"` (plaintext, local relays only).
    #[serde(default = "default_smtp_security")]
    pub security: String,
    /// Login user. No authentication is attempted when empty.
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_smtp_port(),
            security: default_smtp_security(),
            user: String::new(),
            password: String::new(),
        }
    }
}

/// Frontend URLs; the token is appended as the last path segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendConfig {
    #[serde(default = "default_confirm_url")]
    pub confirm_account_url: String,
    #[serde(default = "default_reset_url")]
    pub reset_password_url: String,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            confirm_account_url: default_confirm_url(),
            reset_password_url: default_reset_url(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_provider() -> String {
    "log".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

fn default_smtp_security() -> String {
    "tls".to_string()
}

fn default_from_address() -> String {
    "no-reply@dashboardx.local".to_string()
}

fn default_from_name() -> String {
    "DashboardX".to_string()
}

fn default_confirm_url() -> String {
    "http://localhost:3000/auth/confirm-account".to_string()
}

fn default_reset_url() -> String {
    "http://localhost:3000/auth/reset-password".to_string()
}
