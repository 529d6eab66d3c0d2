//! Renders account mails and hands them to the configured adapter.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use dashx_core::config::MailConfig;
use dashx_core::config::mail::FrontendConfig;
use dashx_core::result::AppResult;

use super::adapter::{HttpMailAdapter, LogMailAdapter, MailAdapter, MailMessage, SmtpMailAdapter};

const CONFIRM_SUBJECT: &str = "[DashboardX] Confirm Account";
const RESET_SUBJECT: &str = "[DashboardX] Reset Password";

/// Sends confirmation and password reset mails in the background.
///
/// Delivery failures are logged and never reach the caller.
#[derive(Debug, Clone)]
pub struct MailService {
    adapter: Arc<dyn MailAdapter>,
    frontend: FrontendConfig,
    enabled: bool,
}

impl MailService {
    pub fn new(config: &MailConfig, adapter: Arc<dyn MailAdapter>) -> Self {
        Self {
            adapter,
            frontend: config.frontend.clone(),
            enabled: config.enabled,
        }
    }

    /// Build the service with the adapter named by `mail.provider`.
    pub fn from_config(config: &MailConfig) -> AppResult<Self> {
        let adapter: Arc<dyn MailAdapter> = match config.provider.as_str() {
            "smtp" => Arc::new(SmtpMailAdapter::new(config)?),
            "http" => Arc::new(HttpMailAdapter::new(config)?),
            _ => Arc::new(LogMailAdapter),
        };
        Ok(Self::new(config, adapter))
    }

    pub fn send_confirm_account(&self, to: &str, token: &str) -> Option<JoinHandle<()>> {
        let link = link(&self.frontend.confirm_account_url, token);
        self.dispatch(MailMessage {
            to: to.to_string(),
            subject: CONFIRM_SUBJECT.to_string(),
            html: render("Confirm Account", &link, "activate your account"),
        })
    }

    pub fn send_password_reset(&self, to: &str, token: &str) -> Option<JoinHandle<()>> {
        let link = link(&self.frontend.reset_password_url, token);
        self.dispatch(MailMessage {
            to: to.to_string(),
            subject: RESET_SUBJECT.to_string(),
            html: render("Reset Password", &link, "reset your password"),
        })
    }

    fn dispatch(&self, message: MailMessage) -> Option<JoinHandle<()>> {
        if !self.enabled {
            debug!(to = %message.to, subject = %message.subject, "Mail disabled, message dropped");
            return None;
        }

        let adapter = Arc::clone(&self.adapter);
        Some(tokio::spawn(async move {
            if let Err(e) = adapter.send(&message).await {
                warn!(to = %message.to, subject = %message.subject, error = %e, "Failed to send mail");
            }
        }))
    }
}

fn link(base: &str, token: &str) -> String {
    format!("{}/{token}", base.trim_end_matches('/'))
}

fn render(title: &str, link: &str, purpose: &str) -> String {
    format!(
        r#"<div style="font-family: Verdana, sans-serif;"><h2>{title}</h2><p>Click <a target="_blank" href="{link}">link</a> to {purpose}</p></div>"#
    )
}
