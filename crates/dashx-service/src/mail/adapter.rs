//! Delivery backends for rendered messages.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address as MailAddress, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Serialize;
use tracing::{debug, info, warn};

use dashx_core::config::MailConfig;
use dashx_core::error::{AppError, ErrorKind};
use dashx_core::result::AppResult;

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Something that can deliver a [`MailMessage`].
#[async_trait]
pub trait MailAdapter: Send + Sync + std::fmt::Debug + 'static {
    async fn send(&self, message: &MailMessage) -> AppResult<()>;
}

/// Writes messages to the log instead of delivering them.
#[derive(Debug, Default, Clone)]
pub struct LogMailAdapter;

#[async_trait]
impl MailAdapter for LogMailAdapter {
    async fn send(&self, message: &MailMessage) -> AppResult<()> {
        info!(to = %message.to, subject = %message.subject, "Mail not delivered (log provider)");
        debug!(html = %message.html, "Mail body");
        Ok(())
    }
}

/// Delivers messages through an SMTP relay.
pub struct SmtpMailAdapter {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    relay: String,
}

impl std::fmt::Debug for SmtpMailAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailAdapter")
            .field("relay", &self.relay)
            .field("from", &self.from.to_string())
            .finish()
    }
}

impl SmtpMailAdapter {
    pub fn new(config: &MailConfig) -> AppResult<Self> {
        let smtp = &config.smtp;
        let relay_error = |e: lettre::transport::smtp::Error| {
            AppError::with_source(ErrorKind::Configuration, "Invalid SMTP relay", e)
        };

        let builder = match smtp.security.as_str() {
            "starttls" => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host).map_err(relay_error)?
            }
            "none" => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(smtp.host.as_str()),
            _ => AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host).map_err(relay_error)?,
        };

        let mut builder = builder
            .port(smtp.port)
            .timeout(Some(Duration::from_secs(10)));
        if !smtp.user.is_empty() {
            builder = builder.credentials(Credentials::new(smtp.user.clone(), smtp.password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from: sender(config)?,
            relay: format!("{}:{}", smtp.host, smtp.port),
        })
    }
}

fn sender(config: &MailConfig) -> AppResult<Mailbox> {
    let address: MailAddress = config.from_address.parse().map_err(|e| {
        AppError::with_source(ErrorKind::Configuration, "Invalid mail.from_address", e)
    })?;
    Ok(Mailbox::new(Some(config.from_name.clone()), address))
}

/// Build the MIME message for `message`, sent as HTML.
fn compose(from: &Mailbox, message: &MailMessage) -> AppResult<Message> {
    let to: Mailbox = message
        .to
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid mail recipient: {}", message.to)))?;

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(message.subject.as_str())
        .header(ContentType::TEXT_HTML)
        .body(message.html.clone())
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Failed to build mail", e))
}

#[async_trait]
impl MailAdapter for SmtpMailAdapter {
    async fn send(&self, message: &MailMessage) -> AppResult<()> {
        let email = compose(&self.from, message)?;
        self.transport.send(email).await.map_err(|e| {
            AppError::with_source(ErrorKind::ExternalService, "SMTP delivery failed", e)
        })?;

        debug!(to = %message.to, relay = %self.relay, "Mail accepted by the relay");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: Address<'a>,
    to: [Address<'a>; 1],
    subject: &'a str,
    html: &'a str,
}

/// Posts messages as JSON to a transactional mail API with bearer auth.
#[derive(Debug, Clone)]
pub struct HttpMailAdapter {
    client: reqwest::Client,
    url: String,
    api_key: String,
    from_address: String,
    from_name: String,
}

impl HttpMailAdapter {
    pub fn new(config: &MailConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build mail client", e)
            })?;

        Ok(Self {
            client,
            url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
            from_name: config.from_name.clone(),
        })
    }
}

#[async_trait]
impl MailAdapter for HttpMailAdapter {
    async fn send(&self, message: &MailMessage) -> AppResult<()> {
        let request = SendRequest {
            from: Address {
                email: &self.from_address,
                name: Some(&self.from_name),
            },
            to: [Address {
                email: &message.to,
                name: None,
            }],
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Mail request failed", e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %body, "Mail API rejected the message");
            return Err(AppError::external_service(format!(
                "Mail API responded with {status}"
            )));
        }

        debug!(to = %message.to, "Mail accepted by the API");
        Ok(())
    }
}
