//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tokio::sync::{Mutex, mpsc};
use tower::ServiceExt;

use dashx_api::{AppState, Repositories, build_app};
use dashx_cache::CacheManager;
use dashx_core::config::AppConfig;
use dashx_core::result::AppResult;
use dashx_database::memory::{
    MemoryBrokerRepository, MemoryDeviceControlRepository, MemoryDeviceRepository,
    MemoryUserRepository,
};
use dashx_realtime::EventRegistry;
use dashx_service::{MailAdapter, MailMessage, MailService};

pub const PASSWORD: &str = "secret-password";

/// Keeps every outgoing mail for inspection.
#[derive(Debug)]
struct RecordingMailAdapter {
    tx: mpsc::UnboundedSender<MailMessage>,
}

#[async_trait]
impl MailAdapter for RecordingMailAdapter {
    async fn send(&self, message: &MailMessage) -> AppResult<()> {
        let _ = self.tx.send(message.clone());
        Ok(())
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.access.secret = "it-access".into();
    config.auth.refresh.secret = "it-refresh".into();
    config.auth.confirm.secret = "it-confirm".into();
    config.auth.reset.secret = "it-reset".into();
    config.auth.password.memory_kib = 1024;
    config.auth.password.iterations = 1;
    config.auth.password.parallelism = 1;
    config.crypto.brokers_aes_key = "11".repeat(32);
    config.mail.frontend.confirm_account_url = "http://app.test/confirm".into();
    config.mail.frontend.reset_password_url = "http://app.test/reset".into();
    config.realtime.channel_buffer_size = 16;
    config
}

/// Test application context
pub struct TestApp {
    pub router: Router,
    pub events: EventRegistry,
    outbox: Mutex<mpsc::UnboundedReceiver<MailMessage>>,
}

/// Access and refresh token of a signed-in user.
pub struct Session {
    pub access: String,
    pub refresh: String,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// `name=value` part of the first `Set-Cookie` header for `name`.
    pub fn cookie(&self, name: &str) -> Option<String> {
        let prefix = format!("{name}=");
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(&prefix))
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let repos = Repositories {
            users: Arc::new(MemoryUserRepository::new()),
            brokers: Arc::new(MemoryBrokerRepository::new()),
            devices: Arc::new(MemoryDeviceRepository::new()),
            controls: Arc::new(MemoryDeviceControlRepository::new()),
        };
        let (tx, rx) = mpsc::unbounded_channel();
        let mail = MailService::new(&config.mail, Arc::new(RecordingMailAdapter { tx }));

        let state = AppState::new(config, repos, CacheManager::in_memory(), mail)
            .expect("Failed to build state");
        let events = state.events.clone();

        Self {
            router: build_app(state),
            events,
            outbox: Mutex::new(rx),
        }
    }

    /// Next mail sent by the app.
    pub async fn next_mail(&self) -> MailMessage {
        let mut outbox = self.outbox.lock().await;
        tokio::time::timeout(Duration::from_secs(2), outbox.recv())
            .await
            .expect("No mail was sent")
            .expect("Mail channel closed")
    }

    /// Token at the end of the link of the next mail.
    pub async fn next_mail_token(&self) -> String {
        let mail = self.next_mail().await;
        let href = mail.html.split("href=\"").nth(1).expect("Mail has no link");
        let url = href.split('"').next().expect("Unterminated link");
        url.rsplit('/').next().expect("Empty link").to_string()
    }

    /// Register, confirm and log in a user.
    pub async fn sign_up(&self, email: &str) -> Session {
        let response = self
            .request(
                "POST",
                "/api/v1/users/register",
                Some(serde_json::json!({
                    "name": "Tester",
                    "email": email,
                    "password": PASSWORD,
                })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::ACCEPTED);

        let confirm = self.next_mail_token().await;
        let response = self
            .request("POST", "/api/v1/users/confirm-account", None, Some(&confirm))
            .await;
        assert_eq!(response.status, StatusCode::CREATED);

        self.login(email, PASSWORD).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Session {
        let response = self
            .request(
                "POST",
                "/api/v1/users/login",
                Some(serde_json::json!({ "email": email, "password": password })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

        Session {
            access: response.body["accessToken"].as_str().unwrap().to_string(),
            refresh: response.body["refreshToken"].as_str().unwrap().to_string(),
        }
    }

    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        self.request_with_cookie(method, path, body, token, None)
            .await
    }

    pub async fn request_with_cookie(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(build_request(method, path, body, token, cookie))
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Send a request and hand back the raw response, body unread.
    pub async fn raw(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
    ) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(build_request(method, path, None, token, None))
            .await
            .expect("Failed to send request")
    }
}

fn build_request(
    method: &str,
    path: &str,
    body: Option<Value>,
    token: Option<&str>,
    cookie: Option<&str>,
) -> Request<Body> {
    let mut req = Request::builder().method(method).uri(path);

    if let Some(token) = token {
        req = req.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    if let Some(cookie) = cookie {
        req = req.header(COOKIE, cookie);
    }

    let body = match body {
        Some(body) => {
            req = req.header(CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_string(&body).expect("Failed to serialize body"))
        }
        None => Body::empty(),
    };

    req.body(body).expect("Failed to build request")
}
