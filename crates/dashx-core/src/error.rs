//! Unified application error types for DashboardX.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Domain failures that clients see are
//! built through the named constructors below so their messages stay stable.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested resource was not found.
    NotFound,
    /// Authentication failed (missing, invalid, expired or consumed token).
    Authentication,
    /// Input validation failed.
    Validation,
    /// A conflict occurred (duplicate entry, state already present, etc.).
    Conflict,
    /// An internal server error occurred.
    Internal,
    /// A database error occurred.
    Database,
    /// A key-value store error occurred.
    Cache,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An external service error occurred.
    ExternalService,
    /// The service or endpoint is temporarily unavailable.
    ServiceUnavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Authentication => write!(f, "AUTHENTICATION"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::Database => write!(f, "DATABASE"),
            Self::Cache => write!(f, "CACHE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::ExternalService => write!(f, "EXTERNAL_SERVICE"),
            Self::ServiceUnavailable => write!(f, "SERVICE_UNAVAILABLE"),
        }
    }
}

/// Client-visible messages of the domain errors.
pub mod messages {
    pub const USER_NOT_FOUND: &str = "user not found";
    pub const INVALID_PASSWORD: &str = "invalid user password";
    pub const EMAIL_EXISTS: &str = "email is already taken";
    pub const MISSING_AUTH_TOKEN: &str = "missing authorization token";
    pub const INVALID_REFRESH_TOKEN: &str = "refresh token is invalid";
    pub const USER_CREATION: &str = "could not create a user";
    pub const NO_AWAITING_CONFIRM: &str = "account does not await to be confirmed";
    pub const CONFIRMATION_REQUIRED: &str = "email has to be verified";
    pub const UNEXPECTED: &str = "something went wrong";
    pub const UNAUTHORIZED: &str = "could not authorize a user";
    pub const TOKEN_NOT_FOUND: &str = "token no longer applies";
    pub const ENDPOINT_DISABLED: &str = "the endpoint has been temporarily disabled";
    pub const BROKER_NOT_FOUND: &str = "broker not found";
    pub const DEVICE_NOT_FOUND: &str = "device not found";
    pub const CONTROL_NOT_FOUND: &str = "device control not found";
    pub const CONTROL_STATE_EXISTS: &str = "device already has a state control";
    pub const NO_BROKER_CREDENTIALS: &str = "both username and password have to be provided";
}

/// The unified application error used throughout DashboardX.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns `true` when this error carries the given client-visible message.
    pub fn is(&self, message: &str) -> bool {
        self.message == message
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cache, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn external_service(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExternalService, message)
    }

    // ── Authentication ─────────────────────────────────────────

    /// Generic failure returned for every rejected credential.
    pub fn unauthorized() -> Self {
        Self::authentication(messages::UNAUTHORIZED)
    }

    pub fn missing_auth_token() -> Self {
        Self::authentication(messages::MISSING_AUTH_TOKEN)
    }

    /// A single-use token was never issued or has already been consumed.
    pub fn token_not_found() -> Self {
        Self::authentication(messages::TOKEN_NOT_FOUND)
    }

    /// A stored single-use token does not match the presented one.
    pub fn invalid_refresh_token() -> Self {
        Self::authentication(messages::INVALID_REFRESH_TOKEN)
    }

    // ── Users ──────────────────────────────────────────────────

    pub fn user_not_found() -> Self {
        Self::not_found(messages::USER_NOT_FOUND)
    }

    pub fn invalid_password() -> Self {
        Self::validation(messages::INVALID_PASSWORD)
    }

    pub fn email_exists() -> Self {
        Self::conflict(messages::EMAIL_EXISTS)
    }

    pub fn user_creation() -> Self {
        Self::validation(messages::USER_CREATION)
    }

    pub fn no_awaiting_confirm() -> Self {
        Self::conflict(messages::NO_AWAITING_CONFIRM)
    }

    pub fn confirmation_required() -> Self {
        Self::conflict(messages::CONFIRMATION_REQUIRED)
    }

    pub fn endpoint_disabled() -> Self {
        Self::new(ErrorKind::ServiceUnavailable, messages::ENDPOINT_DISABLED)
    }

    pub fn unexpected() -> Self {
        Self::internal(messages::UNEXPECTED)
    }

    // ── Brokers / devices ──────────────────────────────────────

    pub fn broker_not_found() -> Self {
        Self::not_found(messages::BROKER_NOT_FOUND)
    }

    pub fn device_not_found() -> Self {
        Self::not_found(messages::DEVICE_NOT_FOUND)
    }

    pub fn control_not_found() -> Self {
        Self::not_found(messages::CONTROL_NOT_FOUND)
    }

    pub fn control_state_exists() -> Self {
        Self::conflict(messages::CONTROL_STATE_EXISTS)
    }

    pub fn no_broker_credentials() -> Self {
        Self::validation(messages::NO_BROKER_CREDENTIALS)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
