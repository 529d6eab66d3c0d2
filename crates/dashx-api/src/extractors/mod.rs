//! Custom Axum extractors.

pub mod auth;
pub mod json;
pub mod path;

pub use auth::{ConfirmSubject, CurrentUser, RefreshUser, ResetSubject, bearer_token};
pub use json::ValidatedJson;
pub use path::{ApiPath, ApiQuery};
