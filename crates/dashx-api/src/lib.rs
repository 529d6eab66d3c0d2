//! # dashx-api
//!
//! HTTP API layer for DashboardX built on Axum.
//!
//! Provides the REST endpoints under `/api/v1`, the server-sent event
//! stream, the per-route identity extractors, DTOs and error mapping.

pub mod app;
pub mod cookies;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::{AppState, Repositories};
