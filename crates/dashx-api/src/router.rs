//! Route definitions for the DashboardX HTTP API.
//!
//! All routes are organized by domain and mounted under `/api/v1`.

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::handlers::{auth, broker, device, events, user};
use crate::state::AppState;

/// Build the Axum router with every route bound to `state`.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .nest("/users", user_routes())
        .nest("/brokers", broker_routes())
        .nest("/devices", device_routes())
        .route("/events", get(events::stream_events));

    Router::new().nest("/api/v1", api_routes).with_state(state)
}

/// Account lifecycle and self-service.
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/confirm-account", post(auth::confirm_account))
        .route("/confirm-account/resend", post(auth::resend_confirmation))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route(
            "/reset-password",
            post(auth::request_password_reset).patch(auth::reset_password),
        )
        .route("/me/tokens", post(auth::refresh_tokens))
        .route(
            "/me",
            get(user::get_me)
                .patch(user::update_me)
                .delete(user::delete_me),
        )
        .route("/me/password", patch(user::change_password))
}

fn broker_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(broker::list_brokers).post(broker::create_broker))
        .route(
            "/{id}",
            get(broker::get_broker)
                .patch(broker::update_broker)
                .delete(broker::delete_broker),
        )
        .route(
            "/{id}/credentials",
            get(broker::get_credentials).put(broker::set_credentials),
        )
}

fn device_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(device::list_devices).post(device::create_device))
        .route(
            "/{id}",
            get(device::get_device)
                .patch(device::update_device)
                .delete(device::delete_device),
        )
        .route(
            "/{id}/controls",
            get(device::list_controls).post(device::create_control),
        )
        .route(
            "/{id}/controls/{control_id}",
            patch(device::update_control).delete(device::delete_control),
        )
}
