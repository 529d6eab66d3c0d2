//! Account lifecycle handlers: registration, confirmation, login, logout,
//! token refresh and password reset.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use dashx_auth::{TokenKind, TokenPair};
use dashx_core::error::AppError;
use dashx_service::NewUser;

use crate::cookies::{CHANNEL_COOKIE, clear_reset_cookie, reset_cookie};
use crate::dto::request::{EmailRequest, LoginRequest, PasswordRequest, RegisterRequest};
use crate::error::ApiError;
use crate::extractors::{ConfirmSubject, CurrentUser, RefreshUser, ResetSubject, ValidatedJson};
use crate::state::AppState;

fn ensure_registration(state: &AppState) -> Result<(), AppError> {
    if state.config.features.registration_enabled {
        Ok(())
    } else {
        Err(AppError::endpoint_disabled())
    }
}

/// POST /api/v1/users/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<StatusCode, ApiError> {
    ensure_registration(&state)?;
    state
        .user_service
        .pre_create(NewUser {
            name: req.name,
            email: req.email,
            password: req.password,
        })
        .await?;
    Ok(StatusCode::ACCEPTED)
}

/// POST /api/v1/users/confirm-account
pub async fn confirm_account(
    State(state): State<AppState>,
    ConfirmSubject(pre_user_id): ConfirmSubject,
) -> Result<StatusCode, ApiError> {
    state.user_service.create(pre_user_id).await?;
    Ok(StatusCode::CREATED)
}

/// POST /api/v1/users/confirm-account/resend
pub async fn resend_confirmation(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<EmailRequest>,
) -> Result<StatusCode, ApiError> {
    ensure_registration(&state)?;
    state.user_service.send_confirm_token(&req.email).await?;
    Ok(StatusCode::ACCEPTED)
}

/// POST /api/v1/users/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let tokens = state.user_service.login(&req.email, &req.password).await?;
    Ok(Json(tokens))
}

/// POST /api/v1/users/logout
///
/// Closes the event channel named by the `ecid` cookie, if any.
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> StatusCode {
    let channel_id = jar
        .get(CHANNEL_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok());
    state.user_service.logout(user.id, channel_id);
    StatusCode::NO_CONTENT
}

/// POST /api/v1/users/me/tokens
pub async fn refresh_tokens(
    State(state): State<AppState>,
    RefreshUser(user): RefreshUser,
) -> Result<Json<TokenPair>, ApiError> {
    let tokens = state.user_service.get_tokens(user.id).await?;
    Ok(Json(tokens))
}

/// POST /api/v1/users/reset-password
///
/// Always answers 202 with a fresh `rps` cookie so the response does not
/// reveal whether the email is registered.
pub async fn request_password_reset(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<EmailRequest>,
) -> Result<(StatusCode, CookieJar), ApiError> {
    let subject_hash = state.user_service.send_reset_token(&req.email).await?;
    let lifespan = state.auth.lifespan(TokenKind::Reset)?;
    let cookie = reset_cookie(&state.config.server, &subject_hash, lifespan);

    Ok((StatusCode::ACCEPTED, jar.add(cookie)))
}

/// PATCH /api/v1/users/reset-password
///
/// The `rps` cookie is cleared whatever the outcome.
pub async fn reset_password(
    State(state): State<AppState>,
    ResetSubject(subject): ResetSubject,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<PasswordRequest>,
) -> Response {
    let jar = clear_reset_cookie(jar, &state.config.server);

    match state.user_service.reset_password(subject, &req.password).await {
        Ok(()) => (jar, StatusCode::NO_CONTENT).into_response(),
        Err(e) => (jar, ApiError(e)).into_response(),
    }
}
