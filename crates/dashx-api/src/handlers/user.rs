//! Self-service handlers for the signed-in user.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::request::{ChangePasswordRequest, PasswordRequest, UpdateUserRequest};
use crate::dto::response::UserResponse;
use crate::error::ApiError;
use crate::extractors::{CurrentUser, ValidatedJson};
use crate::state::AppState;

/// GET /api/v1/users/me
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

/// PATCH /api/v1/users/me
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> Result<StatusCode, ApiError> {
    state.user_service.update(req.into_update(user.id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/users/me
pub async fn delete_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<PasswordRequest>,
) -> Result<StatusCode, ApiError> {
    state.user_service.delete(user.id, &req.password).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/users/me/password
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .user_service
        .change_password(user.id, &req.password, &req.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
