//! Device and device-control handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use uuid::Uuid;

use dashx_entity::device::DeviceFilter;

use crate::dto::request::{
    CreateControlRequest, CreateDeviceRequest, DeviceQuery, UpdateControlRequest,
    UpdateDeviceRequest,
};
use crate::dto::response::{ControlResponse, CreatedResponse, DeviceResponse};
use crate::error::ApiError;
use crate::extractors::{ApiPath, ApiQuery, CurrentUser, ValidatedJson};
use crate::state::AppState;

/// GET /api/v1/devices?brokerId=
pub async fn list_devices(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<DeviceQuery>,
) -> Result<Json<Vec<DeviceResponse>>, ApiError> {
    let devices = state
        .device_service
        .list(DeviceFilter {
            user_id: user.id,
            broker_id: query.broker_id,
        })
        .await?;
    Ok(Json(devices.into_iter().map(DeviceResponse::from).collect()))
}

/// POST /api/v1/devices
pub async fn create_device(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<CreateDeviceRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let id = state.device_service.create(req.into_create(user.id)).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /api/v1/devices/{id}
pub async fn get_device(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<DeviceResponse>, ApiError> {
    let device = state.device_service.get(id, user.id).await?;
    Ok(Json(device.into()))
}

/// PATCH /api/v1/devices/{id}
pub async fn update_device(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateDeviceRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .device_service
        .update(req.into_update(id, user.id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/devices/{id}
pub async fn delete_device(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.device_service.delete(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── Controls ───────────────────────────────────────────────────

/// GET /api/v1/devices/{id}/controls
pub async fn list_controls(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(device_id): ApiPath<Uuid>,
) -> Result<Json<Vec<ControlResponse>>, ApiError> {
    let controls = state.control_service.list(user.id, device_id).await?;
    Ok(Json(controls.into_iter().map(ControlResponse::from).collect()))
}

/// POST /api/v1/devices/{id}/controls
pub async fn create_control(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(device_id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<CreateControlRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let id = state
        .control_service
        .create(user.id, req.into_create(device_id))
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// PATCH /api/v1/devices/{id}/controls/{control_id}
pub async fn update_control(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath((device_id, control_id)): ApiPath<(Uuid, Uuid)>,
    ValidatedJson(req): ValidatedJson<UpdateControlRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .control_service
        .update(user.id, req.into_update(control_id, device_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/devices/{id}/controls/{control_id}
pub async fn delete_control(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath((device_id, control_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    state
        .control_service
        .delete(user.id, device_id, control_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
