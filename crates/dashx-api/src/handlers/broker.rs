//! Broker handlers. Every route is scoped to the caller's brokers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use uuid::Uuid;

use crate::dto::request::{CreateBrokerRequest, SetCredentialsRequest, UpdateBrokerRequest};
use crate::dto::response::{BrokerResponse, CreatedResponse, CredentialsResponse};
use crate::error::ApiError;
use crate::extractors::{ApiPath, CurrentUser, ValidatedJson};
use crate::state::AppState;

/// GET /api/v1/brokers
pub async fn list_brokers(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<BrokerResponse>>, ApiError> {
    let brokers = state.broker_service.list(user.id).await?;
    Ok(Json(brokers.into_iter().map(BrokerResponse::from).collect()))
}

/// POST /api/v1/brokers
pub async fn create_broker(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<CreateBrokerRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let id = state.broker_service.create(req.into_create(user.id)).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /api/v1/brokers/{id}
pub async fn get_broker(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<BrokerResponse>, ApiError> {
    let broker = state.broker_service.get(id, user.id).await?;
    Ok(Json(broker.into()))
}

/// PATCH /api/v1/brokers/{id}
pub async fn update_broker(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateBrokerRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .broker_service
        .update(req.into_update(id, user.id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/brokers/{id}
pub async fn delete_broker(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.broker_service.delete(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/brokers/{id}/credentials
pub async fn get_credentials(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<CredentialsResponse>, ApiError> {
    let creds = state.broker_service.get_credentials(id, user.id).await?;
    Ok(Json(creds.into()))
}

/// PUT /api/v1/brokers/{id}/credentials
pub async fn set_credentials(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<SetCredentialsRequest>,
) -> Result<StatusCode, ApiError> {
    let creds = req.into_credentials(id)?;
    state.broker_service.set_credentials(user.id, creds).await?;
    Ok(StatusCode::NO_CONTENT)
}
