//! Health service API handlers

use crate::{
    api::extract::{IdPath, ValidatedJson, ValidatedQuery},
    models::{HealthServiceListQuery, ListQuery, NameRequest},
    state::AppState,
    Result,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// POST /v1/healthServices
pub async fn create_health_service(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<NameRequest>,
) -> Result<Response> {
    let health_service = state.health_service_service.create(&body.name).await?;
    Ok((StatusCode::CREATED, Json(health_service)).into_response())
}

/// GET /v1/healthServices
pub async fn list_health_services(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<HealthServiceListQuery>,
) -> Result<Response> {
    let page = state
        .health_service_service
        .list(&query.filter()?, &query.page_request()?)
        .await?;
    Ok((StatusCode::OK, Json(page)).into_response())
}

/// GET /v1/healthServices/:healthServiceId
pub async fn get_health_service(
    State(state): State<AppState>,
    IdPath(health_service_id): IdPath,
) -> Result<Response> {
    let health_service = state.health_service_service.get(health_service_id).await?;
    Ok((StatusCode::OK, Json(health_service)).into_response())
}

/// PATCH /v1/healthServices/:healthServiceId
pub async fn update_health_service(
    State(state): State<AppState>,
    IdPath(health_service_id): IdPath,
    ValidatedJson(body): ValidatedJson<NameRequest>,
) -> Result<Response> {
    let health_service = state
        .health_service_service
        .update(health_service_id, &body.name)
        .await?;
    Ok((StatusCode::OK, Json(health_service)).into_response())
}

/// DELETE /v1/healthServices/:healthServiceId
pub async fn delete_health_service(
    State(state): State<AppState>,
    IdPath(health_service_id): IdPath,
) -> Result<Response> {
    state.health_service_service.delete(health_service_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
