//! Doctor API handlers

use crate::{
    api::extract::{IdPath, ValidatedJson, ValidatedQuery},
    models::{DoctorListQuery, HealthServiceLinkRequest, ListQuery, NameRequest},
    state::AppState,
    Result,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// POST /v1/doctors
pub async fn create_doctor(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<NameRequest>,
) -> Result<Response> {
    let doctor = state.doctor_service.create(&body.name).await?;
    Ok((StatusCode::CREATED, Json(doctor)).into_response())
}

/// GET /v1/doctors
pub async fn list_doctors(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<DoctorListQuery>,
) -> Result<Response> {
    let page = state
        .doctor_service
        .list(&query.filter()?, &query.page_request()?)
        .await?;
    Ok((StatusCode::OK, Json(page)).into_response())
}

/// GET /v1/doctors/:doctorId
pub async fn get_doctor(
    State(state): State<AppState>,
    IdPath(doctor_id): IdPath,
) -> Result<Response> {
    let doctor = state.doctor_service.get(doctor_id).await?;
    Ok((StatusCode::OK, Json(doctor)).into_response())
}

/// PATCH /v1/doctors/:doctorId
pub async fn update_doctor(
    State(state): State<AppState>,
    IdPath(doctor_id): IdPath,
    ValidatedJson(body): ValidatedJson<NameRequest>,
) -> Result<Response> {
    let doctor = state.doctor_service.update(doctor_id, &body.name).await?;
    Ok((StatusCode::OK, Json(doctor)).into_response())
}

/// DELETE /v1/doctors/:doctorId
pub async fn delete_doctor(
    State(state): State<AppState>,
    IdPath(doctor_id): IdPath,
) -> Result<Response> {
    state.doctor_service.delete(doctor_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// POST /v1/doctors/healthService/:doctorId
pub async fn add_health_service(
    State(state): State<AppState>,
    IdPath(doctor_id): IdPath,
    ValidatedJson(body): ValidatedJson<HealthServiceLinkRequest>,
) -> Result<Response> {
    let doctor = state
        .doctor_service
        .add_health_service(body.health_service_id()?, doctor_id)
        .await?;
    Ok((StatusCode::OK, Json(doctor)).into_response())
}

/// DELETE /v1/doctors/healthService/:doctorId
pub async fn remove_health_service(
    State(state): State<AppState>,
    IdPath(doctor_id): IdPath,
    ValidatedJson(body): ValidatedJson<HealthServiceLinkRequest>,
) -> Result<Response> {
    let doctor = state
        .doctor_service
        .remove_health_service(body.health_service_id()?, doctor_id)
        .await?;
    Ok((StatusCode::OK, Json(doctor)).into_response())
}
