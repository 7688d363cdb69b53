//! Clinic API handlers

use crate::{
    api::extract::{IdPath, ValidatedJson, ValidatedQuery},
    models::{ClinicListQuery, DoctorLinkRequest, ListQuery, NameRequest},
    state::AppState,
    Result,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// POST /v1/clinics
pub async fn create_clinic(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<NameRequest>,
) -> Result<Response> {
    let clinic = state.clinic_service.create(&body.name).await?;
    Ok((StatusCode::CREATED, Json(clinic)).into_response())
}

/// GET /v1/clinics
pub async fn list_clinics(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ClinicListQuery>,
) -> Result<Response> {
    let page = state
        .clinic_service
        .list(&query.filter()?, &query.page_request()?)
        .await?;
    Ok((StatusCode::OK, Json(page)).into_response())
}

/// GET /v1/clinics/:clinicId
pub async fn get_clinic(
    State(state): State<AppState>,
    IdPath(clinic_id): IdPath,
) -> Result<Response> {
    let clinic = state.clinic_service.get(clinic_id).await?;
    Ok((StatusCode::OK, Json(clinic)).into_response())
}

/// PATCH /v1/clinics/:clinicId
pub async fn update_clinic(
    State(state): State<AppState>,
    IdPath(clinic_id): IdPath,
    ValidatedJson(body): ValidatedJson<NameRequest>,
) -> Result<Response> {
    let clinic = state.clinic_service.update(clinic_id, &body.name).await?;
    Ok((StatusCode::OK, Json(clinic)).into_response())
}

/// DELETE /v1/clinics/:clinicId
pub async fn delete_clinic(
    State(state): State<AppState>,
    IdPath(clinic_id): IdPath,
) -> Result<Response> {
    state.clinic_service.delete(clinic_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// POST /v1/clinics/doctor/:clinicId
pub async fn add_doctor(
    State(state): State<AppState>,
    IdPath(clinic_id): IdPath,
    ValidatedJson(body): ValidatedJson<DoctorLinkRequest>,
) -> Result<Response> {
    let clinic = state
        .clinic_service
        .add_doctor(body.doctor_id()?, clinic_id)
        .await?;
    Ok((StatusCode::OK, Json(clinic)).into_response())
}

/// DELETE /v1/clinics/doctor/:clinicId
pub async fn remove_doctor(
    State(state): State<AppState>,
    IdPath(clinic_id): IdPath,
    ValidatedJson(body): ValidatedJson<DoctorLinkRequest>,
) -> Result<Response> {
    let clinic = state
        .clinic_service
        .remove_doctor(body.doctor_id()?, clinic_id)
        .await?;
    Ok((StatusCode::OK, Json(clinic)).into_response())
}

/// POST /v1/clinics/:clinicId/healthServices/recompute
pub async fn recompute_health_services(
    State(state): State<AppState>,
    IdPath(clinic_id): IdPath,
) -> Result<Response> {
    let clinic = state
        .clinic_service
        .recompute_health_services(clinic_id)
        .await?;
    Ok((StatusCode::OK, Json(clinic)).into_response())
}
